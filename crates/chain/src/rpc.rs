use async_trait::async_trait;
use shared::domain::Pubkey;
use solana_client::{
    client_error::{ClientError, ClientErrorKind},
    nonblocking::rpc_client::RpcClient,
    rpc_request::RpcError,
};
use solana_sdk::{
    account::Account, hash::Hash, signature::Signature,
    transaction::Transaction,
};
use solana_commitment_config::CommitmentConfig;
use tracing::{debug, info};

use crate::transport::{ChainTransport, TransportError};

impl From<ClientError> for TransportError {
    fn from(err: ClientError) -> Self {
        match err.kind() {
            ClientErrorKind::Io(_) | ClientErrorKind::Reqwest(_) => {
                Self::Unavailable(err.to_string())
            }
            ClientErrorKind::RpcError(RpcError::RpcResponseError { code, message, .. }) => {
                Self::Rpc {
                    code: *code,
                    message: message.clone(),
                }
            }
            ClientErrorKind::TransactionError(tx_err) => Self::TransactionFailed {
                reason: tx_err.to_string(),
            },
            _ => Self::Client(err.to_string()),
        }
    }
}

/// Cluster connection bound to one endpoint and commitment. Reads, preflight
/// and confirmation all use the same commitment.
pub struct SolanaRpc {
    client: RpcClient,
}

impl SolanaRpc {
    pub fn new(url: impl Into<String>, commitment: CommitmentConfig) -> Self {
        Self {
            client: RpcClient::new_with_commitment(url.into(), commitment),
        }
    }

    pub fn url(&self) -> String {
        self.client.url()
    }

    pub fn commitment(&self) -> CommitmentConfig {
        self.client.commitment()
    }
}

#[async_trait]
impl ChainTransport for SolanaRpc {
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, TransportError> {
        debug!("rpc: getAccountInfo address={address} url={}", self.client.url());
        let response = self
            .client
            .get_account_with_commitment(address, self.client.commitment())
            .await?;
        Ok(response.value)
    }

    async fn latest_blockhash(&self) -> Result<Hash, TransportError> {
        Ok(self.client.get_latest_blockhash().await?)
    }

    async fn send_and_confirm(&self, transaction: &Transaction) -> Result<Signature, TransportError> {
        let signature = self.client.send_and_confirm_transaction(transaction).await?;
        info!("rpc: confirmed transaction signature={signature}");
        Ok(signature)
    }
}
