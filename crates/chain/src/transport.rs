use async_trait::async_trait;
use solana_sdk::{account::Account, hash::Hash, signature::Signature, transaction::Transaction};
use shared::domain::Pubkey;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("rpc client error: {0}")]
    Client(String),
    #[error("transaction rejected before execution: {0}")]
    Rejected(String),
    #[error("transaction failed: {reason}")]
    TransactionFailed { reason: String },
    #[error("cluster unavailable: {0}")]
    Unavailable(String),
}

/// The network boundary the program client talks through. Implemented by the
/// cluster RPC adapter and by the in-process ledger.
#[async_trait]
pub trait ChainTransport: Send + Sync {
    /// `Ok(None)` when no account exists at `address`.
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, TransportError>;
    async fn latest_blockhash(&self) -> Result<Hash, TransportError>;
    /// Submits a fully signed transaction and waits for the transport's
    /// commitment level.
    async fn send_and_confirm(&self, transaction: &Transaction) -> Result<Signature, TransportError>;
}
