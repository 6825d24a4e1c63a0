//! Chain client provider: binds a cluster connection to the connected wallet
//! to produce a signer-capable client for the GIF program.

use std::sync::Arc;

use chain::{
    program, ChainTransport, CommitmentConfig, Instruction, Keypair, Message, Signature, Signer,
    SignerError, SolanaRpc, Transaction, TransportError,
};
use shared::{
    domain::{BaseAccount, Pubkey, WalletIdentity},
    protocol::ProtocolError,
};
use thiserror::Error;
use tracing::debug;

use crate::wallet::{WalletError, WalletProvider};

/// Commitment used for reads, preflight and confirmation.
pub fn commitment() -> CommitmentConfig {
    CommitmentConfig::processed()
}

#[derive(Clone)]
pub enum Cluster {
    /// RPC endpoint; a new connection is built for every provider.
    Rpc { url: String },
    /// A transport shared across providers, e.g. the in-process ledger.
    Shared(Arc<dyn ChainTransport>),
}

impl std::fmt::Debug for Cluster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rpc { url } => f.debug_struct("Rpc").field("url", url).finish(),
            Self::Shared(_) => f.write_str("Shared"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProgramClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Wallet(#[from] WalletError),
    #[error("co-signer failed: {0}")]
    Signing(#[from] SignerError),
    #[error("failed to encode instruction: {0}")]
    Encode(ProtocolError),
    #[error("account {address} is not a GIF portal account: {source}")]
    Protocol {
        address: Pubkey,
        source: ProtocolError,
    },
    #[error("account {address} is owned by {owner}, not the GIF program")]
    WrongOwner { address: Pubkey, owner: Pubkey },
}

pub struct ChainClientProvider {
    cluster: Cluster,
    program_id: Pubkey,
}

impl ChainClientProvider {
    pub fn new(cluster: Cluster, program_id: Pubkey) -> Self {
        Self {
            cluster,
            program_id,
        }
    }

    pub fn program_id(&self) -> Pubkey {
        self.program_id
    }

    /// Builds a fresh client for the current wallet. Nothing is cached
    /// between calls.
    pub fn get_provider(
        &self,
        wallet: Arc<dyn WalletProvider>,
        user: WalletIdentity,
    ) -> GifProgramClient {
        let transport: Arc<dyn ChainTransport> = match &self.cluster {
            Cluster::Rpc { url } => Arc::new(SolanaRpc::new(url.clone(), commitment())),
            Cluster::Shared(transport) => Arc::clone(transport),
        };
        GifProgramClient {
            transport,
            wallet,
            user,
            program_id: self.program_id,
        }
    }
}

pub struct GifProgramClient {
    transport: Arc<dyn ChainTransport>,
    wallet: Arc<dyn WalletProvider>,
    user: WalletIdentity,
    program_id: Pubkey,
}

impl GifProgramClient {
    pub fn user(&self) -> WalletIdentity {
        self.user
    }

    /// `Ok(None)` only when the account does not exist.
    pub async fn fetch_base_account(
        &self,
        address: &Pubkey,
    ) -> Result<Option<BaseAccount>, ProgramClientError> {
        let Some(account) = self.transport.get_account(address).await? else {
            return Ok(None);
        };
        if account.owner != self.program_id {
            return Err(ProgramClientError::WrongOwner {
                address: *address,
                owner: account.owner,
            });
        }
        BaseAccount::try_from_account_data(&account.data)
            .map(Some)
            .map_err(|source| ProgramClientError::Protocol {
                address: *address,
                source,
            })
    }

    pub async fn initialize(&self, base_account: &Keypair) -> Result<Signature, ProgramClientError> {
        let ix = program::initialize(self.program_id, base_account.pubkey(), self.user)
            .map_err(ProgramClientError::Encode)?;
        self.send(ix, Some(base_account)).await
    }

    pub async fn add_gif(
        &self,
        base_account: Pubkey,
        gif_link: &str,
    ) -> Result<Signature, ProgramClientError> {
        let ix = program::add_gif(self.program_id, base_account, self.user, gif_link)
            .map_err(ProgramClientError::Encode)?;
        self.send(ix, None).await
    }

    async fn send(
        &self,
        ix: Instruction,
        co_signer: Option<&Keypair>,
    ) -> Result<Signature, ProgramClientError> {
        let blockhash = self.transport.latest_blockhash().await?;
        let message = Message::new_with_blockhash(&[ix], Some(&self.user), &blockhash);
        let mut transaction = Transaction::new_unsigned(message);
        if let Some(signer) = co_signer {
            transaction.try_partial_sign(&[signer], blockhash)?;
        }
        self.wallet.sign_transaction(&mut transaction).await?;
        debug!(
            "program: sending transaction signers={} wallet={}",
            transaction.signatures.len(),
            self.wallet.name()
        );
        Ok(self.transport.send_and_confirm(&transaction).await?)
    }
}
