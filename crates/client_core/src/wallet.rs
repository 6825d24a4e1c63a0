//! Wallet provider boundary and the connector that tracks the connected
//! identity for the lifetime of the process.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use async_trait::async_trait;
use chain::{Keypair, Signer, Transaction};
use shared::domain::{Pubkey, WalletIdentity};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};

pub const INSTALL_WALLET_PROMPT: &str = "Please install a Solana wallet (Phantom) to use the GIF portal.";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("wallet has not approved this app; connection requires a prompt")]
    NotTrusted,
    #[error("user rejected the request")]
    UserRejected,
    #[error("wallet is not connected")]
    NotConnected,
    #[error("wallet failed to sign: {0}")]
    Signing(String),
}

/// What a wallet extension exposes to the app.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Only supported providers are auto-connected on start-up.
    fn is_supported(&self) -> bool {
        true
    }

    /// With `only_if_trusted` the wallet must not prompt and fails unless the
    /// user approved this app before.
    async fn connect(&self, only_if_trusted: bool) -> Result<Pubkey, WalletError>;

    /// Fills in the connected key's signature slot.
    async fn sign_transaction(&self, transaction: &mut Transaction) -> Result<(), WalletError>;
}

/// Wallet backed by a local keypair file. "Prompts" are answered by
/// `approve_prompts`; an approval makes later trust-only connects succeed.
pub struct KeypairWallet {
    name: String,
    keypair: Keypair,
    trusted: AtomicBool,
    approve_prompts: bool,
    connected: AtomicBool,
}

impl KeypairWallet {
    pub fn new(name: impl Into<String>, keypair: Keypair, trusted: bool) -> Self {
        Self {
            name: name.into(),
            keypair,
            trusted: AtomicBool::new(trusted),
            approve_prompts: true,
            connected: AtomicBool::new(false),
        }
    }

    pub fn rejecting_prompts(mut self) -> Self {
        self.approve_prompts = false;
        self
    }

    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }
}

#[async_trait]
impl WalletProvider for KeypairWallet {
    fn name(&self) -> &str {
        &self.name
    }

    async fn connect(&self, only_if_trusted: bool) -> Result<Pubkey, WalletError> {
        if only_if_trusted {
            if !self.trusted.load(Ordering::SeqCst) {
                return Err(WalletError::NotTrusted);
            }
        } else if !self.approve_prompts {
            return Err(WalletError::UserRejected);
        }
        self.trusted.store(true, Ordering::SeqCst);
        self.connected.store(true, Ordering::SeqCst);
        Ok(self.keypair.pubkey())
    }

    async fn sign_transaction(&self, transaction: &mut Transaction) -> Result<(), WalletError> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(WalletError::NotConnected);
        }
        let blockhash = transaction.message.recent_blockhash;
        transaction
            .try_partial_sign(&[&self.keypair], blockhash)
            .map_err(|err| WalletError::Signing(err.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionCheck {
    Connected(WalletIdentity),
    NoProvider,
    Unsupported(String),
    NotConnected(WalletError),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectError {
    #[error("no wallet provider is installed")]
    NoProvider,
    #[error(transparent)]
    Wallet(#[from] WalletError),
}

pub struct WalletConnector {
    provider: Option<Arc<dyn WalletProvider>>,
    identity: RwLock<Option<WalletIdentity>>,
}

impl WalletConnector {
    pub fn new(provider: Option<Arc<dyn WalletProvider>>) -> Self {
        Self {
            provider,
            identity: RwLock::new(None),
        }
    }

    pub fn provider(&self) -> Option<Arc<dyn WalletProvider>> {
        self.provider.clone()
    }

    pub async fn identity(&self) -> Option<WalletIdentity> {
        *self.identity.read().await
    }

    /// Trust-only connection attempted at start-up. Never prompts.
    pub async fn check_existing_connection(&self) -> ConnectionCheck {
        let Some(provider) = &self.provider else {
            return ConnectionCheck::NoProvider;
        };
        if !provider.is_supported() {
            warn!("wallet: provider {} is not supported for auto-connect", provider.name());
            return ConnectionCheck::Unsupported(provider.name().to_string());
        }
        match provider.connect(true).await {
            Ok(pubkey) => {
                info!("wallet: connected with public key {pubkey}");
                *self.identity.write().await = Some(pubkey);
                ConnectionCheck::Connected(pubkey)
            }
            Err(err) => {
                warn!("wallet: trusted connection unavailable: {err}");
                ConnectionCheck::NotConnected(err)
            }
        }
    }

    /// User-initiated connection; the wallet always prompts.
    pub async fn connect(&self) -> Result<WalletIdentity, ConnectError> {
        let provider = self.provider.as_ref().ok_or(ConnectError::NoProvider)?;
        let pubkey = provider.connect(false).await?;
        info!("wallet: connected with public key {pubkey}");
        *self.identity.write().await = Some(pubkey);
        Ok(pubkey)
    }
}

#[cfg(test)]
#[path = "tests/wallet_tests.rs"]
mod tests;
