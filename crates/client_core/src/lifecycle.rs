use std::sync::Arc;

use chain::{Keypair, Signature, Signer};
use shared::domain::{BaseAccount, Pubkey};
use tracing::{error, info, warn};

use crate::program::{GifProgramClient, ProgramClientError};

/// Outcome of reading the base account. Absence and failure are kept apart
/// so the view can tell "needs setup" from "try again later".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountFetch {
    Ready(BaseAccount),
    NotFound,
    TransientError(String),
}

/// Owns the base-account keypair for the lifetime of the process.
pub struct AccountLifecycleManager {
    base_account: Arc<Keypair>,
}

impl AccountLifecycleManager {
    pub fn new(base_account: Arc<Keypair>) -> Self {
        Self { base_account }
    }

    pub fn address(&self) -> Pubkey {
        self.base_account.pubkey()
    }

    pub async fn fetch_account(&self, client: &GifProgramClient) -> AccountFetch {
        let address = self.address();
        match client.fetch_base_account(&address).await {
            Ok(Some(account)) => {
                info!(
                    "lifecycle: got the account {address} total_gifs={}",
                    account.total_gifs
                );
                AccountFetch::Ready(account)
            }
            Ok(None) => {
                info!("lifecycle: base account {address} does not exist yet");
                AccountFetch::NotFound
            }
            Err(err) => {
                warn!("lifecycle: error fetching base account {address}: {err}");
                AccountFetch::TransientError(err.to_string())
            }
        }
    }

    /// Sends the one-time initialize transaction, co-signed by the base
    /// account keypair and paid for by the wallet.
    pub async fn initialize_account(
        &self,
        client: &GifProgramClient,
    ) -> Result<Signature, ProgramClientError> {
        let address = self.address();
        match client.initialize(&self.base_account).await {
            Ok(signature) => {
                info!(
                    "lifecycle: created a new base account {address} payer={} signature={signature}",
                    client.user()
                );
                Ok(signature)
            }
            Err(err) => {
                error!("lifecycle: error creating base account {address}: {err}");
                Err(err)
            }
        }
    }
}
