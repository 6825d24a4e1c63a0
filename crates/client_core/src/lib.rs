use std::sync::Arc;

use shared::{
    domain::WalletIdentity,
    error::{ErrorCode, PortalError},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{error, info, warn};

pub mod config;
pub mod lifecycle;
pub mod program;
pub mod view;
pub mod wallet;

pub use config::{load_settings, PortalConfig, PortalSettings, SettingsError};
pub use lifecycle::{AccountFetch, AccountLifecycleManager};
pub use program::{ChainClientProvider, Cluster, GifProgramClient, ProgramClientError};
pub use view::{ListSnapshot, ViewState};
pub use wallet::{
    ConnectError, ConnectionCheck, KeypairWallet, WalletConnector, WalletError, WalletProvider,
    INSTALL_WALLET_PROMPT,
};

pub const EMPTY_INPUT_PROMPT: &str = "Empty input. Try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortalEvent {
    /// Blocking notice for the user.
    Alert(PortalError),
    InputCleared,
    ViewChanged(ViewState),
    /// Failure that is logged and shown in status displays, never as a
    /// blocking notice.
    OperationFailed(PortalError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted,
    RejectedEmpty,
    NotReady,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitializeOutcome {
    Initialized,
    Skipped,
    Failed,
}

#[derive(Default)]
struct PortalState {
    snapshot: ListSnapshot,
    /// Set once the base account has been read successfully; afterwards a
    /// missing account is an error, not a setup prompt.
    account_seen: bool,
    loading: bool,
    gif_input: String,
}

/// Drives the portal: wallet connection, account setup and the GIF list.
/// Every state change is published as a [`PortalEvent::ViewChanged`].
pub struct PortalController {
    wallet: WalletConnector,
    chain: ChainClientProvider,
    lifecycle: AccountLifecycleManager,
    inner: Mutex<PortalState>,
    events: broadcast::Sender<PortalEvent>,
}

impl PortalController {
    pub fn new(config: PortalConfig, wallet: Option<Arc<dyn WalletProvider>>) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            wallet: WalletConnector::new(wallet),
            chain: ChainClientProvider::new(config.cluster, config.program_id),
            lifecycle: AccountLifecycleManager::new(config.base_account),
            inner: Mutex::new(PortalState::default()),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<PortalEvent> {
        self.events.subscribe()
    }

    pub fn base_account(&self) -> shared::domain::Pubkey {
        self.lifecycle.address()
    }

    pub async fn identity(&self) -> Option<WalletIdentity> {
        self.wallet.identity().await
    }

    pub async fn view(&self) -> ViewState {
        let identity = self.wallet.identity().await;
        let state = self.inner.lock().await;
        ViewState::derive(identity.as_ref(), &state.snapshot, state.loading)
    }

    pub async fn gif_input(&self) -> String {
        self.inner.lock().await.gif_input.clone()
    }

    pub async fn set_gif_input(&self, value: impl Into<String>) {
        self.inner.lock().await.gif_input = value.into();
    }

    /// Start-up: silently reconnect a previously approved wallet and load
    /// the list.
    pub async fn on_load(&self) -> ViewState {
        match self.wallet.check_existing_connection().await {
            ConnectionCheck::Connected(_) => return self.refresh().await,
            ConnectionCheck::NoProvider => self.report(ErrorCode::WalletMissing, INSTALL_WALLET_PROMPT),
            ConnectionCheck::Unsupported(name) => {
                warn!("portal: skipping auto-connect for unsupported wallet {name}")
            }
            ConnectionCheck::NotConnected(_) => {}
        }
        self.publish_view().await
    }

    pub async fn connect_wallet(&self) -> ViewState {
        match self.wallet.connect().await {
            Ok(_) => return self.refresh().await,
            Err(ConnectError::NoProvider) => {
                self.report(ErrorCode::WalletMissing, INSTALL_WALLET_PROMPT)
            }
            Err(ConnectError::Wallet(err)) => {
                warn!("portal: wallet connection failed: {err}");
            }
        }
        self.publish_view().await
    }

    /// Re-reads the base account and replaces the snapshot wholesale.
    pub async fn refresh(&self) -> ViewState {
        let Some(client) = self.program_client().await else {
            return self.publish_view().await;
        };
        self.set_loading(true).await;

        let fetch = self.lifecycle.fetch_account(&client).await;
        {
            let mut state = self.inner.lock().await;
            state.loading = false;
            match fetch {
                AccountFetch::Ready(account) => {
                    state.account_seen = true;
                    state.snapshot = ListSnapshot::Loaded(account.gif_list);
                }
                AccountFetch::NotFound if state.account_seen => {
                    error!(
                        "portal: base account {} disappeared after being read",
                        self.lifecycle.address()
                    );
                    state.snapshot = ListSnapshot::Unavailable(format!(
                        "base account {} is no longer available",
                        self.lifecycle.address()
                    ));
                }
                AccountFetch::NotFound => state.snapshot = ListSnapshot::Absent,
                AccountFetch::TransientError(reason) => {
                    if !matches!(state.snapshot, ListSnapshot::Loaded(_)) {
                        state.snapshot = ListSnapshot::Unavailable(reason.clone());
                    }
                    self.report(ErrorCode::FetchFailed, reason);
                }
            }
        }
        self.publish_view().await
    }

    /// One-time account creation; only offered while the account is known
    /// to be absent.
    pub async fn initialize_account(&self) -> InitializeOutcome {
        if !matches!(self.inner.lock().await.snapshot, ListSnapshot::Absent) {
            warn!("portal: initialize requested while account is not absent");
            return InitializeOutcome::Skipped;
        }
        let Some(client) = self.program_client().await else {
            return InitializeOutcome::Skipped;
        };
        self.set_loading(true).await;

        match self.lifecycle.initialize_account(&client).await {
            Ok(_) => {
                self.refresh().await;
                InitializeOutcome::Initialized
            }
            Err(err) => {
                self.report(ErrorCode::TransactionFailed, err.to_string());
                self.set_loading(false).await;
                InitializeOutcome::Failed
            }
        }
    }

    pub async fn submit(&self, gif_link: impl Into<String>) -> SubmitOutcome {
        self.set_gif_input(gif_link).await;
        self.submit_gif().await
    }

    /// Sends the current input as a new GIF. The input is cleared before the
    /// transaction goes out and is not restored on failure.
    pub async fn submit_gif(&self) -> SubmitOutcome {
        let link = self.gif_input().await.trim().to_string();
        if link.is_empty() {
            self.report(ErrorCode::Validation, EMPTY_INPUT_PROMPT);
            return SubmitOutcome::RejectedEmpty;
        }
        if !self.view().await.is_ready() {
            warn!("portal: submit ignored, GIF list is not ready");
            return SubmitOutcome::NotReady;
        }
        let Some(client) = self.program_client().await else {
            return SubmitOutcome::NotReady;
        };

        self.inner.lock().await.gif_input.clear();
        let _ = self.events.send(PortalEvent::InputCleared);
        info!("portal: Gif link: {link}");
        self.set_loading(true).await;

        match client.add_gif(self.lifecycle.address(), &link).await {
            Ok(signature) => {
                info!("portal: GIF successfully sent to program signature={signature}");
                self.refresh().await;
                SubmitOutcome::Submitted
            }
            Err(err) => {
                error!("portal: error sending GIF: {err}");
                self.report(ErrorCode::TransactionFailed, err.to_string());
                self.set_loading(false).await;
                SubmitOutcome::Failed
            }
        }
    }

    async fn program_client(&self) -> Option<GifProgramClient> {
        let identity = self.wallet.identity().await?;
        let wallet = self.wallet.provider()?;
        Some(self.chain.get_provider(wallet, identity))
    }

    async fn set_loading(&self, loading: bool) {
        self.inner.lock().await.loading = loading;
        self.publish_view().await;
    }

    async fn publish_view(&self) -> ViewState {
        let view = self.view().await;
        let _ = self.events.send(PortalEvent::ViewChanged(view.clone()));
        view
    }

    /// User-facing codes become blocking alerts; the rest are status only.
    fn report(&self, code: ErrorCode, message: impl Into<String>) {
        let err = PortalError::new(code, message);
        let event = if code.is_user_facing() {
            PortalEvent::Alert(err)
        } else {
            PortalEvent::OperationFailed(err)
        };
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
