//! Runtime bridge between UI command queue and backend event intake.

use std::{path::PathBuf, sync::Arc, thread, time::Duration};

use anyhow::{Context, Result};
use client_core::{PortalController, PortalEvent, PortalSettings, WalletProvider};
use crossbeam_channel::{Receiver, Sender};
use reqwest::Client as HttpClient;
use shared::domain::short_address;
use tokio::sync::broadcast::{self, error::RecvError};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};
use crate::ui::preview::decode_gif_preview;

/// Larger downloads are not previewed; the card keeps its link.
const MAX_PREVIEW_BYTES: u64 = 16 * 1024 * 1024;
const PREVIEW_TIMEOUT: Duration = Duration::from_secs(20);

pub fn launch(settings: PortalSettings, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                startup_failure(&ui_tx, format!("failed to build runtime: {err}"));
                return;
            }
        };

        runtime.block_on(async move {
            let controller = match build_controller(settings) {
                Ok(controller) => controller,
                Err(err) => {
                    startup_failure(&ui_tx, format!("{err:#}"));
                    return;
                }
            };
            let http = match HttpClient::builder().timeout(PREVIEW_TIMEOUT).build() {
                Ok(http) => http,
                Err(err) => {
                    startup_failure(&ui_tx, format!("failed to build http client: {err}"));
                    return;
                }
            };

            tokio::spawn(forward_portal_events(
                controller.subscribe_events(),
                ui_tx.clone(),
            ));

            let _ = ui_tx.try_send(UiEvent::Info(format!(
                "Backend worker ready; base account {}",
                short_address(&controller.base_account())
            )));

            while let Ok(cmd) = cmd_rx.recv() {
                tracing::info!(command = cmd.name(), "backend: command");
                match cmd {
                    BackendCommand::Load => {
                        controller.on_load().await;
                    }
                    BackendCommand::ConnectWallet => {
                        controller.connect_wallet().await;
                    }
                    BackendCommand::InitializeAccount => {
                        let outcome = controller.initialize_account().await;
                        tracing::info!(?outcome, "backend: initialize_account finished");
                    }
                    BackendCommand::RefreshGifList => {
                        controller.refresh().await;
                    }
                    BackendCommand::SubmitGif { link } => {
                        let outcome = controller.submit(link).await;
                        tracing::info!(?outcome, "backend: submit_gif finished");
                    }
                    BackendCommand::FetchGifPreview { link } => {
                        let http = http.clone();
                        let ui_tx = ui_tx.clone();
                        tokio::spawn(async move {
                            let _ = ui_tx.try_send(fetch_gif_preview(&http, link).await);
                        });
                    }
                }
            }
            tracing::info!("backend: command queue closed, shutting down");
        });
    });
}

/// Relays controller events to the UI until the controller goes away.
/// Views are full snapshots, so skipped events only delay the UI.
async fn forward_portal_events(mut events: broadcast::Receiver<PortalEvent>, ui_tx: Sender<UiEvent>) {
    loop {
        match events.recv().await {
            Ok(event) => {
                let _ = ui_tx.try_send(UiEvent::from(event));
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!("backend: event forwarder lagged, skipped={skipped}");
            }
            Err(RecvError::Closed) => break,
        }
    }
    tracing::debug!("backend: portal event stream closed");
}

async fn fetch_gif_preview(http: &HttpClient, link: String) -> UiEvent {
    let decoded = match download_preview(http, &link).await {
        Ok(bytes) => tokio::task::spawn_blocking(move || decode_gif_preview(&bytes))
            .await
            .unwrap_or_else(|err| Err(format!("preview decoder stopped: {err}"))),
        Err(err) => Err(err),
    };
    match decoded {
        Ok((image, decoded_gif)) => UiEvent::GifPreviewLoaded {
            link,
            image,
            decoded_gif,
        },
        Err(reason) => {
            tracing::debug!("backend: preview unavailable link={link} reason={reason}");
            UiEvent::GifPreviewFailed { link, reason }
        }
    }
}

async fn download_preview(http: &HttpClient, link: &str) -> Result<Vec<u8>, String> {
    let response = http
        .get(link)
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(|err| format!("failed to download preview: {err}"))?;
    if response
        .content_length()
        .is_some_and(|len| len > MAX_PREVIEW_BYTES)
    {
        return Err("image is too large to preview".to_string());
    }
    let bytes = response
        .bytes()
        .await
        .map_err(|err| format!("failed to download preview: {err}"))?;
    if bytes.len() as u64 > MAX_PREVIEW_BYTES {
        return Err("image is too large to preview".to_string());
    }
    Ok(bytes.to_vec())
}

fn startup_failure(ui_tx: &Sender<UiEvent>, message: String) {
    tracing::error!("backend worker startup failure: {message}");
    let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
        UiErrorContext::BackendStartup,
        format!("backend worker startup failure: {message}"),
    )));
}

fn build_controller(mut settings: PortalSettings) -> Result<Arc<PortalController>> {
    if settings.wallet_keypair.is_none() {
        settings.wallet_keypair = default_wallet_path();
    }
    let wallet: Option<Arc<dyn WalletProvider>> =
        settings.wallet().context("failed to load wallet keypair")?;
    let config = settings
        .into_config()
        .context("invalid portal settings")?;
    Ok(PortalController::new(config, wallet))
}

/// Solana CLI default keypair location.
fn default_wallet_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("solana").join("id.json"))
}
