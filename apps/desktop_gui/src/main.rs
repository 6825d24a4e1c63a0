mod backend_bridge;
mod controller;
mod ui;

use clap::Parser;
use crossbeam_channel::bounded;
use eframe::egui;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::ui::PortalApp;

#[derive(Parser, Debug)]
#[command(about = "Desktop client for the Solana GIF portal")]
struct Cli {
    /// Overrides `cluster_url`; `local` runs against an in-process ledger.
    #[arg(long)]
    cluster: Option<String>,
    /// Overrides `wallet_keypair`.
    #[arg(long)]
    wallet: Option<std::path::PathBuf>,
    /// Overrides `base_account_keypair`.
    #[arg(long)]
    base_account: Option<std::path::PathBuf>,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let cli = Cli::parse();
    let mut settings = client_core::load_settings();
    if let Some(cluster) = cli.cluster {
        settings.cluster_url = cluster;
    }
    if let Some(wallet) = cli.wallet {
        settings.wallet_keypair = Some(wallet);
    }
    if let Some(base_account) = cli.base_account {
        settings.base_account_keypair = base_account;
    }

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(1024);
    backend_bridge::runtime::launch(settings, cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("GIF Portal")
            .with_inner_size([960.0, 720.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };
    eframe::run_native(
        "GIF Portal",
        options,
        Box::new(|_cc| Ok(Box::new(PortalApp::new(cmd_tx, ui_rx)))),
    )
}
