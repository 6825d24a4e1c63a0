use std::{path::PathBuf, str::FromStr, sync::Arc};

use anyhow::{bail, Context, Result};
use chain::{read_keypair, write_keypair, ChainTransport, Keypair, Signer, SolanaRpc};
use clap::{Parser, Subcommand};
use client_core::{
    InitializeOutcome, KeypairWallet, PortalController, PortalSettings, SubmitOutcome, ViewState,
    WalletProvider,
};
use shared::domain::{BaseAccount, Pubkey};

#[derive(Parser, Debug)]
struct Cli {
    /// Overrides `cluster_url` from portal.toml; `local` uses an in-process ledger.
    #[arg(long)]
    cluster: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Writes a new keypair file (e.g. the bundled base account).
    Keygen {
        #[arg(long, default_value = "keypair.json")]
        out: PathBuf,
        #[arg(long)]
        force: bool,
    },
    /// Prints the GIF list stored in a base account.
    Inspect {
        /// Base58 address; defaults to the configured base account keypair.
        #[arg(long)]
        address: Option<String>,
    },
    /// Creates a throwaway base account, adds one GIF and prints the list.
    Smoke {
        /// Payer keypair; a fresh one is generated for the local ledger.
        #[arg(long)]
        wallet: Option<PathBuf>,
        #[arg(long, default_value = "https://media.giphy.com/media/ICOgUNjpvO0PC/giphy.gif")]
        gif_link: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let cli = Cli::parse();
    let mut settings = client_core::load_settings();
    if let Some(cluster) = cli.cluster {
        settings.cluster_url = cluster;
    }

    match cli.command {
        Command::Keygen { out, force } => {
            if out.exists() && !force {
                bail!("{} already exists; pass --force to overwrite", out.display());
            }
            let keypair = Keypair::new();
            write_keypair(&keypair, &out)?;
            println!("wrote {} pubkey={}", out.display(), keypair.pubkey());
        }
        Command::Inspect { address } => {
            if settings.is_local() {
                bail!("the local ledger lives only inside a running process; pass --cluster <url>");
            }
            let address = match address {
                Some(address) => Pubkey::from_str(&address)
                    .with_context(|| format!("invalid address '{address}'"))?,
                None => settings.base_account()?.pubkey(),
            };
            let rpc = SolanaRpc::new(settings.cluster_url.clone(), client_core::program::commitment());
            let Some(account) = rpc.get_account(&address).await? else {
                println!("account {address} does not exist");
                return Ok(());
            };
            let base = BaseAccount::try_from_account_data(&account.data)
                .with_context(|| format!("account {address} is not a GIF portal account"))?;
            println!("account {address} owner={}", account.owner);
            print_account(&base);
        }
        Command::Smoke { wallet, gif_link } => smoke(settings, wallet, &gif_link).await?,
    }

    Ok(())
}

async fn smoke(mut settings: PortalSettings, wallet: Option<PathBuf>, gif_link: &str) -> Result<()> {
    let payer = match wallet {
        Some(path) => read_keypair(&path)?,
        None if settings.is_local() => Keypair::new(),
        None => bail!("--wallet is required against a remote cluster"),
    };
    println!("payer {}", payer.pubkey());

    let base_path = std::env::temp_dir().join(format!("gif-portal-smoke-{}.json", std::process::id()));
    write_keypair(&Keypair::new(), &base_path)?;
    settings.base_account_keypair = base_path.clone();
    let config = settings.into_config()?;
    std::fs::remove_file(&base_path).ok();

    let provider: Arc<dyn WalletProvider> = Arc::new(KeypairWallet::new("smoke", payer, true));
    let portal = PortalController::new(config, Some(provider));
    println!("base account {}", portal.base_account());

    let view = portal.on_load().await;
    if view != ViewState::Uninitialized {
        bail!("expected a fresh base account, got {}", view.label());
    }
    if portal.initialize_account().await != InitializeOutcome::Initialized {
        bail!("initialize failed; see log output");
    }
    println!("GIF count {}", gif_count(&portal.view().await)?);

    if portal.submit(gif_link).await != SubmitOutcome::Submitted {
        bail!("add_gif failed; see log output");
    }
    let view = portal.view().await;
    println!("GIF count {}", gif_count(&view)?);
    if let ViewState::Ready { gifs } = view {
        for item in gifs {
            println!("  {} by {}", item.gif_link, item.user_address);
        }
    }
    Ok(())
}

fn gif_count(view: &ViewState) -> Result<usize> {
    match view {
        ViewState::Ready { gifs } => Ok(gifs.len()),
        other => bail!("GIF list not ready: {}", other.label()),
    }
}

fn print_account(account: &BaseAccount) {
    println!("GIF count {}", account.total_gifs);
    for (index, item) in account.gif_list.iter().enumerate() {
        println!("  {:>3} {} by {}", index + 1, item.gif_link, item.user_address);
    }
}
