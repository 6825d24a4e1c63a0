use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
    sync::Arc,
};

use chain::{read_keypair, Keypair, KeypairError, Signer};
use local_ledger::LocalLedger;
use serde::Deserialize;
use shared::{domain::Pubkey, protocol::DEFAULT_PROGRAM_ID};
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use crate::{
    program::Cluster,
    wallet::{KeypairWallet, WalletProvider},
};

pub const SETTINGS_FILE: &str = "portal.toml";
/// `cluster_url` value selecting the in-process ledger.
pub const LOCAL_CLUSTER: &str = "local";
pub const DEFAULT_CLUSTER_URL: &str = "https://api.devnet.solana.com";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PortalSettings {
    pub cluster_url: String,
    pub program_id: String,
    pub base_account_keypair: PathBuf,
    pub wallet_keypair: Option<PathBuf>,
    pub wallet_trusted: bool,
}

impl Default for PortalSettings {
    fn default() -> Self {
        Self {
            cluster_url: DEFAULT_CLUSTER_URL.into(),
            program_id: DEFAULT_PROGRAM_ID.into(),
            base_account_keypair: PathBuf::from("keypair.json"),
            wallet_keypair: None,
            wallet_trusted: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid cluster url '{url}': {source}")]
    InvalidClusterUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("cluster url '{0}' must use http or https")]
    UnsupportedScheme(String),
    #[error("invalid program id '{0}'")]
    InvalidProgramId(String),
    #[error("base account keypair {path} is missing; generate one with `tools keygen`")]
    MissingBaseAccount { path: PathBuf },
    #[error(transparent)]
    Keypair(#[from] KeypairError),
}

/// Everything the controller needs, resolved from settings.
pub struct PortalConfig {
    pub cluster: Cluster,
    pub program_id: Pubkey,
    pub base_account: Arc<Keypair>,
}

pub fn load_settings() -> PortalSettings {
    load_settings_with(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then the flat toml file, then `GIF_PORTAL_*` and `APP__*`
/// variables (the latter wins).
pub fn load_settings_with(
    file: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> PortalSettings {
    let mut settings = PortalSettings::default();

    if let Ok(raw) = fs::read_to_string(file) {
        match toml::from_str::<HashMap<String, String>>(&raw) {
            Ok(file_cfg) => {
                for (key, value) in file_cfg {
                    settings.apply(&key, value);
                }
            }
            Err(err) => warn!("config: ignoring malformed {}: {err}", file.display()),
        }
    }

    for key in [
        "cluster_url",
        "program_id",
        "base_account_keypair",
        "wallet_keypair",
        "wallet_trusted",
    ] {
        let upper = key.to_ascii_uppercase();
        if let Some(v) = env(&format!("GIF_PORTAL_{upper}")) {
            settings.apply(key, v);
        }
        if let Some(v) = env(&format!("APP__{upper}")) {
            settings.apply(key, v);
        }
    }

    settings
}

impl PortalSettings {
    fn apply(&mut self, key: &str, value: String) {
        match key {
            "cluster_url" => self.cluster_url = value,
            "program_id" => self.program_id = value,
            "base_account_keypair" => self.base_account_keypair = PathBuf::from(value),
            "wallet_keypair" => {
                self.wallet_keypair = (!value.trim().is_empty()).then(|| PathBuf::from(value))
            }
            "wallet_trusted" => {
                if let Ok(parsed) = value.trim().parse::<bool>() {
                    self.wallet_trusted = parsed;
                }
            }
            other => warn!("config: unknown setting {other}"),
        }
    }

    pub fn is_local(&self) -> bool {
        self.cluster_url == LOCAL_CLUSTER
    }

    pub fn program_id(&self) -> Result<Pubkey, SettingsError> {
        Pubkey::from_str(self.program_id.trim())
            .map_err(|_| SettingsError::InvalidProgramId(self.program_id.clone()))
    }

    pub fn cluster(&self, program_id: Pubkey) -> Result<Cluster, SettingsError> {
        if self.is_local() {
            return Ok(Cluster::Shared(Arc::new(LocalLedger::new(program_id))));
        }
        let url = Url::parse(&self.cluster_url).map_err(|source| {
            SettingsError::InvalidClusterUrl {
                url: self.cluster_url.clone(),
                source,
            }
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(SettingsError::UnsupportedScheme(self.cluster_url.clone()));
        }
        Ok(Cluster::Rpc {
            url: url.to_string(),
        })
    }

    /// Reads the base account keypair. The in-process ledger starts empty on
    /// every run, so a missing file there yields a throwaway keypair.
    pub fn base_account(&self) -> Result<Keypair, SettingsError> {
        if self.base_account_keypair.exists() {
            return Ok(read_keypair(&self.base_account_keypair)?);
        }
        if self.is_local() {
            let keypair = Keypair::new();
            info!(
                "config: generated ephemeral base account {} for the local ledger",
                keypair.pubkey()
            );
            return Ok(keypair);
        }
        Err(SettingsError::MissingBaseAccount {
            path: self.base_account_keypair.clone(),
        })
    }

    /// `Ok(None)` when no wallet keypair is configured or the file is absent,
    /// which the app treats as "no wallet installed".
    pub fn wallet(&self) -> Result<Option<Arc<dyn WalletProvider>>, SettingsError> {
        let Some(path) = &self.wallet_keypair else {
            return Ok(None);
        };
        if !path.exists() {
            warn!("config: wallet keypair {} not found", path.display());
            return Ok(None);
        }
        let keypair = read_keypair(path)?;
        let wallet = KeypairWallet::new("Keypair file", keypair, self.wallet_trusted);
        Ok(Some(Arc::new(wallet)))
    }

    pub fn into_config(self) -> Result<PortalConfig, SettingsError> {
        let program_id = self.program_id()?;
        let cluster = self.cluster(program_id)?;
        let base_account = Arc::new(self.base_account()?);
        info!(
            "config: cluster={cluster:?} program_id={program_id} base_account={}",
            base_account.pubkey()
        );
        Ok(PortalConfig {
            cluster,
            program_id,
            base_account,
        })
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
