use serde::{Deserialize, Serialize};
use shared::domain::{GifItem, WalletIdentity};

/// What the client last learned about the GIF list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ListSnapshot {
    /// Nothing fetched yet for the current wallet.
    #[default]
    Unknown,
    /// The base account does not exist.
    Absent,
    Unavailable(String),
    Loaded(Vec<GifItem>),
}

impl ListSnapshot {
    pub fn gifs(&self) -> Option<&[GifItem]> {
        match self {
            Self::Loaded(gifs) => Some(gifs),
            _ => None,
        }
    }
}

/// Screen the renderer should show. Derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewState {
    Disconnected,
    Loading,
    Uninitialized,
    Unavailable { reason: String },
    Ready { gifs: Vec<GifItem> },
}

impl ViewState {
    pub fn derive(
        identity: Option<&WalletIdentity>,
        snapshot: &ListSnapshot,
        loading: bool,
    ) -> Self {
        if identity.is_none() {
            return Self::Disconnected;
        }
        if loading {
            return Self::Loading;
        }
        match snapshot {
            ListSnapshot::Unknown => Self::Loading,
            ListSnapshot::Absent => Self::Uninitialized,
            ListSnapshot::Unavailable(reason) => Self::Unavailable {
                reason: reason.clone(),
            },
            ListSnapshot::Loaded(gifs) => Self::Ready { gifs: gifs.clone() },
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Loading => "loading",
            Self::Uninitialized => "uninitialized",
            Self::Unavailable { .. } => "unavailable",
            Self::Ready { .. } => "ready",
        }
    }
}
