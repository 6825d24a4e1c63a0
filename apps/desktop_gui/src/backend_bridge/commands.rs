//! Backend commands queued from UI to backend worker.

pub enum BackendCommand {
    /// Trust-only reconnect and first fetch, sent once at start-up.
    Load,
    ConnectWallet,
    InitializeAccount,
    RefreshGifList,
    SubmitGif {
        link: String,
    },
    /// Downloads and decodes a GIF for the inline preview.
    FetchGifPreview {
        link: String,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::ConnectWallet => "connect_wallet",
            Self::InitializeAccount => "initialize_account",
            Self::RefreshGifList => "refresh_gif_list",
            Self::SubmitGif { .. } => "submit_gif",
            Self::FetchGifPreview { .. } => "fetch_gif_preview",
        }
    }
}
