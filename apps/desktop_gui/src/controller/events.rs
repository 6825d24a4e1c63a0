//! UI/backend events and error modeling for desktop GUI controller.

use client_core::{PortalEvent, ViewState};
use shared::error::{ErrorCode, PortalError};

use crate::ui::preview::{DecodedGifPreview, PreviewImage};

pub enum UiEvent {
    Info(String),
    View(ViewState),
    /// Blocking notice shown in a modal window.
    Alert(String),
    InputCleared,
    Error(UiError),
    GifPreviewLoaded {
        link: String,
        image: PreviewImage,
        decoded_gif: Option<DecodedGifPreview>,
    },
    GifPreviewFailed {
        link: String,
        reason: String,
    },
}

impl From<PortalEvent> for UiEvent {
    fn from(event: PortalEvent) -> Self {
        match event {
            PortalEvent::Alert(err) => UiEvent::Alert(err.message),
            PortalEvent::InputCleared => UiEvent::InputCleared,
            PortalEvent::ViewChanged(view) => UiEvent::View(view),
            PortalEvent::OperationFailed(err) => UiEvent::Error(UiError::from_portal(err)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Wallet,
    Transport,
    Transaction,
    Validation,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Wallet,
    FetchGifs,
    Transaction,
    General,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("wallet")
            || message_lower.contains("rejected the request")
        {
            UiErrorCategory::Wallet
        } else if message_lower.contains("custom program error")
            || message_lower.contains("anchorerror")
            || message_lower.contains("already in use")
            || message_lower.contains("instruction")
            || message_lower.contains("insufficient")
        {
            UiErrorCategory::Transaction
        } else if message_lower.contains("invalid")
            || message_lower.contains("missing")
            || message_lower.contains("malformed")
        {
            UiErrorCategory::Validation
        } else if message_lower.contains("timeout")
            || message_lower.contains("timed out")
            || message_lower.contains("connection")
            || message_lower.contains("network")
            || message_lower.contains("unavailable")
            || message_lower.contains("blockhash not found")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn from_portal(err: PortalError) -> Self {
        let context = match err.code {
            ErrorCode::WalletMissing => UiErrorContext::Wallet,
            ErrorCode::FetchFailed => UiErrorContext::FetchGifs,
            ErrorCode::TransactionFailed => UiErrorContext::Transaction,
            ErrorCode::Validation => UiErrorContext::General,
        };
        Self::from_message(context, err.message)
    }

    pub fn is_retryable(&self) -> bool {
        self.category == UiErrorCategory::Transport
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::Wallet => "Wallet",
        UiErrorCategory::Transport => "Network",
        UiErrorCategory::Transaction => "Transaction",
        UiErrorCategory::Validation => "Validation",
        UiErrorCategory::Unknown => "Error",
    }
}
