use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    WalletMissing,
    FetchFailed,
    TransactionFailed,
    Validation,
}

impl ErrorCode {
    /// Whether the failure is shown to the user as a blocking alert rather
    /// than only logged.
    pub fn is_user_facing(self) -> bool {
        matches!(self, Self::WalletMissing | Self::Validation)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortalError {
    pub code: ErrorCode,
    pub message: String,
}

impl PortalError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}
