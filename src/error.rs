//! Downgraded failure taxonomy for the sync engine and splash sequence.
//!
//! ERROR HANDLING
//! ==============
//! Every external-collaborator failure is caught at the engine or splash
//! boundary, logged, and recorded as a `SyncError`. None of them abort the
//! caller. There are no automatic retries; the next user mutation re-persists
//! and re-pushes the full state.

use crate::bridge::BridgeError;
use crate::splash::AssetError;

/// Grepable error code and retryable flag for logged failures.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// No device bridge; running on local state only.
    #[error("device bridge unavailable")]
    BridgeUnavailable,
    /// Storage read or write failed, or the list could not be encoded.
    #[error("persist failed: {0}")]
    PersistFailure(String),
    /// Persisted cart JSON was corrupt.
    #[error("persisted cart unreadable: {0}")]
    ParseFailure(#[source] serde_json::Error),
    /// Splash image could not be fetched or decoded.
    #[error("splash asset failed: {0}")]
    AssetLoadFailure(#[from] AssetError),
    /// A device call rejected; the display is stale until the next sync.
    #[error("bridge call failed: {0}")]
    BridgeCallFailure(#[source] BridgeError),
}

impl ErrorCode for SyncError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::BridgeUnavailable => "E_BRIDGE_UNAVAILABLE",
            Self::PersistFailure(_) => "E_PERSIST",
            Self::ParseFailure(_) => "E_PARSE",
            Self::AssetLoadFailure(_) => "E_ASSET_LOAD",
            Self::BridgeCallFailure(_) => "E_BRIDGE_CALL",
        }
    }
}

impl From<BridgeError> for SyncError {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::Unavailable { .. } => Self::BridgeUnavailable,
            BridgeError::Storage { .. } => Self::PersistFailure(err.to_string()),
            other => Self::BridgeCallFailure(other),
        }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
