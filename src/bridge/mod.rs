//! Device bridge: the host-provided channel to the glasses.
//!
//! ARCHITECTURE
//! ============
//! `Storage` is the key/value persistence half of the host API and
//! `DeviceBridge` extends it with device status, page pushes, image pushes
//! and input subscriptions. The sync engine only talks to these traits;
//! `simulator::SimulatedBridge` is the in-process implementation used by the
//! binary and by tests.
//!
//! Subscriptions deliver into caller-owned `mpsc` channels and return a
//! `Subscription` guard. Dropping or calling `unsubscribe` detaches the
//! listener.

pub mod display;
pub mod simulator;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use hubwire::{DeviceInfo, DeviceStatus, HubEvent, ImageRawDataUpdate, PageLayout};
use tokio::sync::mpsc;

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// No bridge was injected within the acquisition window.
    #[error("bridge unavailable after {waited_ms}ms")]
    Unavailable { waited_ms: u64 },
    /// A host call rejected.
    #[error("bridge call {call} failed: {message}")]
    Call { call: &'static str, message: String },
    /// Storage read or write failed.
    #[error("storage {op} failed for key {key}: {message}")]
    Storage { op: &'static str, key: String, message: String },
    /// A payload could not be converted to or from the wire format.
    #[error("wire codec error: {0}")]
    Codec(#[from] hubwire::CodecError),
}

// =============================================================================
// TRAITS
// =============================================================================

/// String key/value storage provided by the host.
#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    async fn get_local_storage(&self, key: &str) -> Result<Option<String>, BridgeError>;

    async fn set_local_storage(&self, key: &str, value: &str) -> Result<(), BridgeError>;
}

/// Full host API consumed by the sync engine and splash sequencer.
///
/// `create_startup_page` and `rebuild_page` take the same payload; the host
/// requires the former exactly once before any of the latter. Callers should
/// go through [`display::HubDisplay`] rather than choosing themselves.
#[async_trait::async_trait]
pub trait DeviceBridge: Storage {
    async fn get_device_info(&self) -> Result<DeviceInfo, BridgeError>;

    async fn create_startup_page(&self, page: &PageLayout) -> Result<(), BridgeError>;

    async fn rebuild_page(&self, page: &PageLayout) -> Result<(), BridgeError>;

    async fn update_image_raw_data(&self, update: &ImageRawDataUpdate) -> Result<(), BridgeError>;

    fn on_device_status_changed(&self, tx: mpsc::Sender<DeviceStatus>) -> Subscription;

    fn on_hub_event(&self, tx: mpsc::Sender<HubEvent>) -> Subscription;
}

// =============================================================================
// SUBSCRIPTION
// =============================================================================

/// Guard for a long-lived listener. Detaches on `unsubscribe` or drop.
#[must_use = "dropping a Subscription detaches the listener immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self { cancel: Some(Box::new(cancel)) }
    }

    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("active", &self.cancel.is_some()).finish()
    }
}

// =============================================================================
// ACQUISITION
// =============================================================================

/// Wait for the host to inject a bridge, giving up after `timeout`.
///
/// # Errors
///
/// Returns `Unavailable` on timeout, or whatever the connect future yields.
pub async fn acquire<F>(connect: F, timeout: Duration) -> Result<Arc<dyn DeviceBridge>, BridgeError>
where
    F: Future<Output = Result<Arc<dyn DeviceBridge>, BridgeError>>,
{
    match tokio::time::timeout(timeout, connect).await {
        Ok(result) => result,
        Err(_) => {
            let waited_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
            Err(BridgeError::Unavailable { waited_ms })
        }
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
