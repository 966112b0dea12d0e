//! In-process bridge used when no real host is attached.
//!
//! DESIGN
//! ======
//! `SimulatedBridge` keeps storage in memory (optionally mirrored to a JSON
//! file), records every host call in order, and lets the caller inject
//! failures per call kind, status changes and hub events. The binary uses it
//! as a stand-in for the glasses; tests use the call log as their oracle.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use hubwire::{DeviceInfo, DeviceStatus, HubEvent, ImageRawDataUpdate, PageLayout};
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::{BridgeError, DeviceBridge, Storage, Subscription};

// =============================================================================
// CALL LOG
// =============================================================================

/// Host call identifiers, named after the host API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    GetDeviceInfo,
    GetLocalStorage,
    SetLocalStorage,
    CreateStartupPage,
    RebuildPage,
    UpdateImageRawData,
}

impl CallKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GetDeviceInfo => "getDeviceInfo",
            Self::GetLocalStorage => "getLocalStorage",
            Self::SetLocalStorage => "setLocalStorage",
            Self::CreateStartupPage => "createStartUpPageContainer",
            Self::RebuildPage => "rebuildPageContainer",
            Self::UpdateImageRawData => "updateImageRawData",
        }
    }
}

/// One recorded host call with the payload it carried.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeCall {
    GetDeviceInfo,
    GetLocalStorage { key: String },
    SetLocalStorage { key: String, value: String },
    CreateStartupPage(PageLayout),
    RebuildPage(PageLayout),
    UpdateImageRawData { container_id: u32, len: usize },
}

impl BridgeCall {
    #[must_use]
    pub fn kind(&self) -> CallKind {
        match self {
            Self::GetDeviceInfo => CallKind::GetDeviceInfo,
            Self::GetLocalStorage { .. } => CallKind::GetLocalStorage,
            Self::SetLocalStorage { .. } => CallKind::SetLocalStorage,
            Self::CreateStartupPage(_) => CallKind::CreateStartupPage,
            Self::RebuildPage(_) => CallKind::RebuildPage,
            Self::UpdateImageRawData { .. } => CallKind::UpdateImageRawData,
        }
    }
}

// =============================================================================
// STATE
// =============================================================================

#[derive(Default)]
struct SimState {
    storage: HashMap<String, String>,
    calls: Vec<BridgeCall>,
    failing: HashSet<CallKind>,
    status: DeviceStatus,
    status_subs: HashMap<u64, mpsc::Sender<DeviceStatus>>,
    event_subs: HashMap<u64, mpsc::Sender<HubEvent>>,
    next_sub_id: u64,
    last_page: Option<PageLayout>,
}

fn status_subs(state: &mut SimState) -> &mut HashMap<u64, mpsc::Sender<DeviceStatus>> {
    &mut state.status_subs
}

fn event_subs(state: &mut SimState) -> &mut HashMap<u64, mpsc::Sender<HubEvent>> {
    &mut state.event_subs
}

/// Cloneable handle to one simulated pair of glasses.
#[derive(Clone, Default)]
pub struct SimulatedBridge {
    state: Arc<Mutex<SimState>>,
    store_file: Option<PathBuf>,
}

impl SimulatedBridge {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulator whose storage is loaded from and written back to `path`.
    /// A missing or unreadable file starts with empty storage.
    pub async fn with_store_file(path: PathBuf) -> Self {
        let storage = match tokio::fs::read_to_string(&path).await {
            Ok(text) => serde_json::from_str::<HashMap<String, String>>(&text).unwrap_or_else(|e| {
                warn!(error = %e, path = %path.display(), "simulator store unreadable; starting empty");
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        };
        let bridge = Self { state: Arc::default(), store_file: Some(path) };
        bridge.lock().storage = storage;
        bridge
    }

    #[must_use]
    pub fn with_status(self, status: DeviceStatus) -> Self {
        self.lock().status = status;
        self
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Make every subsequent call of `kind` fail until [`Self::heal`].
    pub fn fail(&self, kind: CallKind) {
        self.lock().failing.insert(kind);
    }

    pub fn heal(&self, kind: CallKind) {
        self.lock().failing.remove(&kind);
    }

    pub fn seed_storage(&self, key: &str, value: &str) {
        self.lock().storage.insert(key.to_owned(), value.to_owned());
    }

    #[must_use]
    pub fn storage_value(&self, key: &str) -> Option<String> {
        self.lock().storage.get(key).cloned()
    }

    #[must_use]
    pub fn calls(&self) -> Vec<BridgeCall> {
        self.lock().calls.clone()
    }

    #[must_use]
    pub fn count(&self, kind: CallKind) -> usize {
        self.lock().calls.iter().filter(|call| call.kind() == kind).count()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Last page successfully shown, created or rebuilt.
    #[must_use]
    pub fn last_page(&self) -> Option<PageLayout> {
        self.lock().last_page.clone()
    }

    /// Number of live `(status, event)` listeners.
    #[must_use]
    pub fn subscriber_counts(&self) -> (usize, usize) {
        let state = self.lock();
        (state.status_subs.len(), state.event_subs.len())
    }

    /// Change the device status and notify status listeners.
    pub async fn set_status(&self, status: DeviceStatus) {
        let senders: Vec<_> = {
            let mut state = self.lock();
            state.status = status;
            state.status_subs.values().cloned().collect()
        };
        for tx in senders {
            let _ = tx.send(status).await;
        }
    }

    /// Deliver an input event to every hub event listener.
    pub async fn emit(&self, event: HubEvent) {
        let senders: Vec<_> = self.lock().event_subs.values().cloned().collect();
        for tx in senders {
            let _ = tx.send(event.clone()).await;
        }
    }

    /// Decode a raw host event payload and deliver it like [`Self::emit`].
    ///
    /// # Errors
    ///
    /// `Codec` if the payload is not a valid hub event.
    pub async fn emit_json(&self, raw: &str) -> Result<(), BridgeError> {
        let event = hubwire::decode_event(raw)?;
        self.emit(event).await;
        Ok(())
    }

    fn record(&self, call: BridgeCall) -> Result<(), BridgeError> {
        let kind = call.kind();
        let mut state = self.lock();
        state.calls.push(call);
        if state.failing.contains(&kind) {
            return Err(BridgeError::Call { call: kind.as_str(), message: "injected failure".to_owned() });
        }
        Ok(())
    }

    async fn write_store_file(&self) {
        let Some(path) = &self.store_file else {
            return;
        };
        let snapshot = self.lock().storage.clone();
        let text = match serde_json::to_string_pretty(&snapshot) {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "simulator store encode failed");
                return;
            }
        };
        if let Err(e) = tokio::fs::write(path, text).await {
            warn!(error = %e, path = %path.display(), "simulator store write failed");
        }
    }

    fn subscribe<T>(&self, select: fn(&mut SimState) -> &mut HashMap<u64, mpsc::Sender<T>>, tx: mpsc::Sender<T>) -> Subscription
    where
        T: Send + 'static,
    {
        let id = {
            let mut state = self.lock();
            let id = state.next_sub_id;
            state.next_sub_id += 1;
            select(&mut *state).insert(id, tx);
            id
        };
        let shared = Arc::clone(&self.state);
        Subscription::new(move || {
            let mut state = shared.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            select(&mut *state).remove(&id);
        })
    }
}

// =============================================================================
// HOST API
// =============================================================================

#[async_trait::async_trait]
impl Storage for SimulatedBridge {
    async fn get_local_storage(&self, key: &str) -> Result<Option<String>, BridgeError> {
        self.record(BridgeCall::GetLocalStorage { key: key.to_owned() }).map_err(|e| storage_error("get", key, &e))?;
        Ok(self.lock().storage.get(key).cloned())
    }

    async fn set_local_storage(&self, key: &str, value: &str) -> Result<(), BridgeError> {
        self.record(BridgeCall::SetLocalStorage { key: key.to_owned(), value: value.to_owned() })
            .map_err(|e| storage_error("set", key, &e))?;
        self.lock().storage.insert(key.to_owned(), value.to_owned());
        self.write_store_file().await;
        Ok(())
    }
}

fn storage_error(op: &'static str, key: &str, cause: &BridgeError) -> BridgeError {
    BridgeError::Storage { op, key: key.to_owned(), message: cause.to_string() }
}

#[async_trait::async_trait]
impl DeviceBridge for SimulatedBridge {
    async fn get_device_info(&self) -> Result<DeviceInfo, BridgeError> {
        self.record(BridgeCall::GetDeviceInfo)?;
        // Answer as the host does: a JSON envelope decoded on our side.
        let raw = hubwire::encode(&DeviceInfo { status: self.lock().status })?;
        Ok(hubwire::decode_device_info(&raw)?)
    }

    async fn create_startup_page(&self, page: &PageLayout) -> Result<(), BridgeError> {
        self.record(BridgeCall::CreateStartupPage(page.clone()))?;
        let payload = hubwire::encode(page)?;
        info!(containers = page.container_total_num, bytes = payload.len(), "simulator: startup page created");
        self.lock().last_page = Some(page.clone());
        Ok(())
    }

    async fn rebuild_page(&self, page: &PageLayout) -> Result<(), BridgeError> {
        self.record(BridgeCall::RebuildPage(page.clone()))?;
        let payload = hubwire::encode(page)?;
        info!(containers = page.container_total_num, bytes = payload.len(), "simulator: page rebuilt");
        self.lock().last_page = Some(page.clone());
        Ok(())
    }

    async fn update_image_raw_data(&self, update: &ImageRawDataUpdate) -> Result<(), BridgeError> {
        self.record(BridgeCall::UpdateImageRawData { container_id: update.container_id, len: update.image_data.len() })?;
        info!(container_id = update.container_id, bytes = update.image_data.len(), "simulator: image pushed");
        Ok(())
    }

    fn on_device_status_changed(&self, tx: mpsc::Sender<DeviceStatus>) -> Subscription {
        self.subscribe(status_subs, tx)
    }

    fn on_hub_event(&self, tx: mpsc::Sender<HubEvent>) -> Subscription {
        self.subscribe(event_subs, tx)
    }
}

// =============================================================================
// RENDERING
// =============================================================================

/// Plain-text picture of a page, as the console prints it.
#[must_use]
pub fn render_page(page: &PageLayout) -> String {
    let mut lines: Vec<String> = page.text_object.iter().map(|text| text.content.clone()).collect();
    for list in page.list_object.iter().flatten() {
        lines.extend(list.item_container.item_name.iter().map(|row| format!("  {row}")));
    }
    for image in page.image_object.iter().flatten() {
        lines.push(format!("<image {} {}x{}>", image.container_name, image.rect.width, image.rect.height));
    }
    lines.join("\n")
}

#[cfg(test)]
#[path = "simulator_test.rs"]
mod tests;
