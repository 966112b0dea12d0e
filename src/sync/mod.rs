//! Sync engine: the single writer of cart state.
//!
//! ARCHITECTURE
//! ============
//! The engine owns the authoritative `CartList` and, when a bridge is
//! attached, the two-state `HubDisplay`. Every entry point (phone
//! mutations, glasses clicks, hydration, splash pushes) takes the same
//! state lock and holds it until persistence and the page push have both
//! finished. That lock is the in-flight-sync guard: two syncs never
//! interleave, and a click handler always resolves its target against the
//! list as it stood when the handler entered.
//!
//! DESIGN
//! ======
//! `sync` is full-replace: persist the whole list, rebuild the whole page.
//! Without a bridge the engine only updates memory (simulator/disconnected
//! mode). Failures are logged and reported in `SyncOutcome`; they never
//! unwind the caller and never roll back the in-memory list.

pub mod events;
pub mod runtime;

use std::sync::Arc;

use hubwire::{DeviceStatus, HubEvent, ImageRawDataUpdate, PageLayout};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::bridge::DeviceBridge;
use crate::bridge::display::HubDisplay;
use crate::error::{ErrorCode, SyncError};
use crate::layout;
use crate::model::{CartList, IdAllocator, ItemId, ModelError};
use crate::splash::Phase;
use crate::store;

pub use events::{EventOutcome, IgnoreReason};

// =============================================================================
// OUTCOME
// =============================================================================

/// What a sync attempt did.
#[derive(Debug)]
pub enum SyncOutcome {
    /// The mutation was a no-op; nothing was persisted or pushed.
    Unchanged,
    /// No bridge attached; only memory was updated.
    LocalOnly,
    /// Bridge attached. Failed steps are listed in `failures`.
    Synced { persisted: bool, pushed: bool, failures: Vec<SyncError> },
}

impl SyncOutcome {
    /// True when both the persist and the page push succeeded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        matches!(self, Self::Synced { persisted: true, pushed: true, .. })
    }

    #[must_use]
    pub fn failures(&self) -> &[SyncError] {
        match self {
            Self::Synced { failures, .. } => failures,
            Self::Unchanged | Self::LocalOnly => &[],
        }
    }
}

// =============================================================================
// ENGINE
// =============================================================================

struct EngineState {
    list: CartList,
    ids: IdAllocator,
    display: Option<HubDisplay>,
}

pub struct SyncEngine {
    bridge: Option<Arc<dyn DeviceBridge>>,
    state: Mutex<EngineState>,
    phase: RwLock<Phase>,
    status: RwLock<DeviceStatus>,
}

impl SyncEngine {
    #[must_use]
    pub fn new(bridge: Option<Arc<dyn DeviceBridge>>) -> Self {
        let display = bridge.clone().map(HubDisplay::new);
        Self {
            bridge,
            state: Mutex::new(EngineState { list: CartList::new(), ids: IdAllocator::new(), display }),
            phase: RwLock::new(Phase::Idle),
            status: RwLock::new(DeviceStatus::default()),
        }
    }

    /// Engine with no bridge: mutations stay in memory.
    #[must_use]
    pub fn local_only() -> Self {
        Self::new(None)
    }

    /// Replace the id allocator. Used by tests to pin ids.
    #[must_use]
    pub fn with_id_allocator(mut self, ids: IdAllocator) -> Self {
        self.state.get_mut().ids = ids;
        self
    }

    #[must_use]
    pub fn has_bridge(&self) -> bool {
        self.bridge.is_some()
    }

    /// Copy of the authoritative list.
    pub async fn snapshot(&self) -> CartList {
        self.state.lock().await.list.clone()
    }

    pub async fn phase(&self) -> Phase {
        *self.phase.read().await
    }

    pub async fn is_live(&self) -> bool {
        self.phase().await == Phase::Live
    }

    pub(crate) async fn set_phase(&self, phase: Phase) {
        let mut current = self.phase.write().await;
        if *current != phase {
            info!(from = ?*current, to = ?phase, "phase changed");
            *current = phase;
        }
    }

    pub async fn device_status(&self) -> DeviceStatus {
        *self.status.read().await
    }

    pub(crate) async fn set_device_status(&self, status: DeviceStatus) {
        debug!(connected = status.connected, battery = status.battery_percent, "device status");
        *self.status.write().await = status;
    }

    /// Ask the bridge for the current device status and store it.
    ///
    /// # Errors
    ///
    /// `BridgeUnavailable` without a bridge, `BridgeCallFailure` if the
    /// call rejects. The stored status is left unchanged on error.
    pub async fn refresh_device_status(&self) -> Result<DeviceStatus, SyncError> {
        let bridge = self.bridge.as_ref().ok_or(SyncError::BridgeUnavailable)?;
        let info = bridge.get_device_info().await?;
        self.set_device_status(info.status).await;
        Ok(info.status)
    }

    // =========================================================================
    // SYNC
    // =========================================================================

    /// Make `list` authoritative, then persist it and push its page.
    pub async fn sync(&self, list: CartList) -> SyncOutcome {
        let mut state = self.state.lock().await;
        self.sync_locked(&mut state, list).await
    }

    async fn sync_locked(&self, state: &mut EngineState, list: CartList) -> SyncOutcome {
        state.list = list;

        let (Some(bridge), Some(display)) = (&self.bridge, state.display.as_mut()) else {
            debug!(items = state.list.len(), "no bridge; local-only sync");
            return SyncOutcome::LocalOnly;
        };

        let mut failures = Vec::new();

        let persisted = match store::save_list(bridge.as_ref(), &state.list).await {
            Ok(()) => true,
            Err(e) => {
                warn!(code = e.error_code(), error = %e, "cart persist failed; keeping in-memory state");
                failures.push(e);
                false
            }
        };

        let page = layout::build(&state.list).to_page();
        let pushed = match display.show(&page).await {
            Ok(()) => true,
            Err(e) => {
                let e = SyncError::from(e);
                warn!(code = e.error_code(), error = %e, "page push failed; display stale until next sync");
                failures.push(e);
                false
            }
        };

        debug!(items = state.list.len(), persisted, pushed, "sync finished");
        SyncOutcome::Synced { persisted, pushed, failures }
    }

    /// Load the persisted list and run the first sync.
    ///
    /// Missing, unreadable or corrupt storage hydrates an empty list.
    pub async fn hydrate(&self) -> SyncOutcome {
        let list = match &self.bridge {
            Some(bridge) => match store::load_list(bridge.as_ref()).await {
                Ok(list) => {
                    info!(items = list.len(), "cart hydrated");
                    list
                }
                Err(e) => {
                    warn!(code = e.error_code(), error = %e, "cart hydrate failed; starting empty");
                    CartList::new()
                }
            },
            None => CartList::new(),
        };

        let mut state = self.state.lock().await;
        state.ids.observe(&list);
        self.sync_locked(&mut state, list).await
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    async fn mutate<F>(&self, apply: F) -> SyncOutcome
    where
        F: FnOnce(&CartList, &mut IdAllocator) -> CartList,
    {
        let mut state = self.state.lock().await;
        let next = {
            let EngineState { list, ids, .. } = &mut *state;
            apply(list, ids)
        };
        if next == state.list {
            return SyncOutcome::Unchanged;
        }
        self.sync_locked(&mut state, next).await
    }

    pub async fn add(&self, name: &str) -> SyncOutcome {
        self.mutate(|list, ids| list.add(name, ids)).await
    }

    pub async fn remove(&self, id: ItemId) -> SyncOutcome {
        self.mutate(|list, _| list.remove(id)).await
    }

    pub async fn toggle(&self, id: ItemId) -> SyncOutcome {
        self.mutate(|list, _| list.toggle(id)).await
    }

    pub async fn clear_completed(&self) -> SyncOutcome {
        self.mutate(|list, _| list.clear_completed()).await
    }

    /// Apply a new order given as the full id sequence.
    ///
    /// # Errors
    ///
    /// `NotAPermutation` if `order` is not exactly the current id set; the
    /// list is left untouched and nothing is synced.
    pub async fn reorder(&self, order: &[ItemId]) -> Result<SyncOutcome, ModelError> {
        let mut state = self.state.lock().await;
        let next = state.list.reorder(order)?;
        if next == state.list {
            return Ok(SyncOutcome::Unchanged);
        }
        Ok(self.sync_locked(&mut state, next).await)
    }

    /// Drag-style reorder: move the row at `from` to `to`.
    ///
    /// # Errors
    ///
    /// `IndexOutOfRange` if either index is past the end.
    pub async fn move_item(&self, from: usize, to: usize) -> Result<SyncOutcome, ModelError> {
        let mut state = self.state.lock().await;
        let next = state.list.move_item(from, to)?;
        if next == state.list {
            return Ok(SyncOutcome::Unchanged);
        }
        Ok(self.sync_locked(&mut state, next).await)
    }

    // =========================================================================
    // INBOUND EVENTS
    // =========================================================================

    /// Map a glasses input event back onto the list. Only clicks toggle.
    pub async fn handle_input_event(&self, event: &HubEvent) -> EventOutcome {
        if !self.is_live().await {
            debug!("input ignored before startup completed");
            return EventOutcome::Ignored(IgnoreReason::NotLive);
        }

        let mut state = self.state.lock().await;
        let snapshot = state.list.clone();
        let index = match events::resolve_click(event, &snapshot) {
            Ok(index) => index,
            Err(reason) => {
                debug!(?reason, "input ignored");
                return EventOutcome::Ignored(reason);
            }
        };
        let Some(next) = snapshot.toggle_at(index) else {
            return EventOutcome::Ignored(IgnoreReason::NoSuchItem(i64::try_from(index).unwrap_or(i64::MAX)));
        };

        info!(index, "glasses click toggled item");
        let outcome = self.sync_locked(&mut state, next).await;
        EventOutcome::Toggled { index, outcome }
    }

    // =========================================================================
    // RAW DISPLAY ACCESS
    // =========================================================================

    /// Push a page that is not derived from the list (the splash screen).
    pub(crate) async fn show_page(&self, page: &PageLayout) -> Result<(), SyncError> {
        let mut state = self.state.lock().await;
        let display = state.display.as_mut().ok_or(SyncError::BridgeUnavailable)?;
        display.show(page).await?;
        Ok(())
    }

    pub(crate) async fn push_image(&self, update: &ImageRawDataUpdate) -> Result<(), SyncError> {
        let state = self.state.lock().await;
        let display = state.display.as_ref().ok_or(SyncError::BridgeUnavailable)?;
        display.push_image(update).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
