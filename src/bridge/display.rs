//! Two-state page protocol on top of a [`DeviceBridge`].
//!
//! The host distinguishes "initial create" from "subsequent rebuild". This
//! wrapper tracks which one is due so callers just `show` a page. A failed
//! create leaves the state untouched, so the next push creates again.

use std::sync::Arc;

use hubwire::{ImageRawDataUpdate, PageLayout};
use tracing::debug;

use super::{BridgeError, DeviceBridge};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    NotInitialized,
    Initialized,
}

pub struct HubDisplay {
    bridge: Arc<dyn DeviceBridge>,
    state: PageState,
}

impl HubDisplay {
    #[must_use]
    pub fn new(bridge: Arc<dyn DeviceBridge>) -> Self {
        Self { bridge, state: PageState::NotInitialized }
    }

    #[must_use]
    pub fn state(&self) -> PageState {
        self.state
    }

    /// Replace everything on the glasses with `page`.
    ///
    /// # Errors
    ///
    /// Propagates the host call failure.
    pub async fn show(&mut self, page: &PageLayout) -> Result<(), BridgeError> {
        match self.state {
            PageState::NotInitialized => {
                self.bridge.create_startup_page(page).await?;
                self.state = PageState::Initialized;
                debug!(containers = page.container_total_num, "startup page created");
            }
            PageState::Initialized => {
                self.bridge.rebuild_page(page).await?;
                debug!(containers = page.container_total_num, "page rebuilt");
            }
        }
        Ok(())
    }

    /// Push raw pixels into an image container of the current page.
    ///
    /// # Errors
    ///
    /// Propagates the host call failure.
    pub async fn push_image(&self, update: &ImageRawDataUpdate) -> Result<(), BridgeError> {
        self.bridge.update_image_raw_data(update).await
    }
}

#[cfg(test)]
#[path = "display_test.rs"]
mod tests;
