//! Splash sequence: fixed-dwell startup screen before the list goes live.
//!
//! LIFECYCLE
//! =========
//! `Idle → ShowingSplash → AwaitingMinimumDuration → Live`
//!
//! 1. Enter `ShowingSplash`, start the dwell clock.
//! 2. Push the two-container splash page, then the image bytes.
//! 3. Enter `AwaitingMinimumDuration`; `hold` sleeps until the clock expires.
//! 4. The runtime hydrates the list, runs the first sync and marks `Live`.
//!
//! The dwell is measured from step 1, not from asset completion, so a slow
//! or failed asset never shortens or lengthens the screen. Asset and bridge
//! failures leave the splash blank and are only logged.

use std::path::PathBuf;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{info, warn};

use crate::error::{ErrorCode, SyncError};
use crate::layout;
use crate::sync::SyncEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    ShowingSplash,
    AwaitingMinimumDuration,
    Live,
}

// =============================================================================
// ASSET
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("asset read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("asset fetch failed: {0}")]
    Http(#[from] reqwest::Error),
    /// A dev server answered with its HTML fallback page instead of the image.
    #[error("asset {0} served as HTML")]
    HtmlFallback(String),
    #[error("asset is empty")]
    Empty,
}

/// Where the splash image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSource {
    File(PathBuf),
    Http(String),
}

impl AssetSource {
    /// `http://` and `https://` locations are fetched; anything else is a path.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Self::Http(raw.to_owned())
        } else {
            Self::File(PathBuf::from(raw))
        }
    }

    /// Fetch the raw image bytes.
    ///
    /// # Errors
    ///
    /// I/O or HTTP failure, an HTML response, or an empty body.
    pub async fn load(&self) -> Result<Vec<u8>, AssetError> {
        let bytes = match self {
            Self::File(path) => tokio::fs::read(path).await?,
            Self::Http(url) => {
                let response = reqwest::get(url).await?.error_for_status()?;
                let is_html = response
                    .headers()
                    .get(reqwest::header::CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .is_some_and(|v| v.contains("text/html"));
                if is_html {
                    return Err(AssetError::HtmlFallback(url.clone()));
                }
                response.bytes().await?.to_vec()
            }
        };
        if bytes.is_empty() {
            return Err(AssetError::Empty);
        }
        Ok(bytes)
    }
}

// =============================================================================
// SEQUENCER
// =============================================================================

pub struct SplashSequencer {
    min_dwell: Duration,
    asset: AssetSource,
}

impl SplashSequencer {
    #[must_use]
    pub fn new(min_dwell: Duration, asset: AssetSource) -> Self {
        Self { min_dwell, asset }
    }

    /// Show the splash page and image. Returns the instant at which the
    /// minimum dwell ends.
    pub async fn show(&self, engine: &SyncEngine) -> Instant {
        let deadline = Instant::now() + self.min_dwell;
        engine.set_phase(Phase::ShowingSplash).await;

        if let Err(e) = engine.show_page(&layout::splash_page()).await {
            warn!(code = e.error_code(), error = %e, "splash page push failed");
        }

        match self.asset.load().await {
            Ok(bytes) => {
                let len = bytes.len();
                if let Err(e) = engine.push_image(&layout::splash_image_update(bytes)).await {
                    warn!(code = e.error_code(), error = %e, "splash image push failed");
                } else {
                    info!(bytes = len, "splash image pushed");
                }
            }
            Err(e) => {
                let e = SyncError::from(e);
                warn!(code = e.error_code(), error = %e, asset = ?self.asset, "splash image unavailable");
            }
        }

        engine.set_phase(Phase::AwaitingMinimumDuration).await;
        deadline
    }

    /// Wait out the remainder of the dwell.
    pub async fn hold(&self, deadline: Instant) {
        tokio::time::sleep_until(deadline).await;
    }
}

#[cfg(test)]
#[path = "splash_test.rs"]
mod tests;
