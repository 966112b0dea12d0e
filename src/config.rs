//! Runtime configuration parsed from environment variables.
//!
//! Every knob has a default, so an empty environment runs the simulator
//! with the splash enabled. Unparseable values fall back to the default.

use std::path::PathBuf;
use std::time::Duration;

use crate::splash::AssetSource;

pub const DEFAULT_BRIDGE_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_SPLASH_MIN_MS: u64 = 3_000;
pub const DEFAULT_SPLASH_ASSET: &str = "public/smart-cart-ar.png";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplashConfig {
    pub min_dwell: Duration,
    pub asset: AssetSource,
}

impl Default for SplashConfig {
    fn default() -> Self {
        Self {
            min_dwell: Duration::from_millis(DEFAULT_SPLASH_MIN_MS),
            asset: AssetSource::parse(DEFAULT_SPLASH_ASSET),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// How long to wait for the host bridge before running local-only.
    pub bridge_timeout: Duration,
    /// `None` skips the splash and goes straight to the list.
    pub splash: Option<SplashConfig>,
    /// Attach the in-process simulated glasses.
    pub simulator: bool,
    /// File backing the simulator's key/value storage across runs.
    pub simulator_store: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bridge_timeout: Duration::from_millis(DEFAULT_BRIDGE_TIMEOUT_MS),
            splash: Some(SplashConfig::default()),
            simulator: true,
            simulator_store: None,
        }
    }
}

impl AppConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `CART_BRIDGE_TIMEOUT_MS`: default 10000
    /// - `CART_SPLASH_ENABLED`: default true
    /// - `CART_SPLASH_MIN_MS`: default 3000
    /// - `CART_SPLASH_ASSET`: file path or `http(s)://` URL
    /// - `CART_SIMULATOR`: default true
    /// - `CART_SIMULATOR_STORE`: unset keeps simulator storage in memory
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`] over an arbitrary key lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parse_ms = |key: &str, default: u64| {
            Duration::from_millis(lookup(key).and_then(|v| v.trim().parse().ok()).unwrap_or(default))
        };
        let flag = |key: &str, default: bool| lookup(key).and_then(|v| parse_flag(&v)).unwrap_or(default);

        let splash = flag("CART_SPLASH_ENABLED", true).then(|| SplashConfig {
            min_dwell: parse_ms("CART_SPLASH_MIN_MS", DEFAULT_SPLASH_MIN_MS),
            asset: AssetSource::parse(&lookup("CART_SPLASH_ASSET").unwrap_or_else(|| DEFAULT_SPLASH_ASSET.to_owned())),
        });

        Self {
            bridge_timeout: parse_ms("CART_BRIDGE_TIMEOUT_MS", DEFAULT_BRIDGE_TIMEOUT_MS),
            splash,
            simulator: flag("CART_SIMULATOR", true),
            simulator_store: lookup("CART_SIMULATOR_STORE").filter(|v| !v.trim().is_empty()).map(PathBuf::from),
        }
    }
}

/// Parse a boolean switch. Accepts `1/0`, `true/false`, `yes/no`, `on/off`.
pub(crate) fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
