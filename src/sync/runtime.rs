//! Startup orchestration and listener lifecycle.
//!
//! LIFECYCLE
//! =========
//! `connect`: wait (bounded) for the bridge, build the engine, subscribe to
//! status and input events and spawn one listener task per stream. Input
//! events are gated on `Phase::Live` inside the engine, so subscribing
//! early is harmless.
//!
//! `boot`: splash (if enabled and a bridge is attached), device status,
//! hold for the minimum dwell, hydrate plus first sync, then `Live`.
//!
//! `spawn_boot` runs `boot` as a background task so the console stays
//! responsive during the splash.
//!
//! `shutdown`: wait for a background boot to finish, cancel both
//! subscriptions, then wait for the listeners to drain. A sync already in
//! flight finishes before its task exits.

use std::future::Future;
use std::sync::Arc;

use hubwire::{DeviceStatus, HubEvent};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::SyncEngine;
use crate::bridge::{self, BridgeError, DeviceBridge, Subscription};
use crate::config::AppConfig;
use crate::error::{ErrorCode, SyncError};
use crate::splash::{Phase, SplashSequencer};

const STATUS_QUEUE: usize = 16;
const EVENT_QUEUE: usize = 64;

pub struct CartRuntime {
    engine: Arc<SyncEngine>,
    subscriptions: Vec<Subscription>,
    tasks: Vec<JoinHandle<()>>,
    boot: Option<JoinHandle<()>>,
}

impl CartRuntime {
    /// Connect and boot in one go.
    pub async fn start<F>(config: &AppConfig, connect: F) -> Self
    where
        F: Future<Output = Result<Arc<dyn DeviceBridge>, BridgeError>>,
    {
        let runtime = Self::connect(config, connect).await;
        boot(&runtime.engine, config).await;
        runtime
    }

    /// Runtime with no bridge and no listeners, for when no host will
    /// ever inject one.
    #[must_use]
    pub fn local_only() -> Self {
        Self { engine: Arc::new(SyncEngine::local_only()), subscriptions: Vec::new(), tasks: Vec::new(), boot: None }
    }

    /// Acquire the bridge and wire up listeners. Falls back to a
    /// local-only engine if the bridge never shows up.
    pub async fn connect<F>(config: &AppConfig, connect: F) -> Self
    where
        F: Future<Output = Result<Arc<dyn DeviceBridge>, BridgeError>>,
    {
        let bridge = match bridge::acquire(connect, config.bridge_timeout).await {
            Ok(bridge) => bridge,
            Err(e) => {
                let e = SyncError::from(e);
                warn!(code = e.error_code(), error = %e, "glasses bridge unavailable; running local-only");
                return Self::local_only();
            }
        };
        info!("glasses bridge acquired");

        let engine = Arc::new(SyncEngine::new(Some(Arc::clone(&bridge))));

        let (status_tx, status_rx) = mpsc::channel(STATUS_QUEUE);
        let (event_tx, event_rx) = mpsc::channel(EVENT_QUEUE);
        let subscriptions = vec![bridge.on_device_status_changed(status_tx), bridge.on_hub_event(event_tx)];
        let tasks = vec![
            spawn_status_listener(Arc::clone(&engine), status_rx),
            spawn_event_listener(Arc::clone(&engine), event_rx),
        ];

        Self { engine, subscriptions, tasks, boot: None }
    }

    #[must_use]
    pub fn engine(&self) -> &Arc<SyncEngine> {
        &self.engine
    }

    /// Run [`boot`] in the background. [`Self::shutdown`] waits for it.
    pub fn spawn_boot(&mut self, config: &AppConfig) {
        let engine = Arc::clone(&self.engine);
        let config = config.clone();
        self.boot = Some(tokio::spawn(async move { boot(&engine, &config).await }));
    }

    /// Let a pending boot finish its first sync, then unsubscribe from the
    /// bridge and wait for both listeners to stop.
    pub async fn shutdown(self) {
        if let Some(boot) = self.boot {
            if !boot.is_finished() {
                info!("waiting for startup to finish before stopping");
            }
            if let Err(e) = boot.await {
                warn!(error = %e, "boot task ended abnormally");
            }
        }
        for subscription in self.subscriptions {
            subscription.unsubscribe();
        }
        for task in self.tasks {
            if let Err(e) = task.await {
                warn!(error = %e, "listener task ended abnormally");
            }
        }
        info!("cart runtime stopped");
    }
}

/// Run the startup sequence on an engine returned by [`CartRuntime::connect`].
pub async fn boot(engine: &SyncEngine, config: &AppConfig) {
    let splash = match &config.splash {
        Some(splash) if engine.has_bridge() => Some(SplashSequencer::new(splash.min_dwell, splash.asset.clone())),
        _ => None,
    };
    let deadline = match &splash {
        Some(splash) => Some(splash.show(engine).await),
        None => None,
    };

    if engine.has_bridge() {
        match engine.refresh_device_status().await {
            Ok(status) => info!(badge = %status.badge(), "device status"),
            Err(e) => warn!(code = e.error_code(), error = %e, "device status unavailable"),
        }
    }

    if let (Some(splash), Some(deadline)) = (&splash, deadline) {
        splash.hold(deadline).await;
    }

    let outcome = engine.hydrate().await;
    debug!(?outcome, "first sync");
    engine.set_phase(Phase::Live).await;
}

fn spawn_status_listener(engine: Arc<SyncEngine>, mut rx: mpsc::Receiver<DeviceStatus>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(status) = rx.recv().await {
            engine.set_device_status(status).await;
        }
        debug!("status listener stopped");
    })
}

fn spawn_event_listener(engine: Arc<SyncEngine>, mut rx: mpsc::Receiver<HubEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let outcome = engine.handle_input_event(&event).await;
            debug!(?outcome, "hub event handled");
        }
        debug!("event listener stopped");
    })
}

#[cfg(test)]
#[path = "runtime_test.rs"]
mod tests;
