// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Engine builder and startup

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use super::actor::EngineActor;
use super::{CaptureState, EngineConfig, EngineHandle};
use crate::capability::{Clock, CookieSource, KeyValueStore, MemoryStore, SystemClock};
use crate::cookies::CookieJar;
use crate::error::Result;
use crate::metrics::CaptureMetrics;
use crate::persistence::{PersistenceGateway, SaveQueue};

/// Capture engine builder
///
/// Defaults to an empty in-process cookie jar, an in-memory store and the
/// system clock.
pub struct CaptureEngine {
    config: EngineConfig,
    cookies: Arc<dyn CookieSource>,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl CaptureEngine {
    /// Create a builder
    pub fn builder(config: EngineConfig) -> Self {
        Self {
            config,
            cookies: Arc::new(CookieJar::new()),
            store: Arc::new(MemoryStore::new()),
            clock: Arc::new(SystemClock),
        }
    }

    /// Set the cookie source
    pub fn cookie_source(mut self, cookies: Arc<dyn CookieSource>) -> Self {
        self.cookies = cookies;
        self
    }

    /// Set the durable store
    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = store;
        self
    }

    /// Set the clock used for record timestamps
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Load persisted state and start the engine task
    pub async fn spawn(self) -> Result<EngineHandle> {
        self.config.validate()?;

        let metrics = Arc::new(CaptureMetrics::new());
        let gateway = PersistenceGateway::new(self.store);
        let snapshot = gateway.load().await;
        info!(
            capturing = snapshot.is_capturing,
            domains = snapshot.domains.len(),
            sessions = snapshot.sessions.len(),
            "Capture state loaded"
        );

        let state = CaptureState::restore(snapshot, self.clock);
        let saves = SaveQueue::spawn(gateway, metrics.clone());
        let (tx, rx) = mpsc::channel(self.config.channel_capacity);

        let actor = EngineActor::new(state, self.config.policy.clone(), saves, metrics.clone());
        tokio::spawn(actor.run(rx));

        Ok(EngineHandle::new(tx, self.cookies, &self.config, metrics))
    }

    /// Start an engine with defaults
    pub async fn launch() -> Result<EngineHandle> {
        Self::builder(EngineConfig::default()).spawn().await
    }
}
