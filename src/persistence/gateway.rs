// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Snapshot load/save over a key/value store

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::capability::KeyValueStore;
use crate::domain::AllowList;
use crate::error::{Error, Result};
use crate::session::SessionSnapshot;

/// Key holding the capturing flag
pub const KEY_CAPTURING: &str = "isCapturing";
/// Key holding the allow-listed domains
pub const KEY_DOMAINS: &str = "domains";
/// Key holding the session map
pub const KEY_SESSIONS: &str = "sessions";

/// Full persisted state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub is_capturing: bool,
    pub domains: AllowList,
    pub sessions: SessionSnapshot,
}

/// Loads and saves [`Snapshot`]s
#[derive(Clone)]
pub struct PersistenceGateway {
    store: Arc<dyn KeyValueStore>,
}

impl PersistenceGateway {
    /// Create a gateway over a store
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load the persisted snapshot
    ///
    /// Missing keys take their defaults. Unreadable or corrupt state yields
    /// an empty default snapshot; this never fails.
    pub async fn load(&self) -> Snapshot {
        match self.try_load().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(error = %e, "Persisted state unusable, starting empty");
                Snapshot::default()
            }
        }
    }

    /// Load, surfacing the first error
    pub async fn try_load(&self) -> Result<Snapshot> {
        Ok(Snapshot {
            is_capturing: self.load_key(KEY_CAPTURING).await?.unwrap_or(false),
            domains: self.load_key(KEY_DOMAINS).await?.unwrap_or_default(),
            sessions: self.load_key(KEY_SESSIONS).await?.unwrap_or_default(),
        })
    }

    /// Replace the persisted snapshot
    pub async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let entries = vec![
            (KEY_CAPTURING.to_string(), Value::Bool(snapshot.is_capturing)),
            (KEY_DOMAINS.to_string(), serde_json::to_value(&snapshot.domains)?),
            (KEY_SESSIONS.to_string(), serde_json::to_value(&snapshot.sessions)?),
        ];
        self.store.store_many(entries).await
    }

    async fn load_key<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.store.load(key).await? {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| Error::persistence(format!("corrupt {:?}: {}", key, e))),
        }
    }
}
