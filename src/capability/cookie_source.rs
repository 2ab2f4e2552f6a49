// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Cookie source capability

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::CanonicalHost;
use crate::error::Result;

/// Name/value pair returned by a cookie source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieEntry {
    pub name: String,
    pub value: String,
}

impl CookieEntry {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Reads every stored cookie for a domain
///
/// Implementations should return promptly; the engine wraps each call in a
/// timeout and treats any error as a no-op for that host.
#[async_trait]
pub trait CookieSource: Send + Sync {
    /// All cookies visible for `host`
    async fn get_all(&self, host: &CanonicalHost) -> Result<Vec<CookieEntry>>;
}
