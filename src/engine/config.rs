// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Engine configuration

use std::time::Duration;

use crate::error::{Error, Result};
use crate::policy::CapturePolicy;

/// Default cookie poll period
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default bound on a single cookie fetch
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Capture engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Period of the cookie poll
    pub poll_interval: Duration,
    /// Upper bound for one cookie source call
    pub fetch_timeout: Duration,
    /// Engine command queue capacity
    pub channel_capacity: usize,
    /// Field filter table
    pub policy: CapturePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            channel_capacity: 256,
            policy: CapturePolicy::builtin(),
        }
    }
}

impl EngineConfig {
    /// Create a new engine config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set poll interval
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set cookie fetch timeout
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Set command queue capacity
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Replace the capture policy
    pub fn policy(mut self, policy: CapturePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Short timings for tests
    pub fn for_testing() -> Self {
        Self {
            poll_interval: Duration::from_millis(50),
            fetch_timeout: Duration::from_millis(200),
            channel_capacity: 64,
            ..Default::default()
        }
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(Error::Config("poll interval must be non-zero".to_string()));
        }
        if self.fetch_timeout.is_zero() {
            return Err(Error::Config("fetch timeout must be non-zero".to_string()));
        }
        if self.channel_capacity == 0 {
            return Err(Error::Config("channel capacity must be non-zero".to_string()));
        }
        Ok(())
    }
}
