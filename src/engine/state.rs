// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Engine-owned mutable state

use std::sync::Arc;

use super::SkipReason;
use crate::capability::Clock;
use crate::control::StatusReport;
use crate::domain::{AllowList, CanonicalHost};
use crate::persistence::Snapshot;
use crate::session::SessionStore;

/// Capturing flag, allow-list and session store
#[derive(Debug)]
pub struct CaptureState {
    pub(crate) capturing: bool,
    pub(crate) allow_list: AllowList,
    pub(crate) sessions: SessionStore,
}

impl CaptureState {
    /// Empty, idle state
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::restore(Snapshot::default(), clock)
    }

    /// Rebuild state from a persisted snapshot
    pub fn restore(snapshot: Snapshot, clock: Arc<dyn Clock>) -> Self {
        Self {
            capturing: snapshot.is_capturing,
            allow_list: snapshot.domains,
            sessions: SessionStore::restore(snapshot.sessions, clock),
        }
    }

    /// Persistable copy of the whole state
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            is_capturing: self.capturing,
            domains: self.allow_list.clone(),
            sessions: self.sessions.snapshot(),
        }
    }

    /// Whether the engine is capturing
    pub fn is_capturing(&self) -> bool {
        self.capturing
    }

    /// Allow-listed hosts
    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }

    /// Captured sessions
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Gate applied to every capture attempt
    pub fn check(&self, host: &CanonicalHost) -> Result<(), SkipReason> {
        if !self.capturing {
            return Err(SkipReason::NotCapturing);
        }
        if !self.allow_list.contains(host) {
            return Err(SkipReason::NotAllowListed(host.clone()));
        }
        Ok(())
    }

    /// Hosts to poll this tick; empty while idle
    pub fn poll_targets(&self) -> Vec<CanonicalHost> {
        if !self.capturing {
            return Vec::new();
        }
        self.allow_list.iter().cloned().collect()
    }

    /// Status as reported by `getState`
    pub fn status(&self) -> StatusReport {
        StatusReport {
            is_capturing: self.capturing,
            domains: self.allow_list.to_strings(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::SystemClock;
    use crate::domain::normalize;

    #[test]
    fn test_check_gates() {
        let mut state = CaptureState::new(Arc::new(SystemClock));
        let x = normalize("x.com").unwrap();

        assert_eq!(state.check(&x), Err(SkipReason::NotCapturing));
        state.capturing = true;
        assert_eq!(state.check(&x), Err(SkipReason::NotAllowListed(x.clone())));
        state.allow_list.insert(x.clone());
        assert_eq!(state.check(&x), Ok(()));
    }

    #[test]
    fn test_poll_targets_empty_while_idle() {
        let mut state = CaptureState::new(Arc::new(SystemClock));
        state.allow_list.insert(normalize("x.com").unwrap());
        assert!(state.poll_targets().is_empty());

        state.capturing = true;
        assert_eq!(state.poll_targets().len(), 1);
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let mut state = CaptureState::new(Arc::new(SystemClock));
        let x = normalize("x.com").unwrap();
        state.capturing = true;
        state.allow_list.insert(x.clone());
        state.sessions.merge_cookie(&x, "ct0", "abc");

        let restored = CaptureState::restore(state.snapshot(), Arc::new(SystemClock));
        assert_eq!(restored.snapshot(), state.snapshot());
    }
}
