// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Host → record store

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::SessionRecord;
use crate::capability::{Clock, SystemClock};
use crate::domain::CanonicalHost;
use crate::policy::FieldKind;

/// Mapping from canonical host to its session record
///
/// Owned by the engine actor; callers only ever see a [`SessionSnapshot`].
pub struct SessionStore {
    records: BTreeMap<CanonicalHost, SessionRecord>,
    clock: Arc<dyn Clock>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("records", &self.records)
            .finish()
    }
}

impl SessionStore {
    /// Create an empty store using the system clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty store with an injected clock
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: BTreeMap::new(),
            clock,
        }
    }

    /// Restore records from a snapshot
    pub fn restore(snapshot: SessionSnapshot, clock: Arc<dyn Clock>) -> Self {
        Self {
            records: snapshot.0,
            clock,
        }
    }

    /// Existing record for `host`, or a fresh empty one stamped now
    pub fn ensure(&mut self, host: &CanonicalHost) -> &SessionRecord {
        self.ensure_mut(host)
    }

    fn ensure_mut(&mut self, host: &CanonicalHost) -> &mut SessionRecord {
        let clock = &self.clock;
        self.records
            .entry(host.clone())
            .or_insert_with(|| SessionRecord::new(host.as_str(), clock.now()))
    }

    /// Upsert a cookie; returns true if state changed
    pub fn merge_cookie(&mut self, host: &CanonicalHost, name: &str, value: &str) -> bool {
        self.ensure_mut(host).merge(FieldKind::Cookie, name, value)
    }

    /// Upsert a header; returns true if state changed
    pub fn merge_header(&mut self, host: &CanonicalHost, name: &str, value: &str) -> bool {
        self.ensure_mut(host).merge(FieldKind::Header, name, value)
    }

    /// Upsert a field of either kind
    pub fn merge(&mut self, host: &CanonicalHost, kind: FieldKind, name: &str, value: &str) -> bool {
        self.ensure_mut(host).merge(kind, name, value)
    }

    /// Record the raw host string last seen for `host`
    pub fn note_source(&mut self, host: &CanonicalHost, raw: &str) -> bool {
        self.ensure_mut(host).set_source_host(raw)
    }

    /// Delete the record for `host`; no-op if absent
    pub fn remove(&mut self, host: &CanonicalHost) -> bool {
        self.records.remove(host).is_some()
    }

    /// Delete every record
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Look up a record
    pub fn get(&self, host: &CanonicalHost) -> Option<&SessionRecord> {
        self.records.get(host)
    }

    /// Check if a record exists
    pub fn contains(&self, host: &CanonicalHost) -> bool {
        self.records.contains_key(host)
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Detached copy of every record
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot(self.records.clone())
    }
}

/// Read-only copy of the store, as exported
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionSnapshot(BTreeMap<CanonicalHost, SessionRecord>);

impl SessionSnapshot {
    /// Record for a host
    pub fn get(&self, host: &CanonicalHost) -> Option<&SessionRecord> {
        self.0.get(host)
    }

    /// Record for a raw domain, normalized first
    pub fn get_raw(&self, raw: &str) -> Option<&SessionRecord> {
        CanonicalHost::parse(raw).ok().and_then(|h| self.0.get(&h))
    }

    /// Iterate records in host order
    pub fn iter(&self) -> impl Iterator<Item = (&CanonicalHost, &SessionRecord)> {
        self.0.iter()
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::FixedClock;
    use crate::domain::normalize;
    use chrono::{Duration, Utc};

    fn host(raw: &str) -> CanonicalHost {
        normalize(raw).unwrap()
    }

    #[test]
    fn test_ensure_creates_once() {
        let clock = Arc::new(FixedClock::new(Utc::now()));
        let mut store = SessionStore::with_clock(clock.clone());
        let x = host("x.com");

        let created = store.ensure(&x).created_at();
        clock.advance(Duration::minutes(10));
        store.merge_header(&x, "accept", "*/*");

        assert_eq!(store.ensure(&x).created_at(), created);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut store = SessionStore::new();
        let x = host("x.com");

        store.merge_cookie(&x, "ct0", "abc");
        let once = store.snapshot();
        assert!(!store.merge_cookie(&x, "ct0", "abc"));
        assert_eq!(store.snapshot(), once);
    }

    #[test]
    fn test_merge_overwrites_without_duplicates() {
        let mut store = SessionStore::new();
        let x = host("x.com");

        store.merge_header(&x, "Authorization", "Bearer a");
        store.merge_header(&x, "authorization", "Bearer b");
        store.merge_cookie(&x, "ct0", "c");

        let record = store.get(&x).unwrap();
        assert_eq!(record.headers().len(), 1);
        assert_eq!(record.header("authorization"), Some("Bearer b"));
        assert_eq!(record.cookie("ct0"), Some("c"));
    }

    #[test]
    fn test_merge_never_replaces_wholesale() {
        let mut store = SessionStore::new();
        let x = host("x.com");

        store.merge_cookie(&x, "a", "1");
        store.merge_cookie(&x, "b", "2");
        store.merge_cookie(&x, "a", "3");

        let record = store.get(&x).unwrap();
        assert_eq!(record.cookie("a"), Some("3"));
        assert_eq!(record.cookie("b"), Some("2"));
    }

    #[test]
    fn test_remove_and_clear() {
        let mut store = SessionStore::new();
        store.merge_cookie(&host("a.com"), "sid", "1");
        store.merge_cookie(&host("b.com"), "sid", "2");

        assert!(store.remove(&host("a.com")));
        assert!(!store.remove(&host("a.com")));
        assert_eq!(store.len(), 1);

        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut store = SessionStore::new();
        let x = host("x.com");
        store.merge_cookie(&x, "ct0", "old");

        let snapshot = store.snapshot();
        store.merge_cookie(&x, "ct0", "new");
        store.clear();

        assert_eq!(snapshot.get(&x).unwrap().cookie("ct0"), Some("old"));
        assert_eq!(snapshot.get_raw("WWW.X.com").unwrap().cookie("ct0"), Some("old"));
    }

    #[test]
    fn test_note_source() {
        let mut store = SessionStore::new();
        let x = host("x.com");

        assert_eq!(store.ensure(&x).source_host(), "x.com");
        assert!(store.note_source(&x, "www.x.com"));
        assert!(!store.note_source(&x, "www.x.com"));
        assert_eq!(store.get(&x).unwrap().source_host(), "www.x.com");
    }

    #[test]
    fn test_snapshot_serializes_by_host() {
        let mut store = SessionStore::new();
        store.merge_cookie(&host("x.com"), "ct0", "abc");
        let value = serde_json::to_value(store.snapshot()).unwrap();

        assert_eq!(value["x.com"]["cookies"]["ct0"], "abc");
        let back: SessionSnapshot = serde_json::from_value(value).unwrap();
        assert_eq!(back, store.snapshot());
    }
}
