// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Allow-list of hosts eligible for capture

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::CanonicalHost;

/// Set of canonical hosts for which capture is permitted
///
/// Ordered so that status and persisted output are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllowList {
    hosts: BTreeSet<CanonicalHost>,
}

impl AllowList {
    /// Create an empty allow-list
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a host, returns false if it was already present
    pub fn insert(&mut self, host: CanonicalHost) -> bool {
        self.hosts.insert(host)
    }

    /// Remove a host, returns false if it was absent
    pub fn remove(&mut self, host: &CanonicalHost) -> bool {
        self.hosts.remove(host)
    }

    /// Check membership
    pub fn contains(&self, host: &CanonicalHost) -> bool {
        self.hosts.contains(host)
    }

    /// Iterate hosts in order
    pub fn iter(&self) -> impl Iterator<Item = &CanonicalHost> {
        self.hosts.iter()
    }

    /// Hosts as plain strings, for status responses
    pub fn to_strings(&self) -> Vec<String> {
        self.hosts.iter().map(|h| h.to_string()).collect()
    }

    /// Number of hosts
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

impl FromIterator<CanonicalHost> for AllowList {
    fn from_iter<I: IntoIterator<Item = CanonicalHost>>(iter: I) -> Self {
        Self {
            hosts: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::normalize;

    #[test]
    fn test_insert_is_idempotent() {
        let mut list = AllowList::new();
        assert!(list.insert(normalize("X.com").unwrap()));
        assert!(!list.insert(normalize("https://www.x.com/home").unwrap()));
        assert_eq!(list.to_strings(), vec!["x.com".to_string()]);
    }

    #[test]
    fn test_deserialize_merges_equivalent_hosts() {
        let list: AllowList =
            serde_json::from_str(r#"["www.x.com", "X.COM", "linkedin.com"]"#).unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.contains(&normalize("x.com").unwrap()));
    }
}
