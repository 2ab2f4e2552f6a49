// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Per-host session record

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::policy::FieldKind;

/// Accumulated captured fields for one host
///
/// Serialized as `{cookies, headers, timestamp, host}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Cookie name (case-folded) → value
    #[serde(default)]
    cookies: BTreeMap<String, String>,
    /// Header name (case-folded) → value
    #[serde(default)]
    headers: BTreeMap<String, String>,
    /// First capture time, never rewritten
    #[serde(rename = "timestamp")]
    created_at: DateTime<Utc>,
    /// Raw host string last observed
    #[serde(rename = "host")]
    source_host: String,
}

impl SessionRecord {
    pub(crate) fn new(source_host: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            cookies: BTreeMap::new(),
            headers: BTreeMap::new(),
            created_at,
            source_host: source_host.into(),
        }
    }

    /// Upsert one field, returns true if the stored value changed
    pub(crate) fn merge(&mut self, kind: FieldKind, name: &str, value: &str) -> bool {
        let fields = match kind {
            FieldKind::Cookie => &mut self.cookies,
            FieldKind::Header => &mut self.headers,
        };

        let name = name.to_lowercase();
        if fields.get(&name).map(String::as_str) == Some(value) {
            return false;
        }
        fields.insert(name, value.to_string());
        true
    }

    pub(crate) fn set_source_host(&mut self, raw: &str) -> bool {
        if self.source_host == raw {
            return false;
        }
        self.source_host = raw.to_string();
        true
    }

    /// Captured cookies
    pub fn cookies(&self) -> &BTreeMap<String, String> {
        &self.cookies
    }

    /// Captured headers
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Cookie value by name (any case)
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(&name.to_lowercase()).map(String::as_str)
    }

    /// Header value by name (any case)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    /// When the record was first created
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Raw host string last observed
    pub fn source_host(&self) -> &str {
        &self.source_host
    }

    /// Number of captured fields
    pub fn field_count(&self) -> usize {
        self.cookies.len() + self.headers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_case_folds_names() {
        let mut record = SessionRecord::new("x.com", Utc::now());
        assert!(record.merge(FieldKind::Header, "Authorization", "Bearer z"));
        assert_eq!(record.header("authorization"), Some("Bearer z"));
        assert_eq!(record.header("AUTHORIZATION"), Some("Bearer z"));
        assert!(record.headers().contains_key("authorization"));
    }

    #[test]
    fn test_merge_reports_changes() {
        let mut record = SessionRecord::new("x.com", Utc::now());
        assert!(record.merge(FieldKind::Cookie, "ct0", "a"));
        assert!(!record.merge(FieldKind::Cookie, "CT0", "a"));
        assert!(record.merge(FieldKind::Cookie, "ct0", "b"));
        assert_eq!(record.cookies().len(), 1);
    }

    #[test]
    fn test_serialized_shape() {
        let mut record = SessionRecord::new("www.x.com", Utc::now());
        record.merge(FieldKind::Cookie, "ct0", "abc");
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["cookies"]["ct0"], "abc");
        assert_eq!(value["host"], "www.x.com");
        assert!(value["timestamp"].is_string());
        assert!(value["headers"].as_object().unwrap().is_empty());
    }
}
