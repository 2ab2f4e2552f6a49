// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Static host → filter table

use std::collections::{BTreeMap, BTreeSet};

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::domain::CanonicalHost;
use crate::error::{Error, Result};

lazy_static! {
    /// Filters shipped with the engine
    pub static ref BUILTIN_POLICY: CapturePolicy = CapturePolicy::new()
        .with_host(
            "linkedin.com",
            HostFilter::new()
                .cookies(["li_at", "JSESSIONID", "bcookie"])
                .headers(["csrf-token", "user-agent"]),
        )
        .with_host(
            "x.com",
            HostFilter::new()
                .cookies(["auth_token", "ct0", "twid", "guest_id"])
                .headers([
                    "x-csrf-token",
                    "x-twitter-client-language",
                    "authorization",
                    "user-agent",
                ]),
        );
}

/// Kind of captured field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Stored cookie
    Cookie,
    /// Outgoing request header
    Header,
}

/// Allowed field names for one host
///
/// Names are case-folded on the way in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostFilter {
    #[serde(default)]
    cookies: BTreeSet<String>,
    #[serde(default)]
    headers: BTreeSet<String>,
}

impl HostFilter {
    /// Create a filter that allows nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow cookie names
    pub fn cookies<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.cookies
            .extend(names.into_iter().map(|n| n.as_ref().to_lowercase()));
        self
    }

    /// Allow header names
    pub fn headers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.headers
            .extend(names.into_iter().map(|n| n.as_ref().to_lowercase()));
        self
    }

    /// Check if a field name is allowed for the given kind
    pub fn allows(&self, name: &str, kind: FieldKind) -> bool {
        let name = name.to_lowercase();
        match kind {
            FieldKind::Cookie => self.cookies.contains(&name),
            FieldKind::Header => self.headers.contains(&name),
        }
    }

    fn folded(self) -> Self {
        HostFilter::new().cookies(self.cookies).headers(self.headers)
    }
}

/// Outcome of a policy lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostRule<'a> {
    /// Host is configured; only listed names are captured
    Filtered(&'a HostFilter),
    /// Host is not configured; every name is captured
    CaptureAll,
}

/// Host → filter table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapturePolicy {
    filters: BTreeMap<CanonicalHost, HostFilter>,
}

impl CapturePolicy {
    /// Create an empty table (every host falls back to capture-all)
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in table
    pub fn builtin() -> Self {
        BUILTIN_POLICY.clone()
    }

    /// Add or replace the filter for a host
    ///
    /// A host that does not normalize is skipped with a warning.
    pub fn with_host(mut self, host: &str, filter: HostFilter) -> Self {
        match CanonicalHost::parse(host) {
            Ok(host) => {
                self.filters.insert(host, filter);
            }
            Err(e) => tracing::warn!(host, error = %e, "Skipping policy entry"),
        }
        self
    }

    /// Add or replace the filter for an already normalized host
    pub fn insert(&mut self, host: CanonicalHost, filter: HostFilter) {
        self.filters.insert(host, filter);
    }

    /// Overlay another table; its entries win
    pub fn extend(&mut self, other: CapturePolicy) {
        self.filters.extend(other.filters);
    }

    /// Look up the rule for a host
    pub fn rule_for(&self, host: &CanonicalHost) -> HostRule<'_> {
        match self.filters.get(host) {
            Some(filter) => HostRule::Filtered(filter),
            None => HostRule::CaptureAll,
        }
    }

    /// Decide whether a single field is captured
    pub fn should_capture(&self, host: &CanonicalHost, name: &str, kind: FieldKind) -> bool {
        match self.rule_for(host) {
            HostRule::Filtered(filter) => filter.allows(name, kind),
            HostRule::CaptureAll => true,
        }
    }

    /// Hosts with an explicit filter
    pub fn configured_hosts(&self) -> impl Iterator<Item = &CanonicalHost> {
        self.filters.keys()
    }

    /// Parse a table from JSON: `{"host": {"cookies": [..], "headers": [..]}}`
    ///
    /// Host keys are normalized and field names case-folded.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, HostFilter> = serde_json::from_str(json)?;
        let mut policy = CapturePolicy::new();
        for (host, filter) in raw {
            let host = CanonicalHost::parse(&host)
                .map_err(|_| Error::Config(format!("invalid policy host {:?}", host)))?;
            policy.insert(host, filter.folded());
        }
        Ok(policy)
    }

    /// Export the table as JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
