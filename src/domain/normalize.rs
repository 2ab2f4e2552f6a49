// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Domain normalization
//!
//! The only place a [`CanonicalHost`] is ever constructed. Control input,
//! request URLs, cookie queries and persisted state all pass through here
//! before they are used as a store key.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// Prefixes removed from the front of a raw domain
const STRIPPED_PREFIXES: &[&str] = &["https://", "http://", "www."];

/// Normalized host key
///
/// Lower-case, without scheme, without a leading `www.`, cut at the authority.
/// Deserializing re-runs [`normalize`] so persisted keys obey the same rules.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CanonicalHost(String);

impl CanonicalHost {
    /// Normalize a raw domain (see [`normalize`])
    pub fn parse(raw: &str) -> Result<Self> {
        normalize(raw)
    }

    /// Normalize the authority of a full URL
    ///
    /// A non-default port stays part of the key, matching [`normalize`] on
    /// the same string. Input without a `://` separator is treated as a bare
    /// domain.
    pub fn from_url(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if !trimmed.contains("://") {
            return normalize(trimmed);
        }

        match Url::parse(trimmed) {
            Ok(url) => match url.host_str() {
                Some(host) => match url.port() {
                    Some(port) => normalize(&format!("{}:{}", host, port)),
                    None => normalize(host),
                },
                None => Err(Error::invalid_domain(raw)),
            },
            Err(_) => normalize(trimmed),
        }
    }

    /// Get the host as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File-system safe form of the host (`.` and `:` become `_`)
    pub fn file_stem(&self) -> String {
        self.0.replace(['.', ':'], "_")
    }
}

impl fmt::Display for CanonicalHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalHost {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CanonicalHost {
    type Error = Error;

    fn try_from(raw: String) -> Result<Self> {
        normalize(&raw)
    }
}

impl From<CanonicalHost> for String {
    fn from(host: CanonicalHost) -> Self {
        host.0
    }
}

/// Map a raw domain or URL-ish string to its canonical host
///
/// Trims, lower-cases, strips `http://`, `https://` and `www.` from the front
/// (repeatedly, so the result is a fixed point) and cuts at the first `/`,
/// `?` or `#`. Fails with [`Error::InvalidDomain`] if nothing is left.
pub fn normalize(raw: &str) -> Result<CanonicalHost> {
    let mut host = raw.trim().to_lowercase();

    while let Some(rest) = STRIPPED_PREFIXES
        .iter()
        .find_map(|prefix| host.strip_prefix(*prefix))
    {
        host = rest.trim_start().to_string();
    }

    if let Some(end) = host.find(|c| matches!(c, '/' | '?' | '#')) {
        host.truncate(end);
    }

    let host = host.trim_end();
    if host.is_empty() {
        return Err(Error::invalid_domain(raw));
    }

    Ok(CanonicalHost(host.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_basic() {
        assert_eq!(normalize("example.com").unwrap().as_str(), "example.com");
        assert_eq!(
            normalize("HTTPS://WWW.Example.com/path").unwrap(),
            normalize("example.com").unwrap()
        );
        assert_eq!(normalize("  http://x.com/a?b=c ").unwrap().as_str(), "x.com");
    }

    #[test]
    fn test_normalize_keeps_port() {
        assert_eq!(normalize("localhost:8001").unwrap().as_str(), "localhost:8001");
    }

    #[test]
    fn test_normalize_drops_query_and_fragment() {
        assert_eq!(normalize("x.com?session=1").unwrap().as_str(), "x.com");
        assert_eq!(normalize("x.com#top").unwrap().as_str(), "x.com");
    }

    #[test]
    fn test_normalize_idempotent() {
        let inputs = [
            "HTTPS://WWW.Example.com/path",
            "www.www.example.com",
            "http://https://x.com",
            "https:// www.linkedin.com/feed",
            "LOCALHOST:8001",
            "api.x.com",
        ];

        for raw in inputs {
            let once = normalize(raw).unwrap();
            let twice = normalize(once.as_str()).unwrap();
            assert_eq!(once, twice, "not a fixed point for {:?}", raw);
        }
    }

    #[test]
    fn test_normalize_rejects_empty() {
        for raw in ["", "   ", "https://", "www.", "/path/only", "https://www./x"] {
            assert!(
                matches!(normalize(raw), Err(Error::InvalidDomain(_))),
                "expected InvalidDomain for {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_from_url() {
        let host = CanonicalHost::from_url("https://www.X.com:443/i/api?q=1").unwrap();
        assert_eq!(host.as_str(), "x.com");

        let bare = CanonicalHost::from_url("x.com").unwrap();
        assert_eq!(bare, host);
    }

    #[test]
    fn test_from_url_keeps_port() {
        for raw in ["http://localhost:8001/page", "https://WWW.localhost:8001/?a=1"] {
            assert_eq!(
                CanonicalHost::from_url(raw).unwrap(),
                normalize("localhost:8001").unwrap(),
                "port lost for {:?}",
                raw
            );
        }
        assert_eq!(
            CanonicalHost::from_url("http://localhost:8001/page").unwrap(),
            normalize("http://localhost:8001/page").unwrap()
        );
    }

    #[test]
    fn test_from_url_without_host() {
        assert!(CanonicalHost::from_url("file:///etc/hosts").is_err());
    }

    #[test]
    fn test_deserialize_renormalizes() {
        let host: CanonicalHost = serde_json::from_str("\"WWW.Example.COM\"").unwrap();
        assert_eq!(host.as_str(), "example.com");

        let bad: std::result::Result<CanonicalHost, _> = serde_json::from_str("\"  \"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_file_stem() {
        let host = normalize("localhost:8001").unwrap();
        assert_eq!(host.file_stem(), "localhost_8001");
        assert_eq!(normalize("api.x.com").unwrap().file_stem(), "api_x_com");
    }
}
