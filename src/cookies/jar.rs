// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Cookie jar implementation

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use url::Url;

use crate::capability::{CookieEntry, CookieSource};
use crate::domain::CanonicalHost;
use crate::error::Result;

/// A stored cookie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    /// Owning domain, lower-case, no leading dot
    pub domain: String,
    pub path: String,
    /// Expiration time (None = session cookie)
    pub expires: Option<DateTime<Utc>>,
}

impl Cookie {
    /// Create a session cookie on path `/`
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: String::new(),
            path: "/".to_string(),
            expires: None,
        }
    }

    /// Set the domain
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into().trim_start_matches('.').to_lowercase();
        self
    }

    /// Set expiration time
    pub fn expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    /// Check if the cookie is expired
    pub fn is_expired(&self) -> bool {
        self.expires.map_or(false, |exp| exp < Utc::now())
    }

    /// Cookie domain equals `host` or is one of its subdomains
    ///
    /// Matches what a browser returns when asked for all cookies of a domain.
    pub fn within_domain(&self, host: &str) -> bool {
        let domain = self.domain.as_str();
        let host = strip_port(host);
        domain == host
            || domain
                .strip_suffix(host)
                .map_or(false, |prefix| prefix.ends_with('.'))
    }

    /// Parse a Set-Cookie header received from `url`
    ///
    /// Only the attributes that decide where and how long the cookie lives
    /// are kept.
    pub fn parse(header: &str, url: &Url) -> Option<Self> {
        let mut parts = header.split(';');
        let (name, value) = parts.next()?.trim().split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let mut cookie = Cookie::new(name, value.trim()).domain(url.host_str().unwrap_or(""));

        for part in parts {
            let Some((attr, val)) = part.trim().split_once('=') else {
                continue;
            };
            let val = val.trim();
            match attr.trim().to_lowercase().as_str() {
                "domain" => cookie = cookie.domain(val),
                "path" => cookie.path = val.to_string(),
                "expires" => {
                    if let Ok(dt) = DateTime::parse_from_rfc2822(val) {
                        cookie = cookie.expires(dt.with_timezone(&Utc));
                    }
                }
                "max-age" => {
                    if let Ok(secs) = val.parse::<i64>() {
                        cookie = cookie.expires(Utc::now() + chrono::Duration::seconds(secs));
                    }
                }
                _ => {}
            }
        }

        Some(cookie)
    }
}

fn strip_port(host: &str) -> &str {
    match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host,
    }
}

/// Thread-safe cookie storage
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    /// Cookies stored by domain
    cookies: Arc<DashMap<String, Vec<Cookie>>>,
}

impl CookieJar {
    /// Create a new empty cookie jar
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cookie, replacing one with the same name and path
    pub fn add(&self, cookie: Cookie) {
        let mut entry = self.cookies.entry(cookie.domain.clone()).or_default();
        entry.retain(|c| c.name != cookie.name || c.path != cookie.path);
        entry.push(cookie);
    }

    /// Add a cookie from a Set-Cookie header; false if it did not parse
    pub fn add_from_header(&self, header: &str, url: &Url) -> bool {
        match Cookie::parse(header, url) {
            Some(cookie) => {
                self.add(cookie);
                true
            }
            None => false,
        }
    }

    /// Live cookies for a domain and its subdomains
    pub fn cookies_for_domain(&self, host: &str) -> Vec<Cookie> {
        self.remove_expired();
        self.cookies
            .iter()
            .flat_map(|entry| entry.value().clone())
            .filter(|c| c.within_domain(host))
            .collect()
    }

    fn remove_expired(&self) {
        for mut entry in self.cookies.iter_mut() {
            entry.value_mut().retain(|c| !c.is_expired());
        }
    }

    /// Get total cookie count
    pub fn len(&self) -> usize {
        self.cookies.iter().map(|e| e.value().len()).sum()
    }

    /// Check if jar is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CookieSource for CookieJar {
    async fn get_all(&self, host: &CanonicalHost) -> Result<Vec<CookieEntry>> {
        Ok(self
            .cookies_for_domain(host.as_str())
            .into_iter()
            .map(|c| CookieEntry::new(c.name, c.value))
            .collect())
    }
}
