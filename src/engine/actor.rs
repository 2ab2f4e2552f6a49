// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Engine actor
//!
//! Owns [`CaptureState`] and applies commands one at a time. Cookie fetches
//! never run here; the handle fetches first and hands the result back, so
//! the flag and allow-list are re-checked at merge time.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace};
use url::Url;

use super::CaptureState;
use crate::capability::{CookieEntry, ObservedRequest};
use crate::control::{self, ControlPayload, ControlRequest};
use crate::domain::CanonicalHost;
use crate::error::Result;
use crate::metrics::CaptureMetrics;
use crate::persistence::SaveQueue;
use crate::policy::{CapturePolicy, FieldKind};

/// Why an event did not reach the session store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Capture is stopped
    NotCapturing,
    /// Host is not on the allow-list
    NotAllowListed(CanonicalHost),
    /// Event host could not be normalized
    InvalidHost(String),
}

/// Result of one capture attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// Event was accepted and merged
    Captured {
        host: CanonicalHost,
        kind: FieldKind,
        /// Fields that changed the record
        merged: usize,
        /// Fields dropped by the capture policy
        filtered: usize,
        /// Whether the record was created by this event
        created: bool,
    },
    /// Event was dropped before touching the store
    Skipped(SkipReason),
}

impl CaptureOutcome {
    /// Check if the event was accepted
    pub fn is_captured(&self) -> bool {
        matches!(self, CaptureOutcome::Captured { .. })
    }

    /// Host the event was merged into
    pub fn host(&self) -> Option<&CanonicalHost> {
        match self {
            CaptureOutcome::Captured { host, .. } => Some(host),
            CaptureOutcome::Skipped(_) => None,
        }
    }
}

pub(crate) enum Command {
    Request {
        request: ObservedRequest,
        reply: oneshot::Sender<CaptureOutcome>,
    },
    Accepts {
        host: CanonicalHost,
        reply: oneshot::Sender<std::result::Result<(), SkipReason>>,
    },
    Cookies {
        host: CanonicalHost,
        source: String,
        cookies: Vec<CookieEntry>,
        reply: oneshot::Sender<CaptureOutcome>,
    },
    PollTargets {
        reply: oneshot::Sender<Vec<CanonicalHost>>,
    },
    Control {
        request: ControlRequest,
        reply: oneshot::Sender<Result<ControlPayload>>,
    },
    Flush {
        reply: oneshot::Sender<()>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

pub(crate) struct EngineActor {
    state: CaptureState,
    policy: CapturePolicy,
    saves: SaveQueue,
    metrics: Arc<CaptureMetrics>,
}

impl EngineActor {
    pub(crate) fn new(
        state: CaptureState,
        policy: CapturePolicy,
        saves: SaveQueue,
        metrics: Arc<CaptureMetrics>,
    ) -> Self {
        Self {
            state,
            policy,
            saves,
            metrics,
        }
    }

    /// Process commands until shutdown or until every handle is dropped
    pub(crate) async fn run(mut self, mut rx: mpsc::Receiver<Command>) {
        let mut shutdown = None;

        while let Some(command) = rx.recv().await {
            match command {
                Command::Shutdown { reply } => {
                    rx.close();
                    shutdown = Some(reply);
                    break;
                }
                command => self.handle(command),
            }
        }

        self.saves.close().await;
        debug!("Capture engine stopped");

        if let Some(reply) = shutdown {
            let _ = reply.send(());
        }
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Request { request, reply } => {
                let outcome = self.capture_request(request);
                let _ = reply.send(outcome);
            }
            Command::Accepts { host, reply } => {
                let _ = reply.send(self.state.check(&host));
            }
            Command::Cookies {
                host,
                source,
                cookies,
                reply,
            } => {
                let outcome = self.capture_cookies(host, &source, cookies);
                let _ = reply.send(outcome);
            }
            Command::PollTargets { reply } => {
                let _ = reply.send(self.state.poll_targets());
            }
            Command::Control { request, reply } => {
                let result = self.control(request);
                let _ = reply.send(result);
            }
            Command::Flush { reply } => self.saves.notify_flushed(reply),
            // Handled by `run`
            Command::Shutdown { reply } => {
                let _ = reply.send(());
            }
        }
    }

    fn capture_request(&mut self, request: ObservedRequest) -> CaptureOutcome {
        self.metrics.record_request_observed();

        let host = match CanonicalHost::from_url(&request.url) {
            Ok(host) => host,
            Err(e) => {
                debug!(url = %request.url, error = %e, "Ignoring request without usable host");
                self.metrics.record_rejected();
                return CaptureOutcome::Skipped(SkipReason::InvalidHost(request.url));
            }
        };

        if let Err(reason) = self.state.check(&host) {
            trace!(host = %host, ?reason, "Request not captured");
            self.metrics.record_rejected();
            return CaptureOutcome::Skipped(reason);
        }

        let source = raw_host(&request.url);
        let fields = request
            .headers
            .iter()
            .map(|h| (h.name.as_str(), h.value.as_str()));
        self.merge(&host, &source, FieldKind::Header, fields)
    }

    fn capture_cookies(
        &mut self,
        host: CanonicalHost,
        source: &str,
        cookies: Vec<CookieEntry>,
    ) -> CaptureOutcome {
        // Capture may have stopped, or the host been removed, while fetching
        if let Err(reason) = self.state.check(&host) {
            debug!(host = %host, ?reason, "Discarding fetched cookies");
            self.metrics.record_rejected();
            return CaptureOutcome::Skipped(reason);
        }

        let fields = cookies.iter().map(|c| (c.name.as_str(), c.value.as_str()));
        self.merge(&host, source, FieldKind::Cookie, fields)
    }

    fn merge<'a>(
        &mut self,
        host: &CanonicalHost,
        source: &str,
        kind: FieldKind,
        fields: impl Iterator<Item = (&'a str, &'a str)>,
    ) -> CaptureOutcome {
        let policy = &self.policy;
        let (accepted, filtered): (Vec<_>, Vec<_>) =
            fields.partition(|(name, _)| policy.should_capture(host, name, kind));

        let created = !self.state.sessions.contains(host);
        let mut changed = self.state.sessions.note_source(host, source) || created;

        let mut merged = 0;
        for (name, value) in accepted {
            if self.state.sessions.merge(host, kind, name, value) {
                merged += 1;
            }
        }
        changed |= merged > 0;

        for (name, _) in &filtered {
            trace!(host = %host, field = %name, ?kind, "Field filtered by policy");
        }
        self.metrics.record_fields(merged, filtered.len());

        if changed {
            let version = self.saves.enqueue(self.state.snapshot());
            debug!(host = %host, ?kind, merged, created, version, "Session updated");
        }

        CaptureOutcome::Captured {
            host: host.clone(),
            kind,
            merged,
            filtered: filtered.len(),
            created,
        }
    }

    fn control(&mut self, request: ControlRequest) -> Result<ControlPayload> {
        let action = request.action();
        let applied = control::apply(&mut self.state, request)?;

        if applied.mutated {
            let version = self.saves.enqueue(self.state.snapshot());
            trace!(action, version, "Control change queued for save");
        }

        Ok(applied.payload)
    }
}

/// Host exactly as the request URL spelled it
fn raw_host(raw_url: &str) -> String {
    Url::parse(raw_url.trim())
        .ok()
        .and_then(|url| {
            url.host_str().map(|host| match url.port() {
                Some(port) => format!("{}:{}", host, port),
                None => host.to_string(),
            })
        })
        .unwrap_or_else(|| raw_url.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_host() {
        assert_eq!(raw_host("https://www.X.com/i/api"), "www.x.com");
        assert_eq!(raw_host("http://localhost:8001/a"), "localhost:8001");
        assert_eq!(raw_host("x.com"), "x.com");
    }

    #[test]
    fn test_outcome_accessors() {
        let host = CanonicalHost::parse("x.com").unwrap();
        let captured = CaptureOutcome::Captured {
            host: host.clone(),
            kind: FieldKind::Header,
            merged: 1,
            filtered: 0,
            created: true,
        };
        assert!(captured.is_captured());
        assert_eq!(captured.host(), Some(&host));

        let skipped = CaptureOutcome::Skipped(SkipReason::NotCapturing);
        assert!(!skipped.is_captured());
        assert!(skipped.host().is_none());
    }
}
