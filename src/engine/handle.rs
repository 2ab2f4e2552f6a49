// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Cloneable handle to a running engine

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use futures::StreamExt;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use super::actor::Command;
use super::{CaptureOutcome, CookiePoller, EngineConfig, SkipReason};
use crate::capability::{CookieEntry, CookieSource, HeaderEntry, ObservedRequest, RequestStream};
use crate::control::{ControlPayload, ControlRequest, ControlService};
use crate::domain::CanonicalHost;
use crate::error::{Error, ErrorContext, Result};
use crate::metrics::{CaptureMetrics, MetricsReport};

/// Per-host results of one poll round
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollReport {
    /// Hosts whose cookies were merged
    pub captured: Vec<CanonicalHost>,
    /// Hosts dropped at merge time
    pub skipped: Vec<CanonicalHost>,
    /// Hosts whose cookie fetch failed, with the reason
    pub failed: Vec<(CanonicalHost, String)>,
}

impl PollReport {
    /// Number of hosts polled
    pub fn polled(&self) -> usize {
        self.captured.len() + self.skipped.len() + self.failed.len()
    }

    /// Check if nothing was polled
    pub fn is_empty(&self) -> bool {
        self.polled() == 0
    }
}

/// Entry points into a running [`CaptureEngine`](super::CaptureEngine)
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<Command>,
    cookies: Arc<dyn CookieSource>,
    fetch_timeout: Duration,
    poll_interval: Duration,
    metrics: Arc<CaptureMetrics>,
}

impl std::fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineHandle")
            .field("fetch_timeout", &self.fetch_timeout)
            .field("poll_interval", &self.poll_interval)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl EngineHandle {
    pub(crate) fn new(
        tx: mpsc::Sender<Command>,
        cookies: Arc<dyn CookieSource>,
        config: &EngineConfig,
        metrics: Arc<CaptureMetrics>,
    ) -> Self {
        Self {
            tx,
            cookies,
            fetch_timeout: config.fetch_timeout,
            poll_interval: config.poll_interval,
            metrics,
        }
    }

    async fn ask<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| Error::EngineClosed)?;
        rx.await.map_err(|_| Error::EngineClosed)
    }

    /// Capture headers of an outgoing request
    pub async fn on_request_observed(
        &self,
        url: &str,
        headers: Vec<HeaderEntry>,
    ) -> Result<CaptureOutcome> {
        self.observe(ObservedRequest::new(url, headers)).await
    }

    /// Capture an observed request event
    pub async fn observe(&self, request: ObservedRequest) -> Result<CaptureOutcome> {
        self.ask(|reply| Command::Request { request, reply }).await
    }

    /// Fetch and merge cookies for one domain
    ///
    /// Fails only if the cookie source fails or times out; nothing is
    /// created for the host in that case.
    pub async fn on_cookie_poll_tick(&self, raw_domain: &str) -> Result<CaptureOutcome> {
        let host = match CanonicalHost::parse(raw_domain) {
            Ok(host) => host,
            Err(e) => {
                debug!(domain = %raw_domain, error = %e, "Skipping cookie poll");
                self.metrics.record_rejected();
                return Ok(CaptureOutcome::Skipped(SkipReason::InvalidHost(
                    raw_domain.to_string(),
                )));
            }
        };

        let accepts = self
            .ask(|reply| Command::Accepts {
                host: host.clone(),
                reply,
            })
            .await?;
        if let Err(reason) = accepts {
            self.metrics.record_rejected();
            return Ok(CaptureOutcome::Skipped(reason));
        }

        let cookies = self.fetch_cookies(&host).await?;
        let source = raw_domain.trim().to_string();
        self.ask(|reply| Command::Cookies {
            host,
            source,
            cookies,
            reply,
        })
        .await
    }

    async fn fetch_cookies(&self, host: &CanonicalHost) -> Result<Vec<CookieEntry>> {
        let start = Instant::now();
        let result = match tokio::time::timeout(self.fetch_timeout, self.cookies.get_all(host)).await
        {
            Ok(result) => result.with_host(host.as_str()),
            Err(_) => Err(Error::timeout_with_host(
                "cookie fetch",
                self.fetch_timeout.as_millis() as u64,
                host.as_str(),
            )),
        };

        self.metrics
            .record_fetch(start.elapsed().as_millis() as u64, result.is_ok());
        result
    }

    /// Run one cookie poll tick for every allow-listed host
    ///
    /// Hosts are polled concurrently and independently. A failing host is
    /// logged and reported; only a closed engine is an error.
    pub async fn poll_all(&self) -> Result<PollReport> {
        let targets = self.ask(|reply| Command::PollTargets { reply }).await?;
        let results = join_all(
            targets
                .iter()
                .map(|host| self.on_cookie_poll_tick(host.as_str())),
        )
        .await;

        let mut report = PollReport::default();
        for (host, result) in targets.into_iter().zip(results) {
            match result {
                Ok(CaptureOutcome::Captured { .. }) => report.captured.push(host),
                Ok(CaptureOutcome::Skipped(_)) => report.skipped.push(host),
                Err(Error::EngineClosed) => return Err(Error::EngineClosed),
                Err(e) => {
                    if e.is_recoverable() {
                        warn!(host = %host, error = %e, "Cookie capture failed, retrying next tick");
                    } else {
                        error!(host = %host, error = %e, "Cookie capture failed");
                    }
                    report.failed.push((host, e.to_string()));
                }
            }
        }

        Ok(report)
    }

    /// Apply a control request
    pub async fn control(&self, request: ControlRequest) -> Result<ControlPayload> {
        self.ask(|reply| Command::Control { request, reply }).await?
    }

    /// Wait until every change made so far is persisted
    pub async fn flush(&self) -> Result<()> {
        self.ask(|reply| Command::Flush { reply }).await
    }

    /// Stop the engine after persisting pending changes
    pub async fn shutdown(&self) -> Result<()> {
        self.ask(|reply| Command::Shutdown { reply }).await
    }

    /// Check if the engine has stopped
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Current capture metrics
    pub fn metrics(&self) -> MetricsReport {
        self.metrics.report()
    }

    /// Control protocol front-end for this engine
    pub fn control_service(&self) -> ControlService {
        ControlService::new(self.clone())
    }

    /// Feed a request observer stream into the engine
    ///
    /// The task ends when the stream ends or the engine closes.
    pub fn attach_observer(&self, mut stream: RequestStream) -> JoinHandle<()> {
        let engine = self.clone();
        tokio::spawn(async move {
            while let Some(request) = stream.next().await {
                if engine.observe(request).await.is_err() {
                    debug!("Engine closed, detaching request observer");
                    break;
                }
            }
        })
    }

    /// Start the periodic cookie poller
    pub fn spawn_poller(&self) -> CookiePoller {
        CookiePoller::spawn(self.clone(), self.poll_interval)
    }
}
