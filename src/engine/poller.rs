// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Periodic cookie poller

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

use super::EngineHandle;

/// Background task that polls cookies for every allow-listed host
pub struct CookiePoller {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl CookiePoller {
    /// Start polling every `period`; the first tick fires after one period
    pub fn spawn(engine: EngineHandle, period: Duration) -> Self {
        let (shutdown, mut stop) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => match engine.poll_all().await {
                        Ok(report) if !report.is_empty() => debug!(
                            captured = report.captured.len(),
                            skipped = report.skipped.len(),
                            failed = report.failed.len(),
                            "Cookie poll complete"
                        ),
                        Ok(_) => {}
                        Err(_) => {
                            debug!("Engine closed, stopping cookie poller");
                            break;
                        }
                    },
                    changed = stop.changed() => {
                        if changed.is_err() || *stop.borrow() {
                            break;
                        }
                    }
                }
            }
        });

        Self { shutdown, task }
    }

    /// Stop polling and wait for the task to exit
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Cookie poller task failed");
        }
    }
}
