// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Ordered save queue
//!
//! A single writer task applies snapshots in the order they were enqueued.
//! When several are waiting only the newest is written; an older snapshot is
//! never written after a newer one.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::{PersistenceGateway, Snapshot};
use crate::metrics::CaptureMetrics;

enum SaveCommand {
    Save { version: u64, snapshot: Snapshot },
    Flush(oneshot::Sender<()>),
}

/// Producer side of the save queue, owned by the engine actor
pub struct SaveQueue {
    tx: mpsc::UnboundedSender<SaveCommand>,
    next_version: u64,
    writer: JoinHandle<()>,
}

impl SaveQueue {
    /// Spawn the writer task
    pub fn spawn(gateway: PersistenceGateway, metrics: Arc<CaptureMetrics>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let writer = tokio::spawn(run_writer(gateway, metrics, rx));
        Self {
            tx,
            next_version: 1,
            writer,
        }
    }

    /// Queue a snapshot, returns its version
    pub fn enqueue(&mut self, snapshot: Snapshot) -> u64 {
        let version = self.next_version;
        self.next_version += 1;
        if self.tx.send(SaveCommand::Save { version, snapshot }).is_err() {
            tracing::warn!(version, "Save writer gone, snapshot dropped");
        }
        version
    }

    /// Signal `done` once everything queued so far has been applied
    pub fn notify_flushed(&self, done: oneshot::Sender<()>) {
        if let Err(mpsc::error::SendError(SaveCommand::Flush(done))) =
            self.tx.send(SaveCommand::Flush(done))
        {
            let _ = done.send(());
        }
    }

    /// Stop accepting saves and wait for the writer to drain
    pub async fn close(self) {
        drop(self.tx);
        if let Err(e) = self.writer.await {
            tracing::warn!(error = %e, "Save writer task failed");
        }
    }
}

async fn run_writer(
    gateway: PersistenceGateway,
    metrics: Arc<CaptureMetrics>,
    mut rx: mpsc::UnboundedReceiver<SaveCommand>,
) {
    let mut last_applied = 0u64;
    let mut waiters = Vec::new();

    while let Some(first) = rx.recv().await {
        let mut pending = None;
        absorb(first, &mut pending, &mut waiters);
        while let Ok(next) = rx.try_recv() {
            absorb(next, &mut pending, &mut waiters);
        }

        if let Some((version, snapshot)) = pending {
            debug_assert!(version > last_applied);
            match gateway.save(&snapshot).await {
                Ok(()) => {
                    tracing::debug!(version, "Snapshot saved");
                    metrics.record_save(true);
                }
                Err(e) => {
                    tracing::warn!(version, error = %e, "Snapshot save failed, keeping in-memory state");
                    metrics.record_save(false);
                }
            }
            last_applied = version;
        }

        for done in waiters.drain(..) {
            let _ = done.send(());
        }
    }
}

fn absorb(
    command: SaveCommand,
    pending: &mut Option<(u64, Snapshot)>,
    waiters: &mut Vec<oneshot::Sender<()>>,
) {
    match command {
        SaveCommand::Save { version, snapshot } => *pending = Some((version, snapshot)),
        SaveCommand::Flush(done) => waiters.push(done),
    }
}
