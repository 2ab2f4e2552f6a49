// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # Sessionjar - Domain-Scoped Session Capture
//!
//! Captures cookies and request headers for an allow-list of domains and
//! keeps one session record per host, persisted after every change.
//!
//! ## Features
//!
//! - Domain normalization: one canonical key per host, whatever the input
//! - Capture policy: per-host cookie/header filters, capture-all fallback
//! - Single-owner engine: every mutation serialized through one actor
//! - Durable state: ordered snapshot saves over a pluggable key/value store
//! - Control protocol: start/stop, allow-list edits, status, export, clear
//! - Cookie polling: periodic per-host fetches, failures isolated per host
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sessionjar::{CaptureEngine, CookieJar, EngineConfig, HeaderEntry};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let jar = CookieJar::new();
//!     let engine = CaptureEngine::builder(EngineConfig::default())
//!         .cookie_source(Arc::new(jar))
//!         .spawn()
//!         .await?;
//!
//!     let control = engine.control_service();
//!     control.add_domain("https://www.x.com").await?;
//!     control.start_capture().await?;
//!
//!     engine
//!         .on_request_observed(
//!             "https://x.com/i/api/graphql",
//!             vec![HeaderEntry::new("authorization", "Bearer token")],
//!         )
//!         .await?;
//!
//!     let sessions = control.export().await?;
//!     println!("{}", serde_json::to_string_pretty(&sessions)?);
//!
//!     engine.shutdown().await?;
//!     Ok(())
//! }
//! ```

pub mod capability;
pub mod control;
pub mod cookies;
pub mod domain;
pub mod engine;
pub mod error;
pub mod export;
pub mod metrics;
pub mod persistence;
pub mod policy;
pub mod session;

// Re-exports for convenience

// Engine
pub use engine::{
    CaptureEngine, CaptureOutcome, CaptureState, CookiePoller, EngineConfig, EngineHandle,
    PollReport, SkipReason,
};

// Domains and policy
pub use domain::{normalize, AllowList, CanonicalHost};
pub use policy::{CapturePolicy, FieldKind, HostFilter, HostRule};

// Sessions
pub use session::{SessionRecord, SessionSnapshot, SessionStore};

// Control protocol
pub use control::{ControlPayload, ControlRequest, ControlResponse, ControlService, StatusReport};

// Capabilities
pub use capability::{
    request_channel, Clock, CookieEntry, CookieSource, FileStore, FixedClock, HeaderEntry,
    KeyValueStore, MemoryStore, ObservedRequest, RequestSender, RequestStream, SystemClock,
};

// Persistence
pub use persistence::{PersistenceGateway, Snapshot};

// Cookies
pub use cookies::{Cookie, CookieJar};

// Export
pub use export::ExportDocument;

// Metrics
pub use metrics::{CaptureMetrics, MetricsReport};

// Error types
pub use error::{Error, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
