// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Capture engine
//!
//! A single actor task owns the capturing flag, the allow-list and the
//! session store. Request events, cookie poll results and control calls are
//! all delivered to it as messages, so every mutation is serialized and each
//! one queues an ordered snapshot save.

mod actor;
mod config;
mod engine;
mod handle;
mod poller;
mod state;

pub use actor::{CaptureOutcome, SkipReason};
pub use config::EngineConfig;
pub use engine::CaptureEngine;
pub use handle::{EngineHandle, PollReport};
pub use poller::CookiePoller;
pub use state::CaptureState;
