// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Capture policy
//!
//! Decides, per host and field, whether a cookie or header is kept. Hosts with
//! a configured filter only keep the listed names; every other host keeps
//! everything.

mod table;

pub use table::{CapturePolicy, FieldKind, HostFilter, HostRule, BUILTIN_POLICY};
