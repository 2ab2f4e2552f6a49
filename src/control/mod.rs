// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Control protocol
//!
//! Request/response actions for starting and stopping capture, editing the
//! allow-list, reading status and exporting or clearing captured sessions.

mod protocol;
mod service;

pub use protocol::{ControlPayload, ControlRequest, ControlResponse, StatusReport, ACTIONS};
pub use service::ControlService;

pub(crate) use service::apply;
