// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Captured session state
//!
//! One [`SessionRecord`] per canonical host, accumulated field by field.

mod record;
mod store;

pub use record::SessionRecord;
pub use store::{SessionSnapshot, SessionStore};
