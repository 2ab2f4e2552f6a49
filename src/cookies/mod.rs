// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! In-process cookie storage
//!
//! A cookie jar fed from `Set-Cookie` headers that doubles as the engine's
//! cookie source when no platform cookie store is available.

mod jar;

pub use jar::{Cookie, CookieJar};
