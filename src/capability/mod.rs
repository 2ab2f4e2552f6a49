// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Injected capabilities
//!
//! The engine never talks to a platform directly. Time, cookies, durable
//! storage and the stream of outgoing requests all come in through these
//! traits so they can be swapped for in-memory versions in tests.

mod clock;
mod cookie_source;
mod observer;
mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use cookie_source::{CookieEntry, CookieSource};
pub use observer::{request_channel, HeaderEntry, ObservedRequest, RequestSender, RequestStream};
pub use store::{FileStore, KeyValueStore, MemoryStore};
