// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Durable state
//!
//! The whole engine state is persisted as one [`Snapshot`] after every
//! mutation. Saves are queued and applied strictly in mutation order.

mod gateway;
mod queue;

pub use gateway::{PersistenceGateway, Snapshot, KEY_CAPTURING, KEY_DOMAINS, KEY_SESSIONS};
pub use queue::SaveQueue;
