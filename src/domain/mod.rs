// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Host identity
//!
//! Canonical host keys and the allow-list built from them.

mod allow_list;
mod normalize;

pub use allow_list::AllowList;
pub use normalize::{normalize, CanonicalHost};
