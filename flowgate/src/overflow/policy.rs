//
// Copyright 2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Overflow policy and capacity types.

use std::fmt;

/// Behavior applied to an item that arrives without credit.
///
/// The policy is fixed when a subscription is created and never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OverflowPolicy {
    /// No buffering; any unrequested item is an overflow.
    Error,

    /// Buffer up to the capacity; the item past capacity is an overflow.
    Buffer,

    /// When full, discard the incoming item.
    DropNewest,

    /// When full, evict the oldest buffered item to make room.
    DropOldest,

    /// Hold only the most recent item.
    Latest,
}

impl OverflowPolicy {
    /// Returns the string name of this policy.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Buffer => "buffer",
            Self::DropNewest => "drop_newest",
            Self::DropOldest => "drop_oldest",
            Self::Latest => "latest",
        }
    }

    /// Returns `true` if this policy can terminate a stream with an overflow.
    #[must_use]
    pub const fn can_overflow(&self) -> bool {
        matches!(self, Self::Error | Self::Buffer)
    }

    /// Returns `true` if this policy may silently discard items.
    #[must_use]
    pub const fn is_lossy(&self) -> bool {
        matches!(self, Self::DropNewest | Self::DropOldest | Self::Latest)
    }
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Maximum number of items an overflow buffer may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Capacity {
    /// At most this many items. Zero is only meaningful for
    /// [`OverflowPolicy::Error`].
    Bounded(usize),

    /// No limit; the buffer grows with the backlog.
    Unbounded,
}

impl Capacity {
    /// Shorthand for [`Capacity::Bounded`].
    #[must_use]
    pub const fn bounded(limit: usize) -> Self {
        Self::Bounded(limit)
    }

    /// Returns the limit, or `None` when unbounded.
    #[must_use]
    pub const fn limit(&self) -> Option<usize> {
        match self {
            Self::Bounded(limit) => Some(*limit),
            Self::Unbounded => None,
        }
    }

    /// Returns `true` if there is no limit.
    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        matches!(self, Self::Unbounded)
    }

    /// Returns `true` if a buffer holding `len` items has room for one more.
    #[must_use]
    pub const fn has_room(&self, len: usize) -> bool {
        match self {
            Self::Bounded(limit) => len < *limit,
            Self::Unbounded => true,
        }
    }
}

impl From<usize> for Capacity {
    fn from(limit: usize) -> Self {
        Self::Bounded(limit)
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bounded(limit) => write!(f, "{}", limit),
            Self::Unbounded => write!(f, "unbounded"),
        }
    }
}
