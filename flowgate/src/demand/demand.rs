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

//! Demand value type.

use std::fmt;

/// A snapshot of outstanding demand.
///
/// Finite demand carries the number of items the producer may still push.
/// `u64::MAX` is reserved as the unbounded sentinel, so converting it from a
/// raw count yields [`Demand::Unbounded`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Demand {
    /// Finite demand with remaining count.
    Finite(u64),
    /// Unbounded demand; backpressure is disabled.
    Unbounded,
}

impl Demand {
    /// Raw value used to encode [`Demand::Unbounded`].
    pub const UNBOUNDED_RAW: u64 = u64::MAX;

    /// Zero demand.
    pub const NONE: Self = Self::Finite(0);

    /// Builds a demand from a raw credit count.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        if raw == Self::UNBOUNDED_RAW {
            Self::Unbounded
        } else {
            Self::Finite(raw)
        }
    }

    /// Returns the raw credit count, `u64::MAX` when unbounded.
    #[must_use]
    pub const fn as_raw(&self) -> u64 {
        match self {
            Self::Finite(value) => *value,
            Self::Unbounded => Self::UNBOUNDED_RAW,
        }
    }

    /// Returns `true` if the demand is unbounded.
    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        matches!(self, Self::Unbounded)
    }

    /// Returns `true` if there is remaining demand.
    #[must_use]
    pub const fn has_demand(&self) -> bool {
        matches!(self, Self::Unbounded) || matches!(self, Self::Finite(remaining) if *remaining > 0)
    }

    /// Returns the remaining finite demand, if any.
    #[must_use]
    pub const fn remaining(&self) -> Option<u64> {
        match self {
            Self::Finite(value) => Some(*value),
            Self::Unbounded => None,
        }
    }
}

impl Default for Demand {
    fn default() -> Self {
        Self::NONE
    }
}

impl From<u64> for Demand {
    fn from(value: u64) -> Self {
        Self::from_raw(value)
    }
}

impl fmt::Display for Demand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finite(value) => write!(f, "{}", value),
            Self::Unbounded => write!(f, "unbounded"),
        }
    }
}
