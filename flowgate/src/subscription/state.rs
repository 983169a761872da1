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

//! Subscription lifecycle states.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle state of a subscription.
///
/// ```text
///            request(n)
///           ┌─────────┐
///           ▼         │
///        ┌──────────────┐  cancel()   ┌───────────┐
///        │    Active    │────────────▶│ Cancelled │
///        └──────────────┘             └───────────┘
///          │          │
///  complete│          │overflow / error
///          ▼          ▼
///   ┌───────────┐  ┌─────────┐
///   │ Completed │  │ Errored │
///   └───────────┘  └─────────┘
/// ```
///
/// `Completed` and `Errored` are entered when the terminal signal is handed
/// to the subscriber. No state is left once `Cancelled`, `Completed` or
/// `Errored` is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SubscriptionState {
    /// Signals may flow.
    Active = 0,
    /// The consumer cancelled; nothing further is delivered.
    Cancelled = 1,
    /// `Complete` was delivered.
    Completed = 2,
    /// An error was delivered.
    Errored = 3,
}

impl SubscriptionState {
    /// Returns `true` while signals may still flow.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Returns `true` if a terminal signal was delivered.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Errored)
    }

    /// Returns `true` for every state that cannot be left.
    #[must_use]
    pub const fn is_final(&self) -> bool {
        !self.is_active()
    }

    /// Returns the string name of this state.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
            Self::Errored => "errored",
        }
    }

    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Active,
            1 => Self::Cancelled,
            2 => Self::Completed,
            _ => Self::Errored,
        }
    }
}

impl fmt::Display for SubscriptionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Atomic holder for a [`SubscriptionState`].
#[derive(Debug)]
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    pub(crate) const fn new() -> Self {
        Self(AtomicU8::new(SubscriptionState::Active as u8))
    }

    pub(crate) fn get(&self) -> SubscriptionState {
        SubscriptionState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Moves from `Active` to `target`. Returns `false` if the state had
    /// already left `Active`.
    pub(crate) fn finish(&self, target: SubscriptionState) -> bool {
        self.0
            .compare_exchange(
                SubscriptionState::Active as u8,
                target as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_active() {
        let cell = StateCell::new();
        assert_eq!(cell.get(), SubscriptionState::Active);
    }

    #[test]
    fn test_only_one_exit_from_active() {
        let cell = StateCell::new();
        assert!(cell.finish(SubscriptionState::Cancelled));
        assert!(!cell.finish(SubscriptionState::Completed));
        assert!(!cell.finish(SubscriptionState::Errored));
        assert_eq!(cell.get(), SubscriptionState::Cancelled);
    }

    #[test]
    fn test_classification() {
        assert!(SubscriptionState::Active.is_active());
        assert!(SubscriptionState::Completed.is_terminal());
        assert!(SubscriptionState::Errored.is_terminal());
        assert!(!SubscriptionState::Cancelled.is_terminal());
        assert!(SubscriptionState::Cancelled.is_final());
        assert_eq!(SubscriptionState::Errored.to_string(), "errored");
    }
}
