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

//! Signal and emission types.

use crate::error::FlowError;

/// A signal travelling from producer to consumer.
#[derive(Debug, Clone)]
pub enum Signal<T> {
    /// A data item.
    Item(T),
    /// The producer finished normally.
    Complete,
    /// The stream failed.
    Error(FlowError),
}

impl<T> Signal<T> {
    /// Returns `true` for `Complete` and `Error`.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Error(_))
    }

    /// Returns the item, if this is an item signal.
    pub fn into_item(self) -> Option<T> {
        match self {
            Self::Item(item) => Some(item),
            Self::Complete | Self::Error(_) => None,
        }
    }
}

/// What happened to an item passed to [`Producer::emit`](super::Producer::emit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Emission {
    /// Credit was available; the item was consumed against it and queued for
    /// delivery in order.
    Emitted,
    /// No credit; the item is waiting in the overflow buffer.
    Buffered,
    /// No credit and the buffer was full; the oldest buffered item was
    /// evicted to make room.
    Evicted,
    /// No credit; the item replaced the single held item.
    Replaced,
    /// No credit and the buffer was full; the item was discarded.
    Dropped,
    /// The subscription was cancelled; the item was discarded.
    Cancelled,
}

impl Emission {
    /// Returns `true` if the emitted item may still reach the subscriber.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Emitted | Self::Buffered | Self::Evicted | Self::Replaced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_terminal() {
        assert!(!Signal::Item(1).is_terminal());
        assert!(Signal::<u8>::Complete.is_terminal());
        assert!(Signal::<u8>::Error(FlowError::protocol_violation("x")).is_terminal());
        assert_eq!(Signal::Item(5).into_item(), Some(5));
        assert_eq!(Signal::<u8>::Complete.into_item(), None);
    }

    #[test]
    fn test_emission_pending() {
        assert!(Emission::Emitted.is_pending());
        assert!(Emission::Replaced.is_pending());
        assert!(!Emission::Dropped.is_pending());
        assert!(!Emission::Cancelled.is_pending());
    }
}
