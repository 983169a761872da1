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

//! Error types for flowgate.
//!
//! Every failure is scoped to a single subscription. The taxonomy has three
//! runtime categories and one construction-time category:
//!
//! 1. **Overflow**: the producer had an item, no credit, and no room to
//!    buffer it ([`FlowError::Overflow`]).
//! 2. **Protocol violation**: a party broke the signalling contract, e.g. a
//!    producer signalled after its own terminal signal, or an upstream pushed
//!    past the credit it was granted ([`FlowError::ProtocolViolation`]).
//! 3. **Upstream**: the producer's own failure, forwarded as-is
//!    ([`FlowError::Upstream`]).
//! 4. **Invalid configuration**: rejected before a subscription exists
//!    ([`FlowError::InvalidConfiguration`]).
//!
//! Overflow, protocol violations and upstream errors are terminal: they are
//! delivered to the subscriber as an error signal and the subscription moves
//! to [`Errored`](crate::subscription::SubscriptionState::Errored).
//!
//! # Examples
//!
//! ```rust
//! use flowgate::FlowError;
//! use std::io;
//!
//! let error = FlowError::upstream(io::Error::new(io::ErrorKind::Other, "disk gone"));
//! assert!(error.is_upstream());
//! assert!(error.is_terminal());
//! assert!(error.to_string().contains("disk gone"));
//! ```

use crate::overflow::{Capacity, OverflowPolicy};
use std::error::Error as StdError;
use std::sync::Arc;
use thiserror::Error;

/// Errors produced by the flow-control core.
///
/// `FlowError` is `Clone` so the same value can be returned to the producer
/// and delivered to the subscriber. Upstream causes are shared behind an
/// [`Arc`] for that reason.
#[derive(Debug, Clone, Error)]
pub enum FlowError {
    /// An item arrived with no credit and the overflow policy could not hold it.
    ///
    /// Raised immediately under [`OverflowPolicy::Error`] and once the
    /// capacity is exhausted under [`OverflowPolicy::Buffer`].
    #[error("overflow: {policy} buffer with capacity {capacity} cannot accept another item")]
    Overflow {
        /// The policy in force when the overflow occurred
        policy: OverflowPolicy,
        /// The configured capacity of the buffer
        capacity: Capacity,
    },

    /// The signalling contract was broken.
    ///
    /// This is an implementation defect on the producing side and is fatal to
    /// the subscription it occurred on.
    #[error("protocol violation: {reason}")]
    ProtocolViolation {
        /// Description of the violated rule
        reason: String,
    },

    /// The producer failed; the cause is forwarded unchanged.
    #[error("upstream error: {0}")]
    Upstream(#[source] Arc<dyn StdError + Send + Sync>),

    /// A configuration value was rejected.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration {
        /// Description of the configuration error
        reason: String,
    },
}

impl FlowError {
    /// Wraps an arbitrary producer failure as [`FlowError::Upstream`].
    pub fn upstream<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Upstream(Arc::new(error))
    }

    /// Builds a [`FlowError::ProtocolViolation`].
    pub fn protocol_violation(reason: impl Into<String>) -> Self {
        Self::ProtocolViolation {
            reason: reason.into(),
        }
    }

    /// Builds a [`FlowError::InvalidConfiguration`].
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    /// Returns `true` if this is an overflow.
    #[must_use]
    pub const fn is_overflow(&self) -> bool {
        matches!(self, Self::Overflow { .. })
    }

    /// Returns `true` if this is a protocol violation.
    #[must_use]
    pub const fn is_protocol_violation(&self) -> bool {
        matches!(self, Self::ProtocolViolation { .. })
    }

    /// Returns `true` if this wraps a producer failure.
    #[must_use]
    pub const fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream(_))
    }

    /// Returns `true` if this is a configuration error.
    #[must_use]
    pub const fn is_invalid_configuration(&self) -> bool {
        matches!(self, Self::InvalidConfiguration { .. })
    }

    /// Returns `true` if this error ends the subscription it occurred on.
    ///
    /// Configuration errors are raised before a subscription exists and are
    /// therefore not terminal.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !self.is_invalid_configuration()
    }

    /// Returns the producer's original failure, if this is an upstream error.
    #[must_use]
    pub fn upstream_cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        match self {
            Self::Upstream(cause) => Some(cause.as_ref()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_overflow_display_names_policy_and_capacity() {
        let error = FlowError::Overflow {
            policy: OverflowPolicy::Buffer,
            capacity: Capacity::bounded(5),
        };
        let text = error.to_string();
        assert!(text.contains("buffer"));
        assert!(text.contains('5'));
        assert!(error.is_overflow());
        assert!(error.is_terminal());
    }

    #[test]
    fn test_upstream_keeps_cause() {
        let error = FlowError::upstream(io::Error::new(io::ErrorKind::BrokenPipe, "pipe"));
        assert!(error.is_upstream());
        assert!(error.source().is_some());

        let cause = error.upstream_cause().unwrap();
        let io_error = cause.downcast_ref::<io::Error>().unwrap();
        assert_eq!(io_error.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_clone_shares_upstream_cause() {
        let error = FlowError::upstream(io::Error::new(io::ErrorKind::Other, "shared"));
        let clone = error.clone();
        assert_eq!(error.to_string(), clone.to_string());
    }

    #[test]
    fn test_classification() {
        let violation = FlowError::protocol_violation("emit after complete");
        assert!(violation.is_protocol_violation());
        assert!(violation.is_terminal());
        assert!(violation.to_string().contains("emit after complete"));

        let config = FlowError::invalid_configuration("capacity must be positive");
        assert!(config.is_invalid_configuration());
        assert!(!config.is_terminal());
        assert!(config.upstream_cause().is_none());
    }
}
