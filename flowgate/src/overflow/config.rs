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

//! Configuration surface for a subscription's overflow handling.

use super::{Capacity, OverflowPolicy};
use crate::error::FlowError;

/// Overflow configuration chosen when a subscription is created.
///
/// A subscription created without an explicit configuration still gets a
/// small bounded buffer; see [`OverflowConfig::DEFAULT_CAPACITY`].
///
/// # Examples
///
/// ```rust
/// use flowgate::overflow::{Capacity, OverflowConfig, OverflowPolicy};
///
/// // Default configuration: Buffer(128)
/// let config = OverflowConfig::default();
/// assert_eq!(config.policy, OverflowPolicy::Buffer);
/// assert_eq!(config.capacity, Capacity::Bounded(128));
///
/// // Keep only the freshest reading
/// let config = OverflowConfig::latest();
/// assert_eq!(config.effective_capacity(), Capacity::Bounded(1));
///
/// // Customize configuration
/// let config = OverflowConfig {
///     policy: OverflowPolicy::DropOldest,
///     capacity: Capacity::Bounded(1024),
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OverflowConfig {
    /// What to do with an item that arrives without credit.
    ///
    /// Default: [`OverflowPolicy::Buffer`]
    pub policy: OverflowPolicy,

    /// Maximum number of items held while waiting for credit.
    ///
    /// Ignored by [`OverflowPolicy::Error`] (nothing is held) and
    /// [`OverflowPolicy::Latest`] (exactly one slot).
    ///
    /// Default: 128
    pub capacity: Capacity,

    /// Deliver upstream errors only after buffered items have drained.
    ///
    /// When `false`, an upstream error discards items that are still waiting
    /// for credit and is delivered as soon as the subscriber is free. Items
    /// that already consumed credit are always delivered first. Overflow
    /// errors are never delayed.
    ///
    /// Default: false
    pub delay_error: bool,
}

impl OverflowConfig {
    /// Capacity of the implicit buffer every subscription gets by default.
    pub const DEFAULT_CAPACITY: usize = 128;

    /// Creates a configuration with the given policy and capacity.
    #[must_use]
    pub const fn new(policy: OverflowPolicy, capacity: Capacity) -> Self {
        Self {
            policy,
            capacity,
            delay_error: false,
        }
    }

    /// No buffering: any item without credit terminates the stream.
    #[must_use]
    pub const fn error() -> Self {
        Self::new(OverflowPolicy::Error, Capacity::Bounded(0))
    }

    /// Bounded buffer that fails with an overflow once full.
    #[must_use]
    pub const fn buffer(capacity: usize) -> Self {
        Self::new(OverflowPolicy::Buffer, Capacity::Bounded(capacity))
    }

    /// Unbounded buffer; never overflows.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self::new(OverflowPolicy::Buffer, Capacity::Unbounded)
    }

    /// Bounded buffer that discards incoming items once full.
    #[must_use]
    pub const fn drop_newest(capacity: usize) -> Self {
        Self::new(OverflowPolicy::DropNewest, Capacity::Bounded(capacity))
    }

    /// Bounded buffer that evicts its oldest item once full.
    #[must_use]
    pub const fn drop_oldest(capacity: usize) -> Self {
        Self::new(OverflowPolicy::DropOldest, Capacity::Bounded(capacity))
    }

    /// Single-slot buffer holding the most recent item.
    #[must_use]
    pub const fn latest() -> Self {
        Self::new(OverflowPolicy::Latest, Capacity::Bounded(1))
    }

    /// Updates the error delivery mode.
    #[must_use]
    pub const fn with_delay_error(mut self, delay_error: bool) -> Self {
        self.delay_error = delay_error;
        self
    }

    /// Returns the capacity the buffer actually enforces for this policy.
    #[must_use]
    pub const fn effective_capacity(&self) -> Capacity {
        match self.policy {
            OverflowPolicy::Error => Capacity::Bounded(0),
            OverflowPolicy::Latest => Capacity::Bounded(1),
            OverflowPolicy::Buffer | OverflowPolicy::DropNewest | OverflowPolicy::DropOldest => {
                self.capacity
            }
        }
    }

    /// Checks that the configuration describes a usable buffer.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::InvalidConfiguration`] when a buffering policy is
    /// given a zero capacity.
    pub fn validate(&self) -> Result<(), FlowError> {
        match (self.policy, self.capacity) {
            (
                OverflowPolicy::Buffer | OverflowPolicy::DropNewest | OverflowPolicy::DropOldest,
                Capacity::Bounded(0),
            ) => Err(FlowError::invalid_configuration(format!(
                "{} policy requires a positive capacity",
                self.policy
            ))),
            _ => Ok(()),
        }
    }
}

impl Default for OverflowConfig {
    fn default() -> Self {
        Self::buffer(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_small_buffer() {
        let config = OverflowConfig::default();
        assert_eq!(config.policy, OverflowPolicy::Buffer);
        assert_eq!(config.capacity, Capacity::Bounded(OverflowConfig::DEFAULT_CAPACITY));
        assert!(!config.delay_error);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_capacity_rejected_for_buffering_policies() {
        for config in [
            OverflowConfig::buffer(0),
            OverflowConfig::drop_newest(0),
            OverflowConfig::drop_oldest(0),
        ] {
            let error = config.validate().unwrap_err();
            assert!(error.is_invalid_configuration());
        }
    }

    #[test]
    fn test_error_and_latest_ignore_capacity() {
        let config = OverflowConfig::new(OverflowPolicy::Latest, Capacity::Bounded(0));
        assert!(config.validate().is_ok());
        assert_eq!(config.effective_capacity(), Capacity::Bounded(1));

        let config = OverflowConfig::new(OverflowPolicy::Error, Capacity::Unbounded);
        assert!(config.validate().is_ok());
        assert_eq!(config.effective_capacity(), Capacity::Bounded(0));
    }

    #[test]
    fn test_builder() {
        let config = OverflowConfig::unbounded().with_delay_error(true);
        assert_eq!(config.capacity, Capacity::Unbounded);
        assert!(config.delay_error);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_round_trip_from_json() {
        let json = r#"{"policy":"drop_oldest","capacity":{"bounded":32}}"#;
        let config: OverflowConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config, OverflowConfig::drop_oldest(32));

        let json = r#"{"capacity":"unbounded"}"#;
        let config: OverflowConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.policy, OverflowPolicy::Buffer);
        assert_eq!(config.capacity, Capacity::Unbounded);
    }
}
