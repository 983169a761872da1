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

//! Bridge configuration.

use crate::error::FlowError;

/// Configuration for a [`Bridge`](super::Bridge).
///
/// # Examples
///
/// ```rust
/// use flowgate::bridge::BridgeConfig;
///
/// let config = BridgeConfig::default();
/// assert_eq!(config.prefetch, 128);
/// assert_eq!(config.limit(), 96);
///
/// assert!(BridgeConfig::new(0).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BridgeConfig {
    /// Number of items requested from upstream ahead of delivery.
    ///
    /// This is the size of the handoff buffer between the two contexts.
    ///
    /// Default: 128
    pub prefetch: usize,
}

impl BridgeConfig {
    /// Default prefetch window.
    pub const DEFAULT_PREFETCH: usize = 128;

    /// Creates a configuration with the given prefetch window.
    #[must_use]
    pub const fn new(prefetch: usize) -> Self {
        Self { prefetch }
    }

    /// Number of delivered items after which upstream is asked for more.
    ///
    /// Three quarters of the prefetch window, and never less than one.
    #[must_use]
    pub const fn limit(&self) -> usize {
        let limit = self.prefetch - self.prefetch / 4;
        if limit == 0 { 1 } else { limit }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::InvalidConfiguration`] if `prefetch` is zero.
    pub fn validate(&self) -> Result<(), FlowError> {
        if self.prefetch == 0 {
            return Err(FlowError::invalid_configuration(
                "bridge prefetch must be greater than zero",
            ));
        }
        Ok(())
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PREFETCH)
    }
}
