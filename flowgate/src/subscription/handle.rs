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

//! Consumer-side control handle.

use super::core::Control;
use super::{SubscriptionId, SubscriptionState};
use crate::demand::Demand;
use crate::observability::FlowMetrics;
use crate::overflow::OverflowConfig;
use std::fmt;
use std::sync::Arc;

/// The control channel binding one producer to one consumer.
///
/// Consumers use it to grant credit and to cancel. The handle is cheap to
/// clone and every clone controls the same subscription. All methods are
/// non-blocking and may be called from any thread, including from inside
/// [`Subscriber`](crate::Subscriber) callbacks.
///
/// Once the subscription has been cancelled or has delivered a terminal
/// signal, `request` and `cancel` are silently ignored.
#[derive(Clone)]
pub struct Subscription {
    control: Arc<dyn Control>,
}

impl Subscription {
    pub(crate) fn new(control: Arc<dyn Control>) -> Self {
        Self { control }
    }

    /// Returns the subscription's id.
    #[must_use]
    pub fn id(&self) -> SubscriptionId {
        self.control.id()
    }

    /// Grants the producer credit for `demand` more items.
    ///
    /// Credit accumulates across calls. Requesting zero does nothing.
    /// Requesting [`Demand::Unbounded`] (or `u64::MAX`) disables
    /// backpressure for the rest of the subscription's life. Buffered items
    /// are released against the new credit before this call returns when
    /// delivery runs on the caller's context.
    pub fn request(&self, demand: impl Into<Demand>) {
        self.control.request(demand.into());
    }

    /// Disables backpressure permanently.
    pub fn request_unbounded(&self) {
        self.control.request(Demand::Unbounded);
    }

    /// Stops the flow.
    ///
    /// The state flips to [`SubscriptionState::Cancelled`] before this
    /// returns and buffered items are discarded. An item whose delivery had
    /// already started on another context may still reach the subscriber;
    /// nothing after it will.
    pub fn cancel(&self) {
        self.control.cancel();
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SubscriptionState {
        self.control.state()
    }

    /// Returns `true` once [`cancel`](Self::cancel) took effect.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.state() == SubscriptionState::Cancelled
    }

    /// Returns `true` once no further signal can be delivered.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.state().is_final()
    }

    /// Returns the credit not yet consumed by the producer.
    #[must_use]
    pub fn requested(&self) -> Demand {
        self.control.requested()
    }

    /// Returns the number of items waiting in the overflow buffer.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.control.buffered()
    }

    /// Returns the overflow configuration the subscription was created with.
    #[must_use]
    pub fn config(&self) -> &OverflowConfig {
        self.control.config()
    }

    /// Returns the subscription's metrics.
    #[must_use]
    pub fn metrics(&self) -> &FlowMetrics {
        self.control.metrics()
    }
    pub(crate) fn abandon(&self) {
        self.control.abandon();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id())
            .field("state", &self.state())
            .field("requested", &self.requested())
            .finish()
    }
}
