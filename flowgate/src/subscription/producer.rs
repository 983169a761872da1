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

//! Producer-side handle.

use super::core::Core;
use super::{Emission, Subscription, SubscriptionId};
use crate::demand::Demand;
use crate::error::FlowError;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// The sending side of a subscription.
///
/// Every item goes through [`emit`](Self::emit), which consumes one unit of
/// credit or, when there is none, hands the item to the overflow buffer. A
/// producer therefore never pushes more items to its subscriber than were
/// requested. Producers never block waiting for credit; they may poll
/// [`has_demand`](Self::has_demand) to avoid producing work nobody asked for.
///
/// `Producer` is `Send + Sync` but deliberately not `Clone`: a subscription
/// has exactly one producer.
///
/// Dropping a producer that has not terminated the stream completes it, the
/// same way dropping the last `tokio::sync::mpsc::Sender` ends a channel.
/// Buffered items are still delivered before `on_complete`. If the drop
/// happens while the thread is panicking the stream fails with
/// [`FlowError::ProtocolViolation`] instead, so a crashed producer is never
/// mistaken for a finished one.
///
/// # Example
///
/// ```rust
/// use flowgate::{Emission, OverflowConfig, subscribe, testing::TestSubscriber};
///
/// let subscriber = TestSubscriber::with_initial_request(2);
/// let recorder = subscriber.recorder();
/// let producer = subscribe(OverflowConfig::error(), subscriber).unwrap();
///
/// assert_eq!(producer.emit("a").unwrap(), Emission::Emitted);
/// assert_eq!(producer.emit("b").unwrap(), Emission::Emitted);
/// assert!(producer.emit("c").unwrap_err().is_overflow());
///
/// assert_eq!(recorder.items(), vec!["a", "b"]);
/// assert!(recorder.error().unwrap().is_overflow());
/// ```
pub struct Producer<T> {
    core: Arc<Core<T>>,
    subscription: Subscription,
}

impl<T: Send + 'static> Producer<T> {
    pub(crate) fn new(core: Arc<Core<T>>, subscription: Subscription) -> Self {
        Self { core, subscription }
    }

    /// Pushes one item.
    ///
    /// Returns what happened to the item. After the consumer cancelled the
    /// item is discarded and [`Emission::Cancelled`] is returned.
    ///
    /// # Errors
    ///
    /// - [`FlowError::Overflow`] when the item has no credit and the policy
    ///   cannot hold it. The subscription is terminated and the subscriber
    ///   receives the same error.
    /// - [`FlowError::ProtocolViolation`] when the stream was already
    ///   terminated by the producer or by an earlier overflow.
    pub fn emit(&self, item: T) -> Result<Emission, FlowError> {
        self.core.emit(item)
    }

    /// Signals normal completion.
    ///
    /// The subscriber's `on_complete` runs after every buffered item has been
    /// delivered.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::ProtocolViolation`] if the stream was already
    /// terminated.
    pub fn complete(&self) -> Result<(), FlowError> {
        self.core.complete()
    }

    /// Signals failure with an opaque cause, forwarded as
    /// [`FlowError::Upstream`].
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::ProtocolViolation`] if the stream was already
    /// terminated.
    pub fn fail<E>(&self, error: E) -> Result<(), FlowError>
    where
        E: StdError + Send + Sync + 'static,
    {
        self.core.fail(FlowError::upstream(error))
    }

    /// Signals failure with a ready-made [`FlowError`].
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::ProtocolViolation`] if the stream was already
    /// terminated.
    pub fn fail_with(&self, error: FlowError) -> Result<(), FlowError> {
        self.core.fail(error)
    }

    /// Returns `true` if an item emitted now would be delivered without
    /// touching the overflow buffer's policy.
    #[must_use]
    pub fn has_demand(&self) -> bool {
        self.core.has_demand()
    }

    /// Returns the outstanding credit.
    #[must_use]
    pub fn requested(&self) -> Demand {
        self.subscription.requested()
    }

    /// Returns `true` once the consumer cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.subscription.is_cancelled()
    }

    /// Registers a hook to run when the consumer cancels.
    ///
    /// Runs immediately if the subscription is already cancelled. Hooks are
    /// discarded without running when the stream terminates normally.
    pub fn on_cancel<F>(&self, hook: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.core.on_cancel(Box::new(hook));
    }

    /// Returns the subscription's control handle.
    #[must_use]
    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }

    /// Returns the subscription's id.
    #[must_use]
    pub fn id(&self) -> SubscriptionId {
        self.subscription.id()
    }
}

impl<T> Drop for Producer<T> {
    fn drop(&mut self) {
        self.subscription.abandon();
    }
}

impl<T> fmt::Debug for Producer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer")
            .field("subscription", &self.subscription)
            .finish()
    }
}
