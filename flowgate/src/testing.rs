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

//! Test helpers for code built on flowgate.
//!
//! [`TestSubscriber`] records every signal it receives into a shared
//! [`Recorder`] and can be told how much credit to grant and when to cancel.
//! The recorder stays usable after the subscriber has been moved into a
//! subscription.
//!
//! ```rust
//! use flowgate::{OverflowConfig, subscribe, testing::TestSubscriber};
//!
//! let subscriber = TestSubscriber::with_initial_request(1).request_per_item(1);
//! let recorder = subscriber.recorder();
//! let producer = subscribe(OverflowConfig::error(), subscriber).unwrap();
//!
//! for item in ["x", "y", "z"] {
//!     producer.emit(item).unwrap();
//! }
//! producer.complete().unwrap();
//!
//! assert_eq!(recorder.items(), vec!["x", "y", "z"]);
//! assert!(recorder.is_complete());
//! ```

use crate::consumer::Subscriber;
use crate::demand::Demand;
use crate::error::FlowError;
use crate::subscription::{Signal, Subscription};
use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

struct Shared<T> {
    signals: Mutex<Vec<Signal<T>>>,
    subscription: OnceLock<Subscription>,
}

/// Shared view of the signals a [`TestSubscriber`] received.
pub struct Recorder<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Recorder<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> Recorder<T> {
    fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                signals: Mutex::new(Vec::new()),
                subscription: OnceLock::new(),
            }),
        }
    }

    fn push(&self, signal: Signal<T>) {
        self.shared.signals.lock().push(signal);
    }

    /// Returns the subscription handle, once `on_subscribe` has run.
    #[must_use]
    pub fn subscription(&self) -> Option<&Subscription> {
        self.shared.subscription.get()
    }

    /// Requests more items through the recorded subscription.
    ///
    /// Does nothing if the subscriber was never subscribed.
    pub fn request(&self, demand: impl Into<Demand>) {
        if let Some(subscription) = self.subscription() {
            subscription.request(demand);
        }
    }

    /// Cancels the recorded subscription.
    pub fn cancel(&self) {
        if let Some(subscription) = self.subscription() {
            subscription.cancel();
        }
    }

    /// Returns the number of items received.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.shared
            .signals
            .lock()
            .iter()
            .filter(|signal| matches!(signal, Signal::Item(_)))
            .count()
    }

    /// Returns the number of terminal signals received. Never more than one
    /// for a well-behaved subscription.
    #[must_use]
    pub fn terminal_count(&self) -> usize {
        self.shared
            .signals
            .lock()
            .iter()
            .filter(|signal| signal.is_terminal())
            .count()
    }

    /// Returns `true` if `on_complete` was called.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.shared
            .signals
            .lock()
            .iter()
            .any(|signal| matches!(signal, Signal::Complete))
    }

    /// Returns `true` if a terminal signal was received.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.terminal_count() > 0
    }

    /// Returns the error passed to `on_error`, if any.
    #[must_use]
    pub fn error(&self) -> Option<FlowError> {
        self.shared.signals.lock().iter().find_map(|signal| match signal {
            Signal::Error(error) => Some(error.clone()),
            _ => None,
        })
    }

    /// Waits until a terminal signal arrives, polling every millisecond.
    ///
    /// Returns `false` if `timeout` elapsed first.
    pub async fn await_terminal(&self, timeout: Duration) -> bool {
        self.await_condition(timeout, |recorder| recorder.is_terminated())
            .await
    }

    /// Waits until at least `count` items arrived.
    ///
    /// Returns `false` if `timeout` elapsed first.
    pub async fn await_items(&self, count: usize, timeout: Duration) -> bool {
        self.await_condition(timeout, |recorder| recorder.item_count() >= count)
            .await
    }

    async fn await_condition<F>(&self, timeout: Duration, condition: F) -> bool
    where
        F: Fn(&Self) -> bool,
    {
        let polling = async {
            while !condition(self) {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        };
        tokio::time::timeout(timeout, polling).await.is_ok()
    }
}

impl<T: Clone> Recorder<T> {
    /// Returns a copy of every signal received, in order.
    #[must_use]
    pub fn signals(&self) -> Vec<Signal<T>> {
        self.shared.signals.lock().clone()
    }

    /// Returns a copy of the items received, in order.
    #[must_use]
    pub fn items(&self) -> Vec<T> {
        self.shared
            .signals
            .lock()
            .iter()
            .filter_map(|signal| match signal {
                Signal::Item(item) => Some(item.clone()),
                _ => None,
            })
            .collect()
    }
}

impl<T> fmt::Debug for Recorder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recorder")
            .field("items", &self.item_count())
            .field("terminated", &self.is_terminated())
            .finish()
    }
}

/// A [`Subscriber`] that records everything and follows a scripted demand
/// pattern.
pub struct TestSubscriber<T> {
    initial: Demand,
    per_item: u64,
    cancel_after: Option<usize>,
    received: usize,
    recorder: Recorder<T>,
}

impl<T> TestSubscriber<T> {
    /// Creates a subscriber that requests nothing on its own.
    #[must_use]
    pub fn new() -> Self {
        Self::with_initial_request(Demand::NONE)
    }

    /// Creates a subscriber that requests `demand` in `on_subscribe`.
    #[must_use]
    pub fn with_initial_request(demand: impl Into<Demand>) -> Self {
        Self {
            initial: demand.into(),
            per_item: 0,
            cancel_after: None,
            received: 0,
            recorder: Recorder::new(),
        }
    }

    /// Creates a subscriber that requests unbounded demand.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::with_initial_request(Demand::Unbounded)
    }

    /// Requests `credit` more items from inside every `on_item`.
    #[must_use]
    pub fn request_per_item(mut self, credit: u64) -> Self {
        self.per_item = credit;
        self
    }

    /// Cancels from inside `on_item` once `count` items were received.
    #[must_use]
    pub fn cancel_after(mut self, count: usize) -> Self {
        self.cancel_after = Some(count);
        self
    }

    /// Returns a handle to this subscriber's recorded signals.
    #[must_use]
    pub fn recorder(&self) -> Recorder<T> {
        self.recorder.clone()
    }
}

impl<T> Default for TestSubscriber<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send> Subscriber<T> for TestSubscriber<T> {
    fn on_subscribe(&mut self, subscription: &Subscription) {
        let _ = self.recorder.shared.subscription.set(subscription.clone());
        subscription.request(self.initial);
    }

    fn on_item(&mut self, item: T) {
        self.recorder.push(Signal::Item(item));
        self.received += 1;

        if self.cancel_after.is_some_and(|limit| self.received >= limit) {
            self.recorder.cancel();
        } else if self.per_item > 0 {
            self.recorder.request(self.per_item);
        }
    }

    fn on_complete(&mut self) {
        self.recorder.push(Signal::Complete);
    }

    fn on_error(&mut self, error: FlowError) {
        self.recorder.push(Signal::Error(error));
    }
}

impl<T> fmt::Debug for TestSubscriber<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestSubscriber")
            .field("initial", &self.initial)
            .field("per_item", &self.per_item)
            .field("cancel_after", &self.cancel_after)
            .finish_non_exhaustive()
    }
}
