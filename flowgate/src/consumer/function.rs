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

//! Closure-backed subscriber.

use super::Subscriber;
use crate::demand::Demand;
use crate::error::FlowError;
use crate::subscription::Subscription;
use std::fmt;

type ItemFn<T> = Box<dyn FnMut(T, &Subscription) + Send>;
type CompleteFn = Box<dyn FnOnce() + Send>;
type ErrorFn = Box<dyn FnOnce(FlowError) + Send>;

/// A [`Subscriber`] assembled from closures.
///
/// The item closure receives the subscription handle so it can request more
/// or cancel.
///
/// # Example
///
/// ```rust
/// use flowgate::{FnSubscriber, OverflowConfig, subscribe};
/// use std::sync::{Arc, Mutex};
///
/// let total = Arc::new(Mutex::new(0u64));
/// let sum = Arc::clone(&total);
///
/// let subscriber = FnSubscriber::new(move |item: u64, subscription| {
///     *sum.lock().unwrap() += item;
///     subscription.request(1);
/// })
/// .with_initial_request(1);
///
/// let producer = subscribe(OverflowConfig::error(), subscriber).unwrap();
/// for item in 1..=10 {
///     producer.emit(item).unwrap();
/// }
/// assert_eq!(*total.lock().unwrap(), 55);
/// ```
pub struct FnSubscriber<T> {
    initial: Demand,
    subscription: Option<Subscription>,
    on_item: ItemFn<T>,
    on_complete: Option<CompleteFn>,
    on_error: Option<ErrorFn>,
}

impl<T> FnSubscriber<T> {
    /// Creates a subscriber that passes items to `on_item` and requests
    /// nothing up front.
    pub fn new<F>(on_item: F) -> Self
    where
        F: FnMut(T, &Subscription) + Send + 'static,
    {
        Self {
            initial: Demand::NONE,
            subscription: None,
            on_item: Box::new(on_item),
            on_complete: None,
            on_error: None,
        }
    }

    /// Requests `demand` as soon as the subscription starts.
    #[must_use]
    pub fn with_initial_request(mut self, demand: impl Into<Demand>) -> Self {
        self.initial = demand.into();
        self
    }

    /// Runs `on_complete` when the stream completes.
    #[must_use]
    pub fn on_complete<F>(mut self, on_complete: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.on_complete = Some(Box::new(on_complete));
        self
    }

    /// Runs `on_error` when the stream fails.
    #[must_use]
    pub fn on_error<F>(mut self, on_error: F) -> Self
    where
        F: FnOnce(FlowError) + Send + 'static,
    {
        self.on_error = Some(Box::new(on_error));
        self
    }
}

impl<T> Subscriber<T> for FnSubscriber<T> {
    fn on_subscribe(&mut self, subscription: &Subscription) {
        self.subscription = Some(subscription.clone());
        subscription.request(self.initial);
    }

    fn on_item(&mut self, item: T) {
        if let Some(subscription) = &self.subscription {
            (self.on_item)(item, subscription);
        }
    }

    fn on_complete(&mut self) {
        self.subscription = None;
        if let Some(on_complete) = self.on_complete.take() {
            on_complete();
        }
    }

    fn on_error(&mut self, error: FlowError) {
        self.subscription = None;
        if let Some(on_error) = self.on_error.take() {
            on_error(error);
        }
    }
}

impl<T> fmt::Debug for FnSubscriber<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSubscriber")
            .field("initial", &self.initial)
            .field("subscription", &self.subscription)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overflow::OverflowConfig;
    use crate::subscribe;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_closures_receive_signals() {
        let items = Arc::new(Mutex::new(Vec::new()));
        let completed = Arc::new(Mutex::new(false));

        let seen = Arc::clone(&items);
        let done = Arc::clone(&completed);
        let subscriber = FnSubscriber::new(move |item: &'static str, _: &Subscription| {
            seen.lock().push(item);
        })
        .with_initial_request(Demand::Unbounded)
        .on_complete(move || *done.lock() = true);

        let producer = subscribe(OverflowConfig::default(), subscriber).unwrap();
        producer.emit("left").unwrap();
        producer.emit("right").unwrap();
        producer.complete().unwrap();

        assert_eq!(*items.lock(), vec!["left", "right"]);
        assert!(*completed.lock());
    }

    #[test]
    fn test_error_closure() {
        let failure = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&failure);
        let subscriber = FnSubscriber::new(|_: u8, _: &Subscription| {})
            .on_error(move |error| *slot.lock() = Some(error));

        let producer = subscribe(OverflowConfig::error(), subscriber).unwrap();
        assert!(producer.emit(1).is_err());

        assert!(failure.lock().as_ref().unwrap().is_overflow());
    }

    #[test]
    fn test_cancel_from_item_closure() {
        let subscriber = FnSubscriber::new(|_: u32, subscription: &Subscription| {
            subscription.cancel();
        })
        .with_initial_request(10);

        let producer = subscribe(OverflowConfig::default(), subscriber).unwrap();
        producer.emit(1).unwrap();
        assert!(producer.is_cancelled());
    }
}
