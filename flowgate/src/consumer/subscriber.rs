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

//! The consumer capability interface.

use crate::error::FlowError;
use crate::subscription::Subscription;

/// Receiver of signals from one subscription.
///
/// A subscriber is a capability `{item, complete, error}` invoked by the
/// subscription on whichever context it delivers on. Calls into one
/// subscriber are never concurrent and never nested: while `on_item` runs,
/// a reentrant [`Subscription::request`] or [`Subscription::cancel`] is
/// recorded and acted upon after `on_item` returns.
///
/// At most one of [`on_complete`](Self::on_complete) and
/// [`on_error`](Self::on_error) is called, and nothing follows it.
///
/// # Example
///
/// ```rust
/// use flowgate::{FlowError, OverflowConfig, Subscriber, Subscription, subscribe};
///
/// struct OneAtATime {
///     subscription: Option<Subscription>,
///     seen: Vec<u32>,
/// }
///
/// impl Subscriber<u32> for OneAtATime {
///     fn on_subscribe(&mut self, subscription: &Subscription) {
///         subscription.request(1);
///         self.subscription = Some(subscription.clone());
///     }
///
///     fn on_item(&mut self, item: u32) {
///         self.seen.push(item);
///         if let Some(subscription) = &self.subscription {
///             subscription.request(1);
///         }
///     }
///
///     fn on_complete(&mut self) {}
///
///     fn on_error(&mut self, _error: FlowError) {}
/// }
///
/// let producer = subscribe(
///     OverflowConfig::error(),
///     OneAtATime { subscription: None, seen: Vec::new() },
/// )
/// .unwrap();
///
/// for item in 0..100 {
///     producer.emit(item).unwrap();
/// }
/// producer.complete().unwrap();
/// ```
pub trait Subscriber<T>: Send {
    /// Receives the control handle before any other signal.
    ///
    /// This is the place to issue the first [`Subscription::request`] and to
    /// keep a clone of the handle for later requests. Requesting nothing
    /// means "wait".
    fn on_subscribe(&mut self, subscription: &Subscription) {
        let _ = subscription;
    }

    /// Receives one item. Called at most as many times as credit was granted.
    fn on_item(&mut self, item: T);

    /// The producer finished; no further signal follows.
    fn on_complete(&mut self);

    /// The stream failed; no further signal follows.
    fn on_error(&mut self, error: FlowError);
}

impl<T, S> Subscriber<T> for Box<S>
where
    S: Subscriber<T> + ?Sized,
{
    fn on_subscribe(&mut self, subscription: &Subscription) {
        (**self).on_subscribe(subscription);
    }

    fn on_item(&mut self, item: T) {
        (**self).on_item(item);
    }

    fn on_complete(&mut self) {
        (**self).on_complete();
    }

    fn on_error(&mut self, error: FlowError) {
        (**self).on_error(error);
    }
}
