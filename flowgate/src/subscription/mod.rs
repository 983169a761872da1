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

//! Subscriptions: the control channel between one producer and one consumer.
//!
//! A subscription is created by [`subscribe`] (delivery on the producer's or
//! requester's thread) or [`subscribe_on`] (delivery on an [`Executor`]).
//! It owns one [`DemandCounter`](crate::DemandCounter), one
//! [`OverflowBuffer`](crate::OverflowBuffer) and the subscriber, and splits
//! into two handles:
//!
//! - [`Producer`]: `emit`, `complete`, `fail`
//! - [`Subscription`]: `request`, `cancel`, handed to the subscriber in
//!   [`Subscriber::on_subscribe`]
//!
//! # Lifecycle
//!
//! ```text
//!            request(n)
//!            ┌────────┐
//!            ▼        │
//!         ┌──────────────┐   cancel()    ┌───────────┐
//!         │    Active    │──────────────▶│ Cancelled │
//!         └──────────────┘               └───────────┘
//!           │          │
//!  complete │          │ error / overflow
//!  delivered│          │ delivered
//!           ▼          ▼
//!    ┌───────────┐  ┌─────────┐
//!    │ Completed │  │ Errored │
//!    └───────────┘  └─────────┘
//! ```
//!
//! Completion waits for the buffer to drain. An error skips items that are
//! still waiting for credit unless
//! [`OverflowConfig::delay_error`](crate::OverflowConfig::delay_error) is set.
//!
//! # Example
//!
//! ```rust
//! use flowgate::{Emission, OverflowConfig, subscribe, testing::TestSubscriber};
//!
//! let subscriber = TestSubscriber::new();
//! let recorder = subscriber.recorder();
//! let producer = subscribe(OverflowConfig::buffer(8), subscriber).unwrap();
//!
//! // No credit yet: items wait in the buffer.
//! assert_eq!(producer.emit(1).unwrap(), Emission::Buffered);
//! assert_eq!(producer.emit(2).unwrap(), Emission::Buffered);
//! producer.complete().unwrap();
//! assert!(recorder.items().is_empty());
//!
//! recorder.request(2);
//! assert_eq!(recorder.items(), vec![1, 2]);
//! assert!(recorder.is_complete());
//! ```

mod core;
mod handle;
mod id;
mod producer;
mod signal;
mod state;

pub use handle::Subscription;
pub use id::SubscriptionId;
pub use producer::Producer;
pub use signal::{Emission, Signal};
pub use state::SubscriptionState;

use self::core::{Control, Core};
use crate::consumer::Subscriber;
use crate::error::FlowError;
use crate::executor::Executor;
use crate::overflow::OverflowConfig;
use std::sync::Arc;

/// Attaches `subscriber` to a new flow and returns its producer.
///
/// The subscriber's `on_subscribe` runs before this returns. Signals are
/// delivered on whichever thread emits or requests, one at a time.
///
/// # Errors
///
/// Returns [`FlowError::InvalidConfiguration`] if `config` is invalid.
pub fn subscribe<T, S>(config: OverflowConfig, subscriber: S) -> Result<Producer<T>, FlowError>
where
    T: Send + 'static,
    S: Subscriber<T> + 'static,
{
    attach(config, None, Box::new(subscriber))
}

/// Attaches `subscriber` to a new flow whose signals are delivered on
/// `executor`.
///
/// `emit` and `request` never run the subscriber themselves; they submit a
/// drain task when none is in flight.
///
/// # Errors
///
/// Returns [`FlowError::InvalidConfiguration`] if `config` is invalid.
pub fn subscribe_on<T, S>(
    config: OverflowConfig,
    executor: Arc<dyn Executor>,
    subscriber: S,
) -> Result<Producer<T>, FlowError>
where
    T: Send + 'static,
    S: Subscriber<T> + 'static,
{
    attach(config, Some(executor), Box::new(subscriber))
}

fn attach<T>(
    config: OverflowConfig,
    executor: Option<Arc<dyn Executor>>,
    subscriber: Box<dyn Subscriber<T>>,
) -> Result<Producer<T>, FlowError>
where
    T: Send + 'static,
{
    let core = Core::new(config, executor, subscriber)?;
    let control: Arc<dyn Control> = core.clone();
    let subscription = Subscription::new(control);
    core.start(&subscription);
    Ok(Producer::new(core, subscription))
}
