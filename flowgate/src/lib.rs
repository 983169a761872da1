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

#![doc = include_str!("../../README.md")]
#![allow(clippy::module_inception)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

//! # flowgate - Credit-Based Backpressure
//!
//! flowgate is the flow-control core of a push-based pipeline. A slow
//! consumer regulates a fast producer by granting **demand credit**, and
//! items produced while no credit exists are absorbed by an **overflow
//! buffer** governed by an [`OverflowPolicy`].
//!
//! - **Credit accounting**: lock-free [`DemandCounter`], unbounded opt-out
//! - **Overflow policies**: `Error`, `Buffer`, `DropNewest`, `DropOldest`, `Latest`
//! - **Serialized delivery**: one signal at a time, reentrant-safe callbacks
//! - **Context crossing**: [`Bridge`] relays a flow onto an [`Executor`]
//!   with a bounded prefetch window
//! - **Observability**: per-subscription [`FlowMetrics`], optional `tracing`
//!   and `metrics` integration
//!
//! ## Architecture
//!
//! - **[`demand`]**: credit counter and the `Demand` view of it
//! - **[`overflow`]**: policies, capacities and the overflow buffer
//! - **[`subscription`]**: producer and consumer handles, the delivery loop
//! - **[`consumer`]**: the [`Subscriber`] trait and ready-made consumers
//! - **[`bridge`]**: context-crossing stage
//! - **[`executor`]**: the execution-context seam
//! - **[`observability`]**: metrics and tracing
//! - **[`testing`]**: recording subscriber for tests
//!
//! ## Quick Start
//!
//! ```rust
//! use flowgate::{Emission, OverflowConfig, subscribe, testing::TestSubscriber};
//!
//! // A consumer that only asked for two items, and a policy that refuses
//! // anything it did not ask for.
//! let subscriber = TestSubscriber::with_initial_request(2);
//! let recorder = subscriber.recorder();
//! let producer = subscribe(OverflowConfig::error(), subscriber).unwrap();
//!
//! assert_eq!(producer.emit(1).unwrap(), Emission::Emitted);
//! assert_eq!(producer.emit(2).unwrap(), Emission::Emitted);
//! assert!(producer.emit(3).unwrap_err().is_overflow());
//!
//! assert_eq!(recorder.items(), vec![1, 2]);
//! ```
//!
//! ## Features
//!
//! - **`serde`** (default): (de)serialize [`OverflowConfig`] and [`BridgeConfig`]
//! - **`observability`**: emit `tracing` events and `metrics` counters
//!
//! ## Error Handling
//!
//! Every failure is a [`FlowError`]. Errors are local to one subscription:
//! an overflow or upstream failure terminates that subscription and nothing
//! else.
//!
//! ## Safety
//!
//! flowgate is written in 100% safe Rust with `#![deny(unsafe_code)]`.

pub mod bridge;
pub mod consumer;
pub mod demand;
pub mod error;
pub mod executor;
pub mod observability;
pub mod overflow;
pub mod subscription;
pub mod testing;

pub use bridge::{Bridge, BridgeConfig};
pub use consumer::{FnSubscriber, SignalReceiver, Subscriber, channel};
pub use demand::{Demand, DemandCounter};
pub use error::FlowError;
pub use executor::{Executor, InlineExecutor, TokioExecutor};
pub use observability::{FlowMetrics, FlowMetricsSnapshot};
pub use overflow::{Capacity, Offer, OverflowBuffer, OverflowConfig, OverflowPolicy};
pub use subscription::{
    Emission, Producer, Signal, Subscription, SubscriptionId, SubscriptionState, subscribe,
    subscribe_on,
};
