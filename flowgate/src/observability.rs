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

//! Observability support for flowgate.
//!
//! # Metrics
//!
//! Each subscription carries a [`FlowMetrics`] instance, reachable through
//! [`Subscription::metrics`](crate::Subscription::metrics). Counters use
//! relaxed atomics and cost a single `fetch_add` per record.
//!
//! ```rust
//! use flowgate::{OverflowConfig, subscribe, testing::TestSubscriber};
//!
//! let subscriber = TestSubscriber::with_initial_request(1);
//! let recorder = subscriber.recorder();
//! let producer = subscribe(OverflowConfig::buffer(4), subscriber).unwrap();
//!
//! producer.emit(1).unwrap();
//! producer.emit(2).unwrap();
//!
//! let snapshot = producer.subscription().metrics().snapshot();
//! assert_eq!(snapshot.delivered, 1);
//! assert_eq!(snapshot.buffered, 1);
//! assert_eq!(recorder.items(), vec![1]);
//! ```
//!
//! # Tracing
//!
//! With the `observability` feature enabled, subscription lifecycle events
//! (creation, requests, overflow, cancellation, terminal delivery) are
//! emitted as `tracing` events carrying a `subscription_id` field. Install
//! any subscriber to see them:
//!
//! ```rust,no_run
//! use tracing_subscriber::EnvFilter;
//!
//! tracing_subscriber::fmt()
//!     .with_env_filter(EnvFilter::from_default_env())
//!     .init();
//! ```
//!
//! ## Feature Flags
//!
//! - Disable `observability` to remove the `tracing` and `metrics` overhead
//! - Core counters remain available without the feature

mod metrics;

pub use metrics::{FlowMetrics, FlowMetricsSnapshot};
