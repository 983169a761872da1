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

//! Metrics for subscriptions.
//!
//! Every subscription keeps its own [`FlowMetrics`]. Counters are atomic and
//! always available; when the `observability` feature is enabled each record
//! is also forwarded to the `metrics` crate under `flowgate.*` names so it
//! can be picked up by whatever recorder the application installed.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters describing the flow through one subscription.
///
/// # Examples
///
/// ```rust
/// use flowgate::observability::FlowMetrics;
///
/// let metrics = FlowMetrics::new();
/// metrics.record_requested(10);
/// metrics.record_emitted();
/// metrics.record_delivered();
///
/// let snapshot = metrics.snapshot();
/// assert_eq!(snapshot.requested, 10);
/// assert_eq!(snapshot.delivered, 1);
/// ```
#[derive(Debug, Default)]
pub struct FlowMetrics {
    /// Total finite credit granted
    requested: AtomicU64,
    /// Number of unbounded requests
    unbounded_requests: AtomicU64,
    /// Items that consumed credit on emission
    emitted: AtomicU64,
    /// Items parked in the overflow buffer
    buffered: AtomicU64,
    /// Items handed to the subscriber
    delivered: AtomicU64,
    /// Items discarded by the overflow policy or by cancellation
    dropped: AtomicU64,
    /// Overflow errors raised
    overflows: AtomicU64,
    /// Cancellations
    cancellations: AtomicU64,
}

/// Point-in-time copy of [`FlowMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlowMetricsSnapshot {
    /// Total finite credit granted
    pub requested: u64,
    /// Number of unbounded requests
    pub unbounded_requests: u64,
    /// Items that consumed credit on emission
    pub emitted: u64,
    /// Items parked in the overflow buffer
    pub buffered: u64,
    /// Items handed to the subscriber
    pub delivered: u64,
    /// Items discarded by the overflow policy or by cancellation
    pub dropped: u64,
    /// Overflow errors raised
    pub overflows: u64,
    /// Cancellations
    pub cancellations: u64,
}

impl FlowMetrics {
    /// Creates a new metrics tracker with zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records finite credit granted by the consumer.
    pub fn record_requested(&self, credit: u64) {
        self.requested.fetch_add(credit, Ordering::Relaxed);
        #[cfg(feature = "observability")]
        metrics::counter!("flowgate.demand.requested").increment(credit);
    }

    /// Records a request that disabled backpressure.
    pub fn record_unbounded_request(&self) {
        self.unbounded_requests.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "observability")]
        metrics::counter!("flowgate.demand.unbounded").increment(1);
    }

    /// Records an item that consumed credit when emitted.
    pub fn record_emitted(&self) {
        self.emitted.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "observability")]
        metrics::counter!("flowgate.items.emitted").increment(1);
    }

    /// Records an item parked in the overflow buffer.
    pub fn record_buffered(&self) {
        self.buffered.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "observability")]
        metrics::counter!("flowgate.items.buffered").increment(1);
    }

    /// Records an item handed to the subscriber.
    pub fn record_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "observability")]
        metrics::counter!("flowgate.items.delivered").increment(1);
    }

    /// Records items discarded without delivery.
    pub fn record_dropped(&self, count: u64) {
        if count == 0 {
            return;
        }
        self.dropped.fetch_add(count, Ordering::Relaxed);
        #[cfg(feature = "observability")]
        metrics::counter!("flowgate.items.dropped").increment(count);
    }

    /// Records an overflow error.
    pub fn record_overflow(&self) {
        self.overflows.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "observability")]
        metrics::counter!("flowgate.errors.overflow").increment(1);
    }

    /// Records a cancellation.
    pub fn record_cancelled(&self) {
        self.cancellations.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "observability")]
        metrics::counter!("flowgate.subscriptions.cancelled").increment(1);
    }

    /// Returns the total finite credit granted.
    #[must_use]
    pub fn total_requested(&self) -> u64 {
        self.requested.load(Ordering::Relaxed)
    }

    /// Returns the number of items that consumed credit on emission.
    #[must_use]
    pub fn total_emitted(&self) -> u64 {
        self.emitted.load(Ordering::Relaxed)
    }

    /// Returns the number of items handed to the subscriber.
    #[must_use]
    pub fn total_delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    /// Returns the number of items discarded without delivery.
    #[must_use]
    pub fn total_dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Returns the number of overflow errors raised.
    #[must_use]
    pub fn total_overflows(&self) -> u64 {
        self.overflows.load(Ordering::Relaxed)
    }

    /// Copies every counter.
    #[must_use]
    pub fn snapshot(&self) -> FlowMetricsSnapshot {
        FlowMetricsSnapshot {
            requested: self.requested.load(Ordering::Relaxed),
            unbounded_requests: self.unbounded_requests.load(Ordering::Relaxed),
            emitted: self.emitted.load(Ordering::Relaxed),
            buffered: self.buffered.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            overflows: self.overflows.load(Ordering::Relaxed),
            cancellations: self.cancellations.load(Ordering::Relaxed),
        }
    }

    /// Resets all counters to zero.
    pub fn reset(&self) {
        self.requested.store(0, Ordering::Relaxed);
        self.unbounded_requests.store(0, Ordering::Relaxed);
        self.emitted.store(0, Ordering::Relaxed);
        self.buffered.store(0, Ordering::Relaxed);
        self.delivered.store(0, Ordering::Relaxed);
        self.dropped.store(0, Ordering::Relaxed);
        self.overflows.store(0, Ordering::Relaxed);
        self.cancellations.store(0, Ordering::Relaxed);
    }
}
