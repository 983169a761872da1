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

use super::BridgeConfig;
use crate::consumer::Subscriber;
use crate::demand::DemandCounter;
use crate::error::FlowError;
use crate::executor::Executor;
use crate::overflow::OverflowConfig;
use crate::subscription::{Emission, Producer, Subscription, subscribe_on};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

#[cfg(feature = "observability")]
use tracing::{debug, warn};

/// Upstream subscription plus the credit the bridge has granted on it.
struct Upstream {
    subscription: OnceLock<Subscription>,
    window: DemandCounter,
    limit: u64,
    /// Items that have left the handoff: delivered, evicted, replaced or
    /// dropped. Every `limit` of them earns `limit` new upstream credit.
    retired: AtomicU64,
}

impl Upstream {
    fn cancel(&self) {
        if let Some(subscription) = self.subscription.get() {
            subscription.cancel();
        }
    }

    fn request(&self, credit: u64) {
        self.window.add(credit);
        if let Some(subscription) = self.subscription.get() {
            subscription.request(credit);
        }
    }

    /// Records one item leaving the handoff and replenishes upstream each
    /// time another `limit` items have left.
    fn retire(&self) {
        let retired = self.retired.fetch_add(1, Ordering::AcqRel) + 1;
        if retired % self.limit == 0 {
            self.request(self.limit);
        }
    }
}

/// Context-crossing stage with a bounded prefetch window.
///
/// # Example
///
/// ```rust
/// use flowgate::bridge::{Bridge, BridgeConfig};
/// use flowgate::executor::TokioExecutor;
/// use flowgate::{OverflowConfig, subscribe, testing::TestSubscriber};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), flowgate::FlowError> {
/// let subscriber = TestSubscriber::unbounded();
/// let recorder = subscriber.recorder();
///
/// let bridge = Bridge::new(
///     BridgeConfig::new(16),
///     Arc::new(TokioExecutor::current()),
///     OverflowConfig::buffer(16),
///     subscriber,
/// )?;
/// let producer = subscribe(OverflowConfig::buffer(1024), bridge)?;
///
/// for item in 0..100 {
///     producer.emit(item)?;
/// }
/// producer.complete()?;
///
/// assert!(recorder.await_terminal(Duration::from_secs(5)).await);
/// assert_eq!(recorder.items(), (0..100).collect::<Vec<_>>());
/// # Ok(())
/// # }
/// ```
pub struct Bridge<T> {
    config: BridgeConfig,
    downstream: Producer<T>,
    upstream: Arc<Upstream>,
    failed: bool,
}

impl<T: Send + 'static> Bridge<T> {
    /// Creates a bridge delivering to `subscriber` on `executor`.
    ///
    /// `downstream` governs the handoff buffer between the bridge and the
    /// subscriber; a capacity of at least `config.prefetch` guarantees the
    /// buffer never overflows. Lossy policies may hold fewer: items they
    /// evict or discard free their upstream credit just like delivered ones,
    /// so a slow subscriber sees the freshest items instead of stalling the
    /// flow. Errors are always delivered after the items that precede them.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::InvalidConfiguration`] if either configuration is
    /// invalid.
    pub fn new<S>(
        config: BridgeConfig,
        executor: Arc<dyn Executor>,
        downstream: OverflowConfig,
        subscriber: S,
    ) -> Result<Self, FlowError>
    where
        S: Subscriber<T> + 'static,
    {
        config.validate()?;

        let upstream = Arc::new(Upstream {
            subscription: OnceLock::new(),
            window: DemandCounter::new(),
            limit: config.limit() as u64,
            retired: AtomicU64::new(0),
        });

        let replenish = Replenish {
            inner: subscriber,
            upstream: Arc::clone(&upstream),
        };

        #[cfg(feature = "observability")]
        debug!(
            prefetch = config.prefetch,
            limit = config.limit(),
            executor = executor.name(),
            "Creating bridge"
        );

        let downstream = subscribe_on(downstream.with_delay_error(true), executor, replenish)?;

        let hook = Arc::clone(&upstream);
        downstream.on_cancel(move || hook.cancel());

        Ok(Self {
            config,
            downstream,
            upstream,
            failed: false,
        })
    }

    /// Creates a bridge with the default prefetch and a handoff buffer of the
    /// same size.
    ///
    /// # Errors
    ///
    /// Fails under the same conditions as [`new`](Self::new).
    pub fn with_defaults<S>(executor: Arc<dyn Executor>, subscriber: S) -> Result<Self, FlowError>
    where
        S: Subscriber<T> + 'static,
    {
        let config = BridgeConfig::default();
        Self::new(
            config,
            executor,
            OverflowConfig::buffer(config.prefetch),
            subscriber,
        )
    }

    /// Returns the bridge configuration.
    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Returns the downstream subscription.
    #[must_use]
    pub fn downstream(&self) -> &Subscription {
        self.downstream.subscription()
    }

    fn abort(&mut self, error: FlowError) {
        self.failed = true;
        self.upstream.cancel();
        if let Err(_rejected) = self.downstream.fail_with(error) {
            #[cfg(feature = "observability")]
            debug!(
                subscription_id = %self.downstream.id(),
                error = %_rejected,
                "Downstream already terminated"
            );
        }
    }
}

impl<T: Send + 'static> Subscriber<T> for Bridge<T> {
    fn on_subscribe(&mut self, subscription: &Subscription) {
        if self.upstream.subscription.set(subscription.clone()).is_err() {
            subscription.cancel();
            self.abort(FlowError::protocol_violation(
                "bridge subscribed to more than one upstream",
            ));
            return;
        }

        if self.downstream.is_cancelled() {
            subscription.cancel();
            return;
        }
        self.upstream.request(self.config.prefetch as u64);
    }

    fn on_item(&mut self, item: T) {
        if self.failed {
            return;
        }

        if !self.upstream.window.try_consume() {
            #[cfg(feature = "observability")]
            warn!(
                subscription_id = %self.downstream.id(),
                prefetch = self.config.prefetch,
                "Upstream sent more items than requested"
            );
            self.abort(FlowError::protocol_violation(
                "upstream emitted beyond the bridge's requested credit",
            ));
            return;
        }

        match self.downstream.emit(item) {
            Ok(Emission::Cancelled) => self.upstream.cancel(),
            Ok(Emission::Evicted | Emission::Replaced | Emission::Dropped) => {
                self.upstream.retire();
            }
            Ok(_) => {}
            Err(_error) => {
                // The downstream subscription has already errored itself.
                self.failed = true;
                self.upstream.cancel();

                #[cfg(feature = "observability")]
                warn!(
                    subscription_id = %self.downstream.id(),
                    error = %_error,
                    "Handoff buffer rejected item"
                );
            }
        }
    }

    fn on_complete(&mut self) {
        if !self.failed {
            let _ = self.downstream.complete();
        }
    }

    fn on_error(&mut self, error: FlowError) {
        if !self.failed {
            let _ = self.downstream.fail_with(error);
        }
    }
}

impl<T> fmt::Debug for Bridge<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bridge")
            .field("config", &self.config)
            .field("downstream", &self.downstream)
            .field("failed", &self.failed)
            .finish()
    }
}

/// Wraps the downstream subscriber and retires each delivered item.
struct Replenish<S> {
    inner: S,
    upstream: Arc<Upstream>,
}

impl<T, S> Subscriber<T> for Replenish<S>
where
    S: Subscriber<T>,
{
    fn on_subscribe(&mut self, subscription: &Subscription) {
        self.inner.on_subscribe(subscription);
    }

    fn on_item(&mut self, item: T) {
        self.inner.on_item(item);
        self.upstream.retire();
    }

    fn on_complete(&mut self) {
        self.inner.on_complete();
    }

    fn on_error(&mut self, error: FlowError) {
        self.inner.on_error(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demand::Demand;
    use crate::executor::InlineExecutor;
    use crate::subscription::subscribe;
    use crate::testing::{Recorder, TestSubscriber};

    fn inline() -> Arc<dyn Executor> {
        Arc::new(InlineExecutor)
    }

    #[test]
    fn test_requests_prefetch_upstream() {
        let bridge = Bridge::new(
            BridgeConfig::new(8),
            inline(),
            OverflowConfig::buffer(8),
            TestSubscriber::<u32>::new(),
        )
        .unwrap();
        let producer = subscribe(OverflowConfig::buffer(64), bridge).unwrap();
        assert_eq!(producer.requested(), Demand::Finite(8));
    }

    #[test]
    fn test_replenishes_after_limit_deliveries() {
        let subscriber = TestSubscriber::new();
        let recorder = subscriber.recorder();
        let bridge = Bridge::new(
            BridgeConfig::new(8),
            inline(),
            OverflowConfig::buffer(8),
            subscriber,
        )
        .unwrap();
        let producer = subscribe(OverflowConfig::buffer(64), bridge).unwrap();

        for item in 0..8 {
            assert_eq!(producer.emit(item).unwrap(), Emission::Emitted);
        }
        assert_eq!(producer.requested(), Demand::Finite(0));
        assert_eq!(producer.emit(8).unwrap(), Emission::Buffered);

        // Six deliveries complete one replenishment window.
        recorder.request(5);
        assert_eq!(producer.requested(), Demand::Finite(0));
        recorder.request(1);
        assert_eq!(recorder.items(), (0..6).collect::<Vec<_>>());
        // Six credits granted, one spent on the buffered item.
        assert_eq!(producer.requested(), Demand::Finite(5));
    }

    #[test]
    fn test_preserves_order_and_completion() {
        let subscriber = TestSubscriber::with_initial_request(1).request_per_item(1);
        let recorder = subscriber.recorder();
        let bridge = Bridge::new(
            BridgeConfig::new(4),
            inline(),
            OverflowConfig::buffer(4),
            subscriber,
        )
        .unwrap();
        let producer = subscribe(OverflowConfig::buffer(256), bridge).unwrap();

        for item in 0..200 {
            producer.emit(item).unwrap();
        }
        producer.complete().unwrap();

        assert_eq!(recorder.items(), (0..200).collect::<Vec<_>>());
        assert!(recorder.is_complete());
    }

    #[test]
    fn test_error_follows_handed_off_items() {
        let subscriber = TestSubscriber::new();
        let recorder = subscriber.recorder();
        let bridge = Bridge::new(
            BridgeConfig::new(4),
            inline(),
            OverflowConfig::buffer(4),
            subscriber,
        )
        .unwrap();
        let producer = subscribe(OverflowConfig::buffer(4), bridge).unwrap();

        producer.emit(1).unwrap();
        producer.emit(2).unwrap();
        producer.fail(std::io::Error::other("io failed")).unwrap();
        assert!(recorder.error().is_none());

        recorder.request(2);
        assert_eq!(recorder.items(), vec![1, 2]);
        assert!(recorder.error().unwrap().is_upstream());
    }

    #[test]
    fn test_credit_breach_is_protocol_violation() {
        let subscriber = TestSubscriber::unbounded();
        let recorder = subscriber.recorder();
        let mut bridge = Bridge::new(
            BridgeConfig::new(2),
            inline(),
            OverflowConfig::buffer(2),
            subscriber,
        )
        .unwrap();

        // Drive the bridge by hand, as a misbehaving upstream would.
        let upstream = subscribe(OverflowConfig::default(), TestSubscriber::<u8>::new()).unwrap();
        bridge.on_subscribe(upstream.subscription());
        assert_eq!(upstream.requested(), Demand::Finite(2));

        bridge.on_item(1);
        bridge.on_item(2);
        bridge.on_item(3);
        bridge.on_item(4);

        assert!(upstream.is_cancelled());
        assert_eq!(recorder.items(), vec![1, 2]);
        assert!(recorder.error().unwrap().is_protocol_violation());
        assert_eq!(recorder.terminal_count(), 1);
    }

    #[test]
    fn test_downstream_cancel_cancels_upstream() {
        let subscriber = TestSubscriber::unbounded().cancel_after(3);
        let recorder = subscriber.recorder();
        let bridge = Bridge::new(
            BridgeConfig::new(8),
            inline(),
            OverflowConfig::buffer(8),
            subscriber,
        )
        .unwrap();
        let producer = subscribe(OverflowConfig::buffer(8), bridge).unwrap();

        for item in 0..3 {
            producer.emit(item).unwrap();
        }
        assert!(producer.is_cancelled());
        assert_eq!(producer.emit(3).unwrap(), Emission::Cancelled);
        assert_eq!(recorder.items(), vec![0, 1, 2]);
    }

    /// Emits `count` items through a prefetch-8 bridge whose subscriber has
    /// not requested anything yet.
    fn saturate(downstream: OverflowConfig, count: u32) -> (Producer<u32>, Recorder<u32>) {
        let subscriber = TestSubscriber::new();
        let recorder = subscriber.recorder();
        let bridge = Bridge::new(
            BridgeConfig::new(8),
            inline(),
            downstream,
            subscriber,
        )
        .unwrap();
        let producer = subscribe(OverflowConfig::unbounded(), bridge).unwrap();
        for item in 0..count {
            assert!(producer.emit(item).unwrap().is_pending());
        }
        (producer, recorder)
    }

    #[test]
    fn test_drop_oldest_handoff_keeps_upstream_flowing() {
        let (producer, recorder) = saturate(OverflowConfig::drop_oldest(2), 100);
        assert_eq!(producer.subscription().buffered(), 0);
        assert!(producer.has_demand());

        recorder.request(1000);
        assert_eq!(recorder.items(), vec![98, 99]);

        producer.emit(100).unwrap();
        assert_eq!(recorder.items(), vec![98, 99, 100]);
    }

    #[test]
    fn test_drop_newest_handoff_keeps_upstream_flowing() {
        let (producer, recorder) = saturate(OverflowConfig::drop_newest(2), 100);
        assert_eq!(producer.subscription().buffered(), 0);

        recorder.request(1000);
        producer.emit(100).unwrap();
        assert_eq!(recorder.items(), vec![0, 1, 100]);
    }

    #[test]
    fn test_latest_handoff_delivers_freshest_then_completes() {
        let (producer, recorder) = saturate(OverflowConfig::latest(), 100);
        assert_eq!(producer.subscription().buffered(), 0);

        producer.complete().unwrap();
        assert!(!recorder.is_terminated());

        recorder.request(1);
        assert_eq!(recorder.items(), vec![99]);
        assert!(recorder.is_complete());
    }

    #[test]
    fn test_lossy_handoff_with_paced_subscriber() {
        let subscriber = TestSubscriber::with_initial_request(1).request_per_item(1);
        let recorder = subscriber.recorder();
        let bridge = Bridge::new(
            BridgeConfig::new(16),
            inline(),
            OverflowConfig::drop_oldest(1),
            subscriber,
        )
        .unwrap();
        let producer = subscribe(OverflowConfig::unbounded(), bridge).unwrap();

        for item in 0..500 {
            producer.emit(item).unwrap();
        }
        producer.complete().unwrap();

        // Inline delivery keeps up, so nothing is ever evicted.
        assert_eq!(recorder.items(), (0..500).collect::<Vec<_>>());
        assert!(recorder.is_complete());
        assert_eq!(producer.subscription().buffered(), 0);
    }

    #[test]
    fn test_undersized_buffer_handoff_overflows() {
        let (producer, recorder) = saturate(OverflowConfig::buffer(2), 2);
        assert!(producer.emit(2).unwrap().is_pending());

        assert!(producer.is_cancelled());
        assert_eq!(producer.emit(3).unwrap(), Emission::Cancelled);
        assert!(recorder.items().is_empty());
        assert!(recorder.error().unwrap().is_overflow());
        assert_eq!(recorder.terminal_count(), 1);
    }

    #[test]
    fn test_invalid_prefetch_rejected() {
        let result = Bridge::new(
            BridgeConfig::new(0),
            inline(),
            OverflowConfig::default(),
            TestSubscriber::<u8>::new(),
        );
        assert!(result.unwrap_err().is_invalid_configuration());
    }
}
