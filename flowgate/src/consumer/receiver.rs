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

//! Async receiver that requests in batches.

use super::Subscriber;
use crate::error::FlowError;
use crate::overflow::OverflowConfig;
use crate::subscription::{Producer, Signal, Subscription, subscribe};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::error::Elapsed;

#[cfg(feature = "observability")]
use tracing::trace;

/// Creates a flow whose items are read with [`SignalReceiver::recv`].
///
/// The receiver requests `batch` items up front and tops the window up by
/// `batch - batch / 4` every time that many items have been taken out, so
/// the producer never runs more than `batch` items ahead of the reader.
/// Items beyond that go to the overflow buffer described by `config`.
///
/// # Errors
///
/// Returns [`FlowError::InvalidConfiguration`] if `batch` is zero or
/// `config` is invalid.
///
/// # Example
///
/// ```rust
/// use flowgate::{OverflowConfig, channel};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), flowgate::FlowError> {
/// let (producer, mut receiver) = channel(OverflowConfig::buffer(16), 4)?;
///
/// tokio::spawn(async move {
///     for item in 0..10 {
///         producer.emit(item).unwrap();
///     }
///     producer.complete().unwrap();
/// });
///
/// let mut total = 0;
/// while let Some(item) = receiver.recv().await {
///     total += item?;
/// }
/// assert_eq!(total, 45);
/// # Ok(())
/// # }
/// ```
pub fn channel<T>(
    config: OverflowConfig,
    batch: usize,
) -> Result<(Producer<T>, SignalReceiver<T>), FlowError>
where
    T: Send + 'static,
{
    if batch == 0 {
        return Err(FlowError::invalid_configuration(
            "receiver batch must be greater than zero",
        ));
    }

    let (sender, receiver) = mpsc::unbounded_channel();
    let producer = subscribe(
        config,
        ChannelSubscriber {
            sender,
            batch: batch as u64,
        },
    )?;

    let receiver = SignalReceiver {
        receiver,
        subscription: producer.subscription().clone(),
        limit: batch - batch / 4,
        consumed: 0,
        done: false,
    };
    Ok((producer, receiver))
}

struct ChannelSubscriber<T> {
    sender: mpsc::UnboundedSender<Signal<T>>,
    batch: u64,
}

impl<T: Send> Subscriber<T> for ChannelSubscriber<T> {
    fn on_subscribe(&mut self, subscription: &Subscription) {
        subscription.request(self.batch);
    }

    fn on_item(&mut self, item: T) {
        let _ = self.sender.send(Signal::Item(item));
    }

    fn on_complete(&mut self) {
        let _ = self.sender.send(Signal::Complete);
    }

    fn on_error(&mut self, error: FlowError) {
        let _ = self.sender.send(Signal::Error(error));
    }
}

/// The reading side of [`channel`].
///
/// Dropping the receiver cancels the subscription.
#[derive(Debug)]
pub struct SignalReceiver<T> {
    receiver: mpsc::UnboundedReceiver<Signal<T>>,
    subscription: Subscription,
    limit: usize,
    consumed: usize,
    done: bool,
}

impl<T> SignalReceiver<T> {
    /// Receives the next item.
    ///
    /// Returns `Some(Ok(item))` for items, `Some(Err(error))` once if the
    /// stream failed, and `None` after completion or cancellation.
    pub async fn recv(&mut self) -> Option<Result<T, FlowError>> {
        if self.done {
            return None;
        }

        match self.receiver.recv().await {
            Some(Signal::Item(item)) => {
                self.replenish();
                Some(Ok(item))
            }
            Some(Signal::Error(error)) => {
                self.done = true;
                Some(Err(error))
            }
            Some(Signal::Complete) | None => {
                self.done = true;
                None
            }
        }
    }

    /// Like [`recv`](Self::recv), giving up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`Elapsed`] if nothing arrived in time. The receiver remains
    /// usable.
    pub async fn recv_timeout(
        &mut self,
        timeout: Duration,
    ) -> Result<Option<Result<T, FlowError>>, Elapsed> {
        tokio::time::timeout(timeout, self.recv()).await
    }

    /// Returns the subscription feeding this receiver.
    #[must_use]
    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }

    /// Stops the flow. Items already queued in the receiver are discarded.
    pub fn cancel(&mut self) {
        self.subscription.cancel();
        self.done = true;
    }

    /// Returns `true` once `recv` has returned the end of the stream.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.done
    }

    fn replenish(&mut self) {
        self.consumed += 1;
        if self.consumed < self.limit {
            return;
        }

        #[cfg(feature = "observability")]
        trace!(
            subscription_id = %self.subscription.id(),
            credit = self.consumed,
            "Replenishing receiver window"
        );

        self.subscription.request(self.consumed as u64);
        self.consumed = 0;
    }
}

impl<T> Drop for SignalReceiver<T> {
    fn drop(&mut self) {
        self.subscription.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demand::Demand;

    #[tokio::test]
    async fn test_receives_in_order() {
        let (producer, mut receiver) = channel(OverflowConfig::buffer(32), 8).unwrap();
        for item in 0..20 {
            producer.emit(item).unwrap();
        }
        producer.complete().unwrap();

        let mut seen = Vec::new();
        while let Some(item) = receiver.recv().await {
            seen.push(item.unwrap());
        }
        assert_eq!(seen, (0..20).collect::<Vec<_>>());
        assert!(receiver.is_terminated());
    }

    #[tokio::test]
    async fn test_window_replenishes_after_limit() {
        let (producer, mut receiver) = channel(OverflowConfig::buffer(32), 8).unwrap();
        assert_eq!(producer.requested(), Demand::Finite(8));

        for item in 0..8 {
            producer.emit(item).unwrap();
        }
        assert_eq!(producer.requested(), Demand::Finite(0));

        for _ in 0..5 {
            receiver.recv().await.unwrap().unwrap();
        }
        assert_eq!(producer.requested(), Demand::Finite(0));

        receiver.recv().await.unwrap().unwrap();
        assert_eq!(producer.requested(), Demand::Finite(6));
    }

    #[tokio::test]
    async fn test_error_is_yielded_once() {
        let (producer, mut receiver) = channel::<u8>(OverflowConfig::default(), 4).unwrap();
        producer.fail(std::io::Error::other("boom")).unwrap();

        assert!(receiver.recv().await.unwrap().unwrap_err().is_upstream());
        assert!(receiver.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_recv_timeout_elapses() {
        let (_producer, mut receiver) = channel::<u8>(OverflowConfig::default(), 4).unwrap();
        assert!(
            receiver
                .recv_timeout(Duration::from_millis(10))
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_dropped_producer_ends_stream() {
        let (producer, mut receiver) = channel(OverflowConfig::buffer(8), 4).unwrap();
        producer.emit(1).unwrap();
        drop(producer);

        assert_eq!(receiver.recv().await.unwrap().unwrap(), 1);
        let end = receiver.recv_timeout(Duration::from_millis(500)).await;
        assert!(end.unwrap().is_none());
        assert!(receiver.is_terminated());
    }

    #[tokio::test]
    async fn test_panicking_producer_fails_stream() {
        let (producer, mut receiver) = channel(OverflowConfig::buffer(8), 4).unwrap();
        let worker = std::thread::spawn(move || {
            producer.emit(7u8).unwrap();
            panic!("sensor read failed");
        });
        assert!(worker.join().is_err());

        assert_eq!(receiver.recv().await.unwrap().unwrap(), 7);
        let error = receiver.recv().await.unwrap().unwrap_err();
        assert!(error.is_protocol_violation());
        assert!(receiver.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_drop_cancels_producer() {
        let (producer, receiver) = channel::<u8>(OverflowConfig::default(), 4).unwrap();
        drop(receiver);
        assert!(producer.is_cancelled());
    }

    #[test]
    fn test_zero_batch_rejected() {
        let result = channel::<u8>(OverflowConfig::default(), 0);
        assert!(result.unwrap_err().is_invalid_configuration());
    }
}
