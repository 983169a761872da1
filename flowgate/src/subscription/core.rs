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

//! Shared subscription state and the delivery loop.
//!
//! Producer and consumer handles both point at one [`Core`]. Delivery is
//! serialized with a work-in-progress counter: whichever caller moves it
//! from zero becomes the only thread allowed to call the subscriber, and any
//! signal, request or cancel that arrives meanwhile just bumps the counter so
//! the owner loops once more. Nothing ever waits on another thread's user
//! code, and reentrant calls from inside a callback cannot recurse.

use super::signal::Emission;
use super::state::{StateCell, SubscriptionState};
use super::SubscriptionId;
use crate::consumer::Subscriber;
use crate::demand::{Demand, DemandCounter};
use crate::error::FlowError;
use crate::executor::Executor;
use crate::observability::FlowMetrics;
use crate::overflow::{Offer, OverflowBuffer, OverflowConfig};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

#[cfg(feature = "observability")]
use tracing::{debug, trace, warn};

/// Hook run once when the subscription is cancelled.
pub(crate) type CancelHook = Box<dyn FnOnce() + Send + 'static>;

/// Consumer-side operations, erased over the item type.
pub(crate) trait Control: Send + Sync {
    fn id(&self) -> SubscriptionId;
    fn request(&self, demand: Demand);
    fn cancel(&self);
    fn state(&self) -> SubscriptionState;
    fn requested(&self) -> Demand;
    fn buffered(&self) -> usize;
    fn config(&self) -> &OverflowConfig;
    fn metrics(&self) -> &FlowMetrics;
    /// Terminates the stream on behalf of a producer that went away without
    /// signalling. No-op once the producer has terminated or the consumer
    /// cancelled.
    fn abandon(&self);
}

enum Terminal {
    Complete,
    Error(FlowError),
}

enum Next<T> {
    Item(T),
    Terminal(Terminal),
}

/// Everything guarded by the queue lock. User code never runs while it is
/// held.
struct Queues<T> {
    /// Items that arrived without credit
    buffer: OverflowBuffer<T>,
    /// Items that consumed credit and await delivery, in order
    outbox: VecDeque<T>,
    /// Terminal signal waiting behind the items above
    terminal: Option<Terminal>,
    /// The producer has signalled complete or error (or overflowed)
    producer_done: bool,
    /// Hooks to run on cancel
    cancel_hooks: Vec<CancelHook>,
}

pub(crate) struct Core<T> {
    id: SubscriptionId,
    config: OverflowConfig,
    demand: DemandCounter,
    state: StateCell,
    queues: Mutex<Queues<T>>,
    /// Only the WIP owner locks this; `None` once resources are released
    subscriber: Mutex<Option<Box<dyn Subscriber<T>>>>,
    executor: Option<Arc<dyn Executor>>,
    wip: AtomicUsize,
    metrics: FlowMetrics,
    this: Weak<Core<T>>,
}

impl<T: Send + 'static> Core<T> {
    pub(crate) fn new(
        config: OverflowConfig,
        executor: Option<Arc<dyn Executor>>,
        subscriber: Box<dyn Subscriber<T>>,
    ) -> Result<Arc<Self>, FlowError> {
        let buffer = OverflowBuffer::from_config(&config)?;
        let id = SubscriptionId::new();

        #[cfg(feature = "observability")]
        debug!(
            subscription_id = %id,
            policy = %config.policy,
            capacity = %config.capacity,
            executor = executor.as_ref().map_or("caller", |e| e.name()),
            "Creating subscription"
        );

        Ok(Arc::new_cyclic(|this| Self {
            id,
            config,
            demand: DemandCounter::new(),
            state: StateCell::new(),
            queues: Mutex::new(Queues {
                buffer,
                outbox: VecDeque::new(),
                terminal: None,
                producer_done: false,
                cancel_hooks: Vec::new(),
            }),
            subscriber: Mutex::new(Some(subscriber)),
            executor,
            wip: AtomicUsize::new(0),
            metrics: FlowMetrics::new(),
            this: this.clone(),
        }))
    }

    /// Hands the subscriber its control handle.
    ///
    /// The subscriber is taken out of its slot for the call so that a cancel
    /// issued from inside `on_subscribe` cannot contend for it.
    pub(crate) fn start(&self, control: &super::Subscription) {
        let taken = self.subscriber.lock().take();
        if let Some(mut subscriber) = taken {
            subscriber.on_subscribe(control);
            if self.state.get().is_active() {
                *self.subscriber.lock() = Some(subscriber);
            }
        }
        self.schedule();
    }

    pub(crate) fn emit(&self, item: T) -> Result<Emission, FlowError> {
        if self.state.get() == SubscriptionState::Cancelled {
            self.metrics.record_dropped(1);
            return Ok(Emission::Cancelled);
        }

        let outcome = {
            let mut guard = self.queues.lock();
            let queues = &mut *guard;

            if queues.producer_done {
                return Err(FlowError::protocol_violation(
                    "item emitted after the stream was terminated",
                ));
            }

            // Credit granted but not yet drained must not push the new item
            // into a full buffer.
            queues.buffer.release_into(&self.demand, &mut queues.outbox);

            if queues.buffer.is_empty() && self.demand.try_consume() {
                queues.outbox.push_back(item);
                self.metrics.record_emitted();
                Ok(Emission::Emitted)
            } else {
                match queues.buffer.offer(item) {
                    Ok(Offer::Buffered) => {
                        self.metrics.record_buffered();
                        Ok(Emission::Buffered)
                    }
                    Ok(Offer::Evicted(_)) => {
                        self.metrics.record_buffered();
                        self.metrics.record_dropped(1);
                        Ok(Emission::Evicted)
                    }
                    Ok(Offer::Replaced(_)) => {
                        self.metrics.record_buffered();
                        self.metrics.record_dropped(1);
                        Ok(Emission::Replaced)
                    }
                    Ok(Offer::Rejected(_)) => {
                        self.metrics.record_dropped(1);
                        Ok(Emission::Dropped)
                    }
                    Err(error) => {
                        let discarded = queues.buffer.clear();
                        self.metrics.record_overflow();
                        self.metrics.record_dropped(discarded as u64 + 1);
                        queues.producer_done = true;
                        queues.terminal = Some(Terminal::Error(error.clone()));

                        #[cfg(feature = "observability")]
                        warn!(
                            subscription_id = %self.id,
                            policy = %self.config.policy,
                            capacity = %self.config.capacity,
                            discarded,
                            "Overflow, terminating subscription"
                        );

                        Err(error)
                    }
                }
            }
        };

        self.schedule();
        outcome
    }

    pub(crate) fn complete(&self) -> Result<(), FlowError> {
        self.finish(Terminal::Complete)
    }

    pub(crate) fn fail(&self, error: FlowError) -> Result<(), FlowError> {
        self.finish(Terminal::Error(error))
    }

    fn finish(&self, terminal: Terminal) -> Result<(), FlowError> {
        if self.state.get() == SubscriptionState::Cancelled {
            return Ok(());
        }

        {
            let mut queues = self.queues.lock();
            if queues.producer_done {
                return Err(FlowError::protocol_violation(
                    "terminal signal sent after the stream was terminated",
                ));
            }
            queues.producer_done = true;

            if matches!(terminal, Terminal::Error(_)) && !self.config.delay_error {
                let discarded = queues.buffer.clear();
                self.metrics.record_dropped(discarded as u64);
            }
            queues.terminal = Some(terminal);
        }

        #[cfg(feature = "observability")]
        debug!(subscription_id = %self.id, "Producer signalled termination");

        self.schedule();
        Ok(())
    }

    pub(crate) fn on_cancel(&self, hook: CancelHook) {
        {
            let mut queues = self.queues.lock();
            if self.state.get() != SubscriptionState::Cancelled {
                queues.cancel_hooks.push(hook);
                return;
            }
        }
        hook();
    }

    pub(crate) fn has_demand(&self) -> bool {
        self.state.get().is_active() && self.demand.has_demand()
    }

    /// Enters the delivery loop, or records missed work for the thread that
    /// is already in it.
    fn schedule(&self) {
        if self.wip.fetch_add(1, Ordering::AcqRel) != 0 {
            return;
        }

        match &self.executor {
            None => self.drain_loop(),
            Some(executor) => match self.this.upgrade() {
                Some(core) => executor.execute(Box::new(move || core.drain_loop())),
                None => self.wip.store(0, Ordering::Release),
            },
        }
    }

    fn drain_loop(&self) {
        let mut missed = 1;
        loop {
            self.drain_ready();

            let previous = self.wip.fetch_sub(missed, Ordering::AcqRel);
            missed = previous - missed;
            if missed == 0 {
                break;
            }
        }
    }

    fn drain_ready(&self) {
        loop {
            match self.state.get() {
                SubscriptionState::Active => {}
                SubscriptionState::Cancelled => {
                    self.release_resources();
                    return;
                }
                SubscriptionState::Completed | SubscriptionState::Errored => return,
            }

            match self.next_signal() {
                None => return,
                Some(Next::Item(item)) => self.deliver(item),
                Some(Next::Terminal(terminal)) => {
                    self.deliver_terminal(terminal);
                    return;
                }
            }
        }
    }

    fn next_signal(&self) -> Option<Next<T>> {
        let mut guard = self.queues.lock();
        let queues = &mut *guard;

        queues.buffer.release_into(&self.demand, &mut queues.outbox);

        if let Some(item) = queues.outbox.pop_front() {
            return Some(Next::Item(item));
        }
        if queues.buffer.is_empty() {
            return queues.terminal.take().map(Next::Terminal);
        }
        None
    }

    fn deliver(&self, item: T) {
        // A cancel racing with this check lets at most this one item through.
        if !self.state.get().is_active() {
            self.metrics.record_dropped(1);
            return;
        }

        let mut subscriber = self.subscriber.lock();
        if let Some(subscriber) = subscriber.as_mut() {
            subscriber.on_item(item);
            self.metrics.record_delivered();
        }
    }

    fn deliver_terminal(&self, terminal: Terminal) {
        let target = match terminal {
            Terminal::Complete => SubscriptionState::Completed,
            Terminal::Error(_) => SubscriptionState::Errored,
        };
        if !self.state.finish(target) {
            return;
        }
        self.demand.close();

        #[cfg(feature = "observability")]
        debug!(subscription_id = %self.id, state = %target, "Delivering terminal signal");

        let subscriber = self.subscriber.lock().take();
        if let Some(mut subscriber) = subscriber {
            match terminal {
                Terminal::Complete => subscriber.on_complete(),
                Terminal::Error(error) => subscriber.on_error(error),
            }
        }
        self.release_resources();
    }

    /// Drops everything still held. Only called by the WIP owner.
    fn release_resources(&self) {
        let (discarded, hooks) = {
            let mut queues = self.queues.lock();
            let discarded = queues.buffer.clear() + queues.outbox.len();
            queues.outbox.clear();
            queues.terminal = None;
            queues.producer_done = true;
            (discarded, std::mem::take(&mut queues.cancel_hooks))
        };
        self.metrics.record_dropped(discarded as u64);
        drop(hooks);

        let subscriber = self.subscriber.lock().take();
        drop(subscriber);
    }
}

impl<T: Send + 'static> Control for Core<T> {
    fn id(&self) -> SubscriptionId {
        self.id
    }

    fn request(&self, demand: Demand) {
        if !demand.has_demand() || !self.state.get().is_active() {
            return;
        }

        let current = self.demand.add(demand);
        match demand {
            Demand::Finite(credit) => self.metrics.record_requested(credit),
            Demand::Unbounded => self.metrics.record_unbounded_request(),
        }

        #[cfg(feature = "observability")]
        trace!(subscription_id = %self.id, requested = %demand, credit = %current, "Credit granted");
        #[cfg(not(feature = "observability"))]
        let _ = current;

        self.schedule();
    }

    fn cancel(&self) {
        if !self.state.finish(SubscriptionState::Cancelled) {
            return;
        }
        self.demand.close();
        self.metrics.record_cancelled();

        #[cfg(feature = "observability")]
        debug!(subscription_id = %self.id, "Subscription cancelled");

        let hooks = std::mem::take(&mut self.queues.lock().cancel_hooks);
        for hook in hooks {
            hook();
        }

        self.schedule();
    }

    fn state(&self) -> SubscriptionState {
        self.state.get()
    }

    fn requested(&self) -> Demand {
        self.demand.current()
    }

    fn buffered(&self) -> usize {
        self.queues.lock().buffer.len()
    }

    fn config(&self) -> &OverflowConfig {
        &self.config
    }

    fn metrics(&self) -> &FlowMetrics {
        &self.metrics
    }

    fn abandon(&self) {
        if self.queues.lock().producer_done {
            return;
        }

        let terminal = if std::thread::panicking() {
            Terminal::Error(FlowError::protocol_violation(
                "producer panicked before terminating the stream",
            ))
        } else {
            Terminal::Complete
        };

        #[cfg(feature = "observability")]
        debug!(subscription_id = %self.id, "Producer dropped without a terminal signal");

        // Losing a race with an explicit terminal signal is harmless here.
        let _ = self.finish(terminal);
    }
}
