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

//! Lock-free demand counter.

use super::Demand;
use crate::error::FlowError;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

const UNBOUNDED: u64 = Demand::UNBOUNDED_RAW;

/// Thread-safe credit counter shared by a producer and its consumer.
///
/// All operations are non-blocking. Additions and consumptions are applied
/// with compare-and-swap, so no unit of credit is ever lost or counted twice
/// regardless of how many threads call [`add`](Self::add) and
/// [`try_consume`](Self::try_consume) concurrently.
///
/// # Examples
///
/// ```rust
/// use flowgate::demand::{Demand, DemandCounter};
///
/// let counter = DemandCounter::new();
/// assert_eq!(counter.add(3), Demand::Finite(3));
/// assert_eq!(counter.try_consume_many(5), 3);
/// assert_eq!(counter.current(), Demand::Finite(0));
/// ```
#[derive(Debug, Default)]
pub struct DemandCounter {
    /// Outstanding credit, `u64::MAX` once unbounded
    credit: AtomicU64,

    /// Set when the owning subscription has terminated
    closed: AtomicBool,
}

impl DemandCounter {
    /// Creates a counter with zero credit.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            credit: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        }
    }

    /// Creates a counter holding `initial` credit.
    #[must_use]
    pub fn with_initial(initial: impl Into<Demand>) -> Self {
        Self {
            credit: AtomicU64::new(initial.into().as_raw()),
            closed: AtomicBool::new(false),
        }
    }

    /// Adds credit and returns the resulting demand.
    ///
    /// The sum saturates into [`Demand::Unbounded`]. Adding zero, adding to an
    /// unbounded counter and adding to a closed counter leave it unchanged.
    /// Calls accumulate; `add` is not idempotent.
    pub fn add(&self, demand: impl Into<Demand>) -> Demand {
        let amount = demand.into().as_raw();
        if amount == 0 || self.is_closed() {
            return self.current();
        }

        match self
            .credit
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                if current == UNBOUNDED {
                    None
                } else {
                    Some(current.saturating_add(amount))
                }
            }) {
            Ok(previous) => Demand::from_raw(previous.saturating_add(amount)),
            Err(_) => Demand::Unbounded,
        }
    }

    /// Consumes a single unit of credit.
    ///
    /// Returns `false` without modifying the counter when no credit is left.
    /// Always succeeds on an unbounded counter.
    #[must_use]
    pub fn try_consume(&self) -> bool {
        match self
            .credit
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                if current == 0 || current == UNBOUNDED {
                    None
                } else {
                    Some(current - 1)
                }
            }) {
            Ok(_) => true,
            Err(current) => current == UNBOUNDED,
        }
    }

    /// Consumes up to `amount` units and returns how many were taken.
    #[must_use]
    pub fn try_consume_many(&self, amount: u64) -> u64 {
        if amount == 0 {
            return 0;
        }

        match self
            .credit
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                if current == 0 || current == UNBOUNDED {
                    None
                } else {
                    Some(current - current.min(amount))
                }
            }) {
            Ok(previous) => previous.min(amount),
            Err(UNBOUNDED) => amount,
            Err(_) => 0,
        }
    }

    /// Consumes exactly `amount` units.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::ProtocolViolation`] when less than `amount` credit
    /// is available. Nothing is deducted in that case.
    pub fn consume(&self, amount: u64) -> Result<(), FlowError> {
        match self
            .credit
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                if current == UNBOUNDED {
                    None
                } else {
                    current.checked_sub(amount)
                }
            }) {
            Ok(_) | Err(UNBOUNDED) => Ok(()),
            Err(available) => Err(FlowError::protocol_violation(format!(
                "cannot consume {} credits, only {} available",
                amount, available
            ))),
        }
    }

    /// Returns the raw outstanding credit (`u64::MAX` when unbounded).
    #[must_use]
    pub fn available(&self) -> u64 {
        self.credit.load(Ordering::Acquire)
    }

    /// Returns the outstanding credit as a [`Demand`].
    #[must_use]
    pub fn current(&self) -> Demand {
        Demand::from_raw(self.available())
    }

    /// Returns `true` if backpressure has been disabled.
    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        self.available() == UNBOUNDED
    }

    /// Returns `true` if at least one item may be pushed.
    #[must_use]
    pub fn has_demand(&self) -> bool {
        self.available() > 0
    }

    /// Stops accepting credit. Subsequent [`add`](Self::add) calls are no-ops.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    /// Returns `true` once [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_new_starts_empty() {
        let counter = DemandCounter::new();
        assert_eq!(counter.available(), 0);
        assert!(!counter.has_demand());
        assert!(!counter.try_consume());
    }

    #[test]
    fn test_add_accumulates() {
        let counter = DemandCounter::new();
        assert_eq!(counter.add(2), Demand::Finite(2));
        assert_eq!(counter.add(3), Demand::Finite(5));
        assert_eq!(counter.add(0), Demand::Finite(5));
    }

    #[test]
    fn test_add_saturates_to_unbounded() {
        let counter = DemandCounter::with_initial(u64::MAX - 2);
        assert_eq!(counter.add(10), Demand::Unbounded);
        assert!(counter.is_unbounded());
    }

    #[test]
    fn test_unbounded_is_permanent() {
        let counter = DemandCounter::new();
        counter.add(Demand::Unbounded);
        for _ in 0..1_000 {
            assert!(counter.try_consume());
        }
        assert_eq!(counter.add(5), Demand::Unbounded);
        assert!(counter.consume(1_000_000).is_ok());
        assert!(counter.is_unbounded());
    }

    #[test]
    fn test_try_consume_stops_at_zero() {
        let counter = DemandCounter::with_initial(2);
        assert!(counter.try_consume());
        assert!(counter.try_consume());
        assert!(!counter.try_consume());
        assert_eq!(counter.available(), 0);
    }

    #[test]
    fn test_try_consume_many() {
        let counter = DemandCounter::with_initial(5);
        assert_eq!(counter.try_consume_many(3), 3);
        assert_eq!(counter.try_consume_many(3), 2);
        assert_eq!(counter.try_consume_many(3), 0);
        assert_eq!(counter.try_consume_many(0), 0);
    }

    #[test]
    fn test_consume_refuses_to_go_negative() {
        let counter = DemandCounter::with_initial(2);
        let error = counter.consume(3).unwrap_err();
        assert!(error.is_protocol_violation());
        assert_eq!(counter.available(), 2);
        assert!(counter.consume(2).is_ok());
        assert_eq!(counter.available(), 0);
    }

    #[test]
    fn test_closed_counter_ignores_add() {
        let counter = DemandCounter::with_initial(1);
        counter.close();
        assert!(counter.is_closed());
        assert_eq!(counter.add(10), Demand::Finite(1));
        assert_eq!(counter.add(Demand::Unbounded), Demand::Finite(1));
    }

    #[test]
    fn test_concurrent_add_and_consume_conserve_credit() {
        let counter = Arc::new(DemandCounter::new());
        let mut handles = vec![];

        for _ in 0..4 {
            let counter = Arc::clone(&counter);
            handles.push(thread::spawn(move || {
                for _ in 0..10_000 {
                    counter.add(1);
                }
            }));
        }

        let mut consumers = vec![];
        for _ in 0..4 {
            let counter = Arc::clone(&counter);
            consumers.push(thread::spawn(move || {
                let mut taken = 0_u64;
                for _ in 0..20_000 {
                    if counter.try_consume() {
                        taken += 1;
                    }
                }
                taken
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }
        let consumed: u64 = consumers.into_iter().map(|h| h.join().unwrap()).sum();

        assert_eq!(consumed + counter.available(), 40_000);
    }
}
