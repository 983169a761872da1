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

//! Policy-dispatching overflow buffer.

use super::{Capacity, OverflowConfig, OverflowPolicy};
use crate::demand::DemandCounter;
use crate::error::FlowError;
use std::collections::VecDeque;
use std::collections::vec_deque;

/// Outcome of a successful [`OverflowBuffer::offer`].
///
/// Items displaced by the policy are handed back so the caller can account
/// for them.
#[derive(Debug, PartialEq, Eq)]
#[must_use]
pub enum Offer<T> {
    /// The item was appended.
    Buffered,

    /// The item was appended after evicting the returned head.
    Evicted(T),

    /// The item replaced the returned held item.
    Replaced(T),

    /// The buffer was full; the returned incoming item was discarded.
    Rejected(T),
}

impl<T> Offer<T> {
    /// Returns `true` if the offered item is now held by the buffer.
    #[must_use]
    pub const fn is_held(&self) -> bool {
        !matches!(self, Self::Rejected(_))
    }

    /// Returns `true` if an item was lost as a consequence of the offer.
    #[must_use]
    pub const fn lost_item(&self) -> bool {
        !matches!(self, Self::Buffered)
    }
}

/// Ordered holding area for items that arrived without credit.
///
/// The buffer itself is not synchronized; the owning subscription guards it
/// so that an offer never interleaves with a release.
///
/// # Examples
///
/// ```rust
/// use flowgate::overflow::{Capacity, Offer, OverflowBuffer, OverflowPolicy};
///
/// let mut buffer = OverflowBuffer::new(OverflowPolicy::Latest, Capacity::Unbounded).unwrap();
/// assert_eq!(buffer.offer('a').unwrap(), Offer::Buffered);
/// assert_eq!(buffer.offer('b').unwrap(), Offer::Replaced('a'));
/// assert_eq!(buffer.poll(), Some('b'));
/// ```
#[derive(Debug)]
pub struct OverflowBuffer<T> {
    /// Policy applied when the buffer is full
    policy: OverflowPolicy,

    /// Capacity enforced for the policy
    capacity: Capacity,

    /// Pending items in arrival order
    items: VecDeque<T>,
}

impl<T> OverflowBuffer<T> {
    /// Largest preallocation made for a bounded buffer.
    const PREALLOCATE_LIMIT: usize = 256;

    /// Creates a buffer for the given policy and capacity.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::InvalidConfiguration`] when a buffering policy is
    /// given a zero capacity.
    pub fn new(policy: OverflowPolicy, capacity: Capacity) -> Result<Self, FlowError> {
        Self::from_config(&OverflowConfig::new(policy, capacity))
    }

    /// Creates a buffer from a subscription configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::InvalidConfiguration`] when the configuration
    /// does not validate.
    pub fn from_config(config: &OverflowConfig) -> Result<Self, FlowError> {
        config.validate()?;
        let capacity = config.effective_capacity();
        let preallocate = capacity.limit().unwrap_or(0).min(Self::PREALLOCATE_LIMIT);

        Ok(Self {
            policy: config.policy,
            capacity,
            items: VecDeque::with_capacity(preallocate),
        })
    }

    /// Offers an item that could not be delivered for lack of credit.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::Overflow`] under [`OverflowPolicy::Error`], and
    /// under [`OverflowPolicy::Buffer`] when the buffer is already full. The
    /// rejected item is dropped.
    pub fn offer(&mut self, item: T) -> Result<Offer<T>, FlowError> {
        if self.capacity.has_room(self.items.len()) {
            self.items.push_back(item);
            return Ok(Offer::Buffered);
        }

        match self.policy {
            OverflowPolicy::Error | OverflowPolicy::Buffer => Err(self.overflow()),
            OverflowPolicy::DropNewest => Ok(Offer::Rejected(item)),
            OverflowPolicy::DropOldest => match self.items.pop_front() {
                Some(evicted) => {
                    self.items.push_back(item);
                    Ok(Offer::Evicted(evicted))
                }
                None => Ok(Offer::Rejected(item)),
            },
            OverflowPolicy::Latest => match self.items.pop_front() {
                Some(replaced) => {
                    self.items.push_back(item);
                    Ok(Offer::Replaced(replaced))
                }
                None => Ok(Offer::Rejected(item)),
            },
        }
    }

    /// Removes and returns the oldest item.
    pub fn poll(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    /// Moves as many items as `demand` allows into `out`, oldest first.
    ///
    /// One unit of credit is consumed per moved item. Returns the number of
    /// items moved.
    pub fn release_into(&mut self, demand: &DemandCounter, out: &mut VecDeque<T>) -> usize {
        let mut released = 0;
        while !self.items.is_empty() && demand.try_consume() {
            if let Some(item) = self.items.pop_front() {
                out.push_back(item);
                released += 1;
            }
        }
        released
    }

    /// Removes and returns as many items as `demand` allows, oldest first.
    pub fn release(&mut self, demand: &DemandCounter) -> Vec<T> {
        let mut out = VecDeque::new();
        self.release_into(demand, &mut out);
        out.into()
    }

    /// Discards every held item and returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.items.len();
        self.items.clear();
        dropped
    }

    /// Returns an iterator over held items, oldest first.
    pub fn iter(&self) -> vec_deque::Iter<'_, T> {
        self.items.iter()
    }

    /// Returns the number of held items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if nothing is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns `true` if the next offer will trigger the policy.
    #[must_use]
    pub fn is_full(&self) -> bool {
        !self.capacity.has_room(self.items.len())
    }

    /// Returns the enforced capacity.
    #[must_use]
    pub const fn capacity(&self) -> Capacity {
        self.capacity
    }

    /// Returns the overflow policy.
    #[must_use]
    pub const fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    fn overflow(&self) -> FlowError {
        FlowError::Overflow {
            policy: self.policy,
            capacity: self.capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer<T>(policy: OverflowPolicy, capacity: usize) -> OverflowBuffer<T> {
        OverflowBuffer::new(policy, Capacity::bounded(capacity)).unwrap()
    }

    #[test]
    fn test_error_policy_always_overflows() {
        let mut buffer = OverflowBuffer::new(OverflowPolicy::Error, Capacity::Unbounded).unwrap();
        let error = buffer.offer(1).unwrap_err();
        assert!(error.is_overflow());
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_buffer_overflows_on_the_item_past_capacity() {
        let mut buffer = buffer(OverflowPolicy::Buffer, 5);
        for item in 0..5 {
            assert_eq!(buffer.offer(item).unwrap(), Offer::Buffered);
        }
        assert!(buffer.is_full());

        let error = buffer.offer(5).unwrap_err();
        match error {
            FlowError::Overflow { policy, capacity } => {
                assert_eq!(policy, OverflowPolicy::Buffer);
                assert_eq!(capacity, Capacity::Bounded(5));
            }
            other => panic!("expected overflow, got {other}"),
        }
        assert_eq!(buffer.len(), 5);
    }

    #[test]
    fn test_unbounded_buffer_never_overflows() {
        let mut buffer = OverflowBuffer::new(OverflowPolicy::Buffer, Capacity::Unbounded).unwrap();
        for item in 0..10_000 {
            assert_eq!(buffer.offer(item).unwrap(), Offer::Buffered);
        }
        assert_eq!(buffer.len(), 10_000);
        assert!(!buffer.is_full());
    }

    #[test]
    fn test_drop_newest_rejects_incoming() {
        let mut buffer = buffer(OverflowPolicy::DropNewest, 2);
        assert_eq!(buffer.offer(1).unwrap(), Offer::Buffered);
        assert_eq!(buffer.offer(2).unwrap(), Offer::Buffered);
        assert_eq!(buffer.offer(3).unwrap(), Offer::Rejected(3));
        assert_eq!(buffer.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_drop_oldest_keeps_last_k_in_order() {
        let mut buffer = buffer(OverflowPolicy::DropOldest, 3);
        for item in 0..10 {
            let _ = buffer.offer(item).unwrap();
        }
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.iter().copied().collect::<Vec<_>>(), vec![7, 8, 9]);
    }

    #[test]
    fn test_drop_oldest_reports_evicted_head() {
        let mut buffer = buffer(OverflowPolicy::DropOldest, 1);
        assert_eq!(buffer.offer("a").unwrap(), Offer::Buffered);
        assert_eq!(buffer.offer("b").unwrap(), Offer::Evicted("a"));
    }

    #[test]
    fn test_latest_holds_only_last_offer() {
        let mut buffer = OverflowBuffer::new(OverflowPolicy::Latest, Capacity::bounded(64)).unwrap();
        assert_eq!(buffer.capacity(), Capacity::Bounded(1));
        assert_eq!(buffer.offer('a').unwrap(), Offer::Buffered);
        assert_eq!(buffer.offer('b').unwrap(), Offer::Replaced('a'));
        assert_eq!(buffer.offer('c').unwrap(), Offer::Replaced('b'));
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.poll(), Some('c'));
    }

    #[test]
    fn test_release_consumes_one_credit_per_item() {
        let mut buffer = buffer(OverflowPolicy::Buffer, 8);
        for item in 0..6 {
            let _ = buffer.offer(item).unwrap();
        }

        let demand = DemandCounter::with_initial(4);
        assert_eq!(buffer.release(&demand), vec![0, 1, 2, 3]);
        assert_eq!(demand.available(), 0);
        assert_eq!(buffer.len(), 2);

        demand.add(10);
        assert_eq!(buffer.release(&demand), vec![4, 5]);
        assert_eq!(demand.available(), 8);
    }

    #[test]
    fn test_release_without_credit_keeps_items() {
        let mut buffer = buffer(OverflowPolicy::Buffer, 2);
        let _ = buffer.offer(1).unwrap();
        assert!(buffer.release(&DemandCounter::new()).is_empty());
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_clear_reports_dropped() {
        let mut buffer = buffer(OverflowPolicy::Buffer, 4);
        let _ = buffer.offer(1).unwrap();
        let _ = buffer.offer(2).unwrap();
        assert_eq!(buffer.clear(), 2);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result = OverflowBuffer::<u8>::new(OverflowPolicy::DropOldest, Capacity::bounded(0));
        assert!(result.unwrap_err().is_invalid_configuration());
    }

    #[test]
    fn test_offer_classification() {
        assert!(Offer::<u8>::Buffered.is_held());
        assert!(!Offer::<u8>::Buffered.lost_item());
        assert!(!Offer::Rejected(1).is_held());
        assert!(Offer::Evicted(1).lost_item());
    }
}
