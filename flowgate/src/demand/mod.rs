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

//! Demand credit accounting.
//!
//! A consumer authorizes a producer to push items by granting *credit*. The
//! [`DemandCounter`] holds that credit for one subscription and is the only
//! piece of shared state both sides touch on every item, so it is lock-free:
//! a single [`AtomicU64`](std::sync::atomic::AtomicU64) updated with
//! compare-and-swap.
//!
//! Credit saturates into an *unbounded* sentinel ([`Demand::Unbounded`]).
//! Once a counter is unbounded it stays unbounded and every consume succeeds
//! without deducting anything, which disables backpressure for that
//! subscription.
//!
//! # Examples
//!
//! ```rust
//! use flowgate::demand::{Demand, DemandCounter};
//!
//! let counter = DemandCounter::new();
//! assert!(!counter.try_consume());
//!
//! counter.add(2);
//! assert!(counter.try_consume());
//! assert!(counter.try_consume());
//! assert!(!counter.try_consume());
//!
//! counter.add(Demand::Unbounded);
//! assert!(counter.is_unbounded());
//! ```

mod counter;
mod demand;

pub use counter::DemandCounter;
pub use demand::Demand;
