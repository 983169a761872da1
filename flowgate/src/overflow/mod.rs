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

//! Overflow handling for items produced without credit.
//!
//! When a producer has an item but the consumer has not granted credit for
//! it, the item is handed to an [`OverflowBuffer`]. What the buffer does with
//! it depends on the [`OverflowPolicy`] chosen when the subscription was
//! created:
//!
//! | Policy | Buffer full (or no buffer) |
//! |--------|----------------------------|
//! | [`Error`](OverflowPolicy::Error) | always [`FlowError::Overflow`](crate::FlowError::Overflow) |
//! | [`Buffer`](OverflowPolicy::Buffer) | [`FlowError::Overflow`](crate::FlowError::Overflow) |
//! | [`DropNewest`](OverflowPolicy::DropNewest) | incoming item discarded |
//! | [`DropOldest`](OverflowPolicy::DropOldest) | head evicted, item appended |
//! | [`Latest`](OverflowPolicy::Latest) | held item replaced (capacity 1) |
//!
//! Buffered items are released in arrival order as credit arrives, one unit
//! of credit per item.
//!
//! # Examples
//!
//! ```rust
//! use flowgate::demand::DemandCounter;
//! use flowgate::overflow::{Capacity, OverflowBuffer, OverflowPolicy};
//!
//! let mut buffer = OverflowBuffer::new(OverflowPolicy::DropOldest, Capacity::bounded(2)).unwrap();
//! for item in 1..=4 {
//!     let _ = buffer.offer(item).unwrap();
//! }
//!
//! let demand = DemandCounter::with_initial(10);
//! assert_eq!(buffer.release(&demand), vec![3, 4]);
//! ```

mod buffer;
mod config;
mod policy;

pub use buffer::{Offer, OverflowBuffer};
pub use config::OverflowConfig;
pub use policy::{Capacity, OverflowPolicy};
