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

//! Consumers: the [`Subscriber`] capability and ready-made implementations.
//!
//! - [`FnSubscriber`]: closures for each signal
//! - [`SignalReceiver`]: an async receiver created by [`channel`] that
//!   requests in batches as items are taken out

mod function;
mod receiver;
mod subscriber;

pub use function::FnSubscriber;
pub use receiver::{SignalReceiver, channel};
pub use subscriber::Subscriber;
