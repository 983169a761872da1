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

//! Relaying a flow onto another execution context.
//!
//! A [`Bridge`] sits between an upstream flow and a downstream subscriber
//! that must run on a different context. It is itself a [`Subscriber`]:
//! attach it upstream with [`subscribe`](crate::subscribe) and it forwards
//! every signal into a second subscription whose delivery runs on the given
//! [`Executor`](crate::executor::Executor).
//!
//! ```text
//!  upstream producer ──▶ Bridge ──▶ handoff buffer ──▶ executor ──▶ subscriber
//!          ▲                                                          │
//!          └──────────── request(limit) every `limit` items ──────────┘
//! ```
//!
//! The bridge asks upstream for [`BridgeConfig::prefetch`] items up front and
//! tops the window up by [`BridgeConfig::limit`] each time that many items
//! have been delivered downstream, so no more than `prefetch` items are ever
//! in transit. Downstream demand is honoured separately: items wait in the
//! handoff buffer until the downstream subscriber requests them.

mod bridge;
mod config;

pub use bridge::Bridge;
pub use config::BridgeConfig;
