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

//! # Bridge Example - Crossing onto a Tokio Runtime
//!
//! A producer thread emits readings as fast as it can. A `Bridge` hands them
//! to a consumer that runs on the tokio runtime and processes them slowly,
//! pulling one at a time. The bridge keeps at most `prefetch` items in
//! transit and everything else waits in the producer's buffer, so memory is
//! bounded by the buffer capacities rather than by the producer's speed.
//!
//! Tracing output shows credit moving across the bridge.
//!
//! ## Running This Example
//!
//! ```bash
//! RUST_LOG=flowgate=debug cargo run --example bridge_tokio --features observability
//! ```

use flowgate::bridge::{Bridge, BridgeConfig};
use flowgate::{Emission, FnSubscriber, OverflowConfig, Subscription, TokioExecutor, subscribe};
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("🚀 flowgate Bridge Example");
    println!("   Producer thread → Bridge(prefetch 16) → tokio consumer\n");

    let (done_tx, done_rx) = oneshot::channel();
    let mut total = 0u64;

    let consumer = FnSubscriber::new(move |reading: u64, subscription: &Subscription| {
        total += reading;
        // Simulate slow processing.
        std::thread::sleep(Duration::from_micros(200));
        subscription.request(1);
        if reading % 250 == 0 {
            println!("   Consumer: reading {reading}, running total {total}");
        }
    })
    .with_initial_request(1)
    .on_complete(move || {
        let _ = done_tx.send(());
    })
    .on_error(|error| eprintln!("   Consumer: stream failed: {error}"));

    let bridge = Bridge::new(
        BridgeConfig::new(16),
        Arc::new(TokioExecutor::current()),
        OverflowConfig::buffer(16),
        consumer,
    )?;
    let producer = subscribe(OverflowConfig::buffer(4_096), bridge)?;

    println!("📡 Producer: emitting 2000 readings");
    let (emitted, buffered) = tokio::task::spawn_blocking(move || {
        let (mut emitted, mut buffered) = (0, 0);
        for reading in 1..=2_000u64 {
            match producer.emit(reading) {
                Ok(Emission::Emitted) => emitted += 1,
                Ok(Emission::Buffered) => buffered += 1,
                Ok(_) => {}
                Err(error) => {
                    eprintln!("   Producer: {error}");
                    return (emitted, buffered);
                }
            }
        }
        let _ = producer.complete();
        (emitted, buffered)
    })
    .await?;

    println!("   Producer: finished ({emitted} on credit, {buffered} buffered)\n");

    tokio::time::timeout(Duration::from_secs(30), done_rx).await??;
    println!("\n🎉 Consumer drained every reading");
    Ok(())
}
