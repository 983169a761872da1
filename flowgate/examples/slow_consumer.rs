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

//! # Slow Consumer Example - Overflow Policies Side by Side
//!
//! A producer emits 20 sensor readings in a burst while the consumer has only
//! asked for 3. What happens to the other 17 depends on the overflow policy:
//!
//! - `error`: the 4th reading terminates the stream with `Overflow`
//! - `buffer(8)`: 8 readings wait, the 12th overflows
//! - `drop_newest(5)`: the first 5 unrequested readings are kept
//! - `drop_oldest(5)`: the last 5 readings are kept
//! - `latest`: only the newest reading is kept
//!
//! ## Running This Example
//!
//! ```bash
//! cargo run --example slow_consumer
//! ```

use flowgate::testing::TestSubscriber;
use flowgate::{Emission, FlowError, OverflowConfig, Signal, subscribe};

fn run(name: &str, config: OverflowConfig) -> Result<(), FlowError> {
    println!("📦 Policy: {name} ({}, capacity {})", config.policy, config.capacity);

    let subscriber = TestSubscriber::with_initial_request(3);
    let recorder = subscriber.recorder();
    let producer = subscribe(config, subscriber)?;

    let mut outcomes = String::new();
    for reading in 1..=20u32 {
        match producer.emit(reading) {
            Ok(Emission::Emitted) => outcomes.push('>'),
            Ok(Emission::Buffered) => outcomes.push('+'),
            Ok(Emission::Evicted | Emission::Replaced) => outcomes.push('~'),
            Ok(Emission::Dropped | Emission::Cancelled) => outcomes.push('x'),
            Err(error) => {
                outcomes.push('!');
                println!("   Producer stopped at reading {reading}: {error}");
                break;
            }
        }
    }
    let _ = producer.complete();
    println!("   Emission trace: {outcomes}");

    // The consumer catches up.
    recorder.request(100);

    let delivered: Vec<String> = recorder
        .signals()
        .into_iter()
        .map(|signal| match signal {
            Signal::Item(reading) => reading.to_string(),
            Signal::Complete => "✅".to_string(),
            Signal::Error(_) => "❌".to_string(),
        })
        .collect();
    println!("   Consumer saw:   {}\n", delivered.join(" "));
    Ok(())
}

fn main() -> Result<(), FlowError> {
    println!("🚀 flowgate Slow Consumer Example");
    println!("   20 readings, 3 requested up front\n");
    println!("   Legend: > delivered, + buffered, ~ replaced/evicted, x dropped, ! overflow\n");

    run("error", OverflowConfig::error())?;
    run("buffer", OverflowConfig::buffer(8))?;
    run("drop_newest", OverflowConfig::drop_newest(5))?;
    run("drop_oldest", OverflowConfig::drop_oldest(5))?;
    run("latest", OverflowConfig::latest())?;

    println!("🎉 Done");
    Ok(())
}
