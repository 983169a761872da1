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

//! Execution-context seam.
//!
//! flowgate does not schedule work itself. When delivery has to happen on a
//! particular context (a runtime, a worker, a UI loop) the core hands a task
//! to an [`Executor`] and returns immediately. Submission must never block
//! the caller.
//!
//! Two executors ship with the crate:
//!
//! - [`InlineExecutor`]: runs the task on the calling thread
//! - [`TokioExecutor`]: spawns the task on a tokio runtime
//!
//! # Examples
//!
//! ```rust
//! use flowgate::executor::{Executor, InlineExecutor};
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicBool, Ordering};
//!
//! let ran = Arc::new(AtomicBool::new(false));
//! let flag = Arc::clone(&ran);
//! InlineExecutor.execute(Box::new(move || flag.store(true, Ordering::SeqCst)));
//! assert!(ran.load(Ordering::SeqCst));
//! ```

use std::fmt;
use tokio::runtime::Handle;

/// A unit of work submitted to an executor.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Non-blocking task submission onto an execution context.
///
/// Implementations must run every submitted task exactly once and must
/// return from [`execute`](Self::execute) without waiting for the task.
/// flowgate keeps at most one task in flight per subscription, so no
/// ordering between tasks is required.
pub trait Executor: Send + Sync + fmt::Debug {
    /// Submits a task for execution.
    fn execute(&self, task: Task);

    /// Get a human-readable name for this executor.
    ///
    /// Used for logging and debugging.
    fn name(&self) -> &str;
}

/// Runs tasks immediately on the submitting thread.
///
/// This models producer and consumer sharing one cooperative context.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineExecutor;

impl Executor for InlineExecutor {
    fn execute(&self, task: Task) {
        task();
    }

    fn name(&self) -> &str {
        "InlineExecutor"
    }
}

/// Spawns tasks onto a tokio runtime.
///
/// # Examples
///
/// ```rust
/// use flowgate::executor::TokioExecutor;
///
/// # #[tokio::main]
/// # async fn main() {
/// let executor = TokioExecutor::current();
/// # let _ = executor;
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TokioExecutor {
    handle: Handle,
}

impl TokioExecutor {
    /// Creates an executor for the given runtime handle.
    #[must_use]
    pub const fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Creates an executor for the runtime the caller is running on.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    #[must_use]
    pub fn current() -> Self {
        Self::new(Handle::current())
    }

    /// Creates an executor for the current runtime, if there is one.
    #[must_use]
    pub fn try_current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }
}

impl Executor for TokioExecutor {
    fn execute(&self, task: Task) {
        self.handle.spawn(async move { task() });
    }

    fn name(&self) -> &str {
        "TokioExecutor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::oneshot;

    #[test]
    fn test_inline_runs_before_returning() {
        let count = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let count = Arc::clone(&count);
            InlineExecutor.execute(Box::new(move || {
                count.fetch_add(1, Ordering::SeqCst);
            }));
        }
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert_eq!(InlineExecutor.name(), "InlineExecutor");
    }

    #[tokio::test]
    async fn test_tokio_executor_runs_task() {
        let executor = TokioExecutor::current();
        let (tx, rx) = oneshot::channel();
        executor.execute(Box::new(move || {
            let _ = tx.send(42);
        }));
        assert_eq!(rx.await.unwrap(), 42);
    }

    #[test]
    fn test_try_current_outside_runtime() {
        assert!(TokioExecutor::try_current().is_none());
    }
}
