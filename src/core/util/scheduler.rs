// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt::Debug;
use std::time::Duration;

/// Shared deferred-execution capability used by the table reconnect path.
///
/// One scheduler serves every table of an application; it must absorb
/// multiple concurrent reconnect tasks. `schedule` must not block the
/// caller.
pub trait RetryScheduler: Debug + Send + Sync {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce() + Send>);
}

/// Production scheduler: spawns each task onto a tokio runtime after the
/// requested delay.
#[derive(Clone, Debug)]
pub struct TokioRetryScheduler {
    handle: tokio::runtime::Handle,
}

impl TokioRetryScheduler {
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }
}

impl RetryScheduler for TokioRetryScheduler {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce() + Send>) {
        self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        });
    }
}
