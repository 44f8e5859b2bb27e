// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Resilience primitives for external calls (retry policy + bulkhead).
//!
//! Assessment calls are I/O-bound network requests; retries are bounded
//! and the semaphore bulkhead caps how many run at once. Exhaustion is
//! reported, never retried forever; the caller applies its documented
//! fallback.

use rand::random;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Bounded retry with jittered exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
    pub jitter: f64,
}

impl RetryPolicy {
    /// One retry after the initial attempt; assessment APIs fall back to
    /// defaults on exhaustion, so deep retry chains buy nothing.
    pub fn bounded(retries: u32) -> Self {
        Self {
            max_attempts: retries + 1,
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
            multiplier: 2.0,
            jitter: 0.1,
        }
    }

    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = self.initial_delay.as_secs_f64() * self.multiplier.powi(attempt as i32);
        let jitter_factor = 1.0 + (random::<f64>() - 0.5) * 2.0 * self.jitter;
        let jittered = base * jitter_factor;
        Duration::from_secs_f64(jittered.min(self.max_delay.as_secs_f64()))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::bounded(1)
    }
}

/// Concurrency bound for external assessment calls.
pub struct Bulkhead {
    semaphore: Semaphore,
}

impl Bulkhead {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            semaphore: Semaphore::new(max_concurrent.max(1)),
        }
    }

    /// Waits for a slot; assessment calls queue rather than reject.
    pub async fn acquire(&self) -> tokio::sync::SemaphorePermit<'_> {
        // The semaphore is never closed, so acquire cannot fail.
        self.semaphore
            .acquire()
            .await
            .expect("bulkhead semaphore closed")
    }

    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}
