//! Bounded polling
//!
//! Every "wait until the screen looks like X" flow is the same loop: fetch, test, sleep,
//! re-check a wall-clock deadline. [`poll_until`] is that loop.

use crate::error::Result;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Interval, deadline and minimum number of fetches for a poll loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub timeout: Duration,
    /// Fetches performed even when the deadline has already passed
    pub min_attempts: usize,
}

impl PollConfig {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self {
            interval,
            timeout,
            min_attempts: 1,
        }
    }

    pub fn from_millis(interval_ms: u64, timeout_ms: u64) -> Self {
        Self::new(Duration::from_millis(interval_ms), Duration::from_millis(timeout_ms))
    }

    /// Builder method: set the minimum number of fetches
    pub fn min_attempts(mut self, attempts: usize) -> Self {
        self.min_attempts = attempts.max(1);
        self
    }
}

/// How a poll loop ended
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome<T> {
    /// The predicate accepted this value
    Matched { value: T, attempts: usize },
    /// The deadline passed; `last` is the most recent fetch
    TimedOut { last: T, attempts: usize },
}

impl<T> PollOutcome<T> {
    pub fn is_matched(&self) -> bool {
        matches!(self, PollOutcome::Matched { .. })
    }

    pub fn attempts(&self) -> usize {
        match self {
            PollOutcome::Matched { attempts, .. } | PollOutcome::TimedOut { attempts, .. } => *attempts,
        }
    }

    /// The matched value, or the last fetched one
    pub fn into_value(self) -> T {
        match self {
            PollOutcome::Matched { value, .. } => value,
            PollOutcome::TimedOut { last, .. } => last,
        }
    }
}

/// Fetch until `predicate` accepts a value or the deadline passes
///
/// The deadline is measured from the call and re-checked after every sleep. Fetch errors
/// end the loop immediately.
pub async fn poll_until<T, F, Fut, P>(config: PollConfig, mut fetch: F, mut predicate: P) -> Result<PollOutcome<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    P: FnMut(&T) -> bool,
{
    let started = Instant::now();
    let mut attempts = 0;

    loop {
        let value = fetch().await?;
        attempts += 1;

        if predicate(&value) {
            return Ok(PollOutcome::Matched { value, attempts });
        }

        tokio::time::sleep(config.interval).await;

        if attempts >= config.min_attempts && started.elapsed() >= config.timeout {
            log::debug!("poll deadline reached after {} attempts", attempts);
            return Ok(PollOutcome::TimedOut { last: value, attempts });
        }
    }
}
