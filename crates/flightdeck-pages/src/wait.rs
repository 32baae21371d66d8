//! Wait Mechanisms
//!
//! Polling waits for asynchronous page updates. A wait checks its condition,
//! sleeps for the poll interval, and repeats until the condition holds or the
//! timeout elapses.
//!
//! While polling, an [`ElementNotFound`](PageError::ElementNotFound) from the
//! condition counts as "not yet". Any other error ends the wait immediately.

use crate::clock::Clock;
use crate::result::{PageError, PageResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default timeout for wait operations (10 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 10_000;

/// Default polling interval (500ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Outcome of a successful wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitResult {
    /// Time spent waiting
    pub elapsed: Duration,
    /// How many times the condition was evaluated
    pub attempts: usize,
}

/// Polls conditions against a clock
#[derive(Debug, Clone, Copy)]
pub struct Waiter<'a> {
    clock: &'a dyn Clock,
    options: WaitOptions,
}

impl<'a> Waiter<'a> {
    /// Create a waiter
    #[must_use]
    pub fn new(clock: &'a dyn Clock, options: WaitOptions) -> Self {
        Self { clock, options }
    }

    /// Same clock, different timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.options.timeout_ms = timeout_ms;
        self
    }

    /// Active options
    #[must_use]
    pub const fn options(&self) -> &WaitOptions {
        &self.options
    }

    /// Poll `condition` until it returns `Ok(true)`.
    ///
    /// The condition is always evaluated at least once, and once more after
    /// the final sleep, so a zero timeout still gets a single check.
    ///
    /// # Errors
    ///
    /// [`PageError::Timeout`] carrying `message` when the budget runs out;
    /// any non-not-found error raised by the condition.
    pub fn until<F>(&self, message: &str, mut condition: F) -> PageResult<WaitResult>
    where
        F: FnMut() -> PageResult<bool>,
    {
        let start = self.clock.elapsed();
        let timeout = self.options.timeout();
        let mut attempts = 0;

        loop {
            attempts += 1;
            match condition() {
                Ok(true) => {
                    let elapsed = self.clock.elapsed().saturating_sub(start);
                    debug!(attempts, elapsed_ms = elapsed.as_millis() as u64, "wait satisfied");
                    return Ok(WaitResult { elapsed, attempts });
                }
                Ok(false) => {}
                Err(err) if err.is_not_found() => {
                    debug!(attempts, error = %err, "element absent while waiting");
                }
                Err(err) => return Err(err),
            }

            if self.clock.elapsed().saturating_sub(start) >= timeout {
                warn!(
                    timeout_ms = self.options.timeout_ms,
                    attempts, "{message}"
                );
                return Err(PageError::timeout(message, self.options.timeout_ms));
            }
            self.clock.sleep(self.options.poll_interval());
        }
    }
}
