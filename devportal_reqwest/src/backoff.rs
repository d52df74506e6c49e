//! Backoff between retries of unauthorized requests

use std::time::Duration;

/// Configuration for how often and how patiently an unauthorized request is retried
///
/// A request that is answered with `401 Unauthorized` is retried up to
/// `max_retries` times. Before retry `n` (counting from zero) the dispatcher
/// waits `initial_delay * multiplier^n`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    initial_delay: Duration,
    multiplier: u32,
}

impl Default for RetryPolicy {
    /// Default retry policy
    ///
    /// Retries up to 3 times, waiting 1, 2, and then 4 seconds. A request is
    /// therefore attempted at most 4 times and gives up after 7 seconds of
    /// waiting.
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    /// Constructs a new retry policy
    pub const fn new(max_retries: u32, initial_delay: Duration, multiplier: u32) -> Self {
        Self {
            max_retries,
            initial_delay,
            multiplier,
        }
    }

    /// A policy that never retries
    pub const fn never() -> Self {
        Self::new(0, Duration::ZERO, 1)
    }

    /// The maximum number of retries after the first attempt
    #[inline]
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// The maximum number of attempts, including the first
    #[inline]
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// The delay before the retry that follows attempt `attempt`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.initial_delay
            .saturating_mul(self.multiplier.saturating_pow(attempt))
    }

    /// Creates a fresh handler for a single logical request
    pub fn handler(&self) -> UnauthorizedBackoff {
        UnauthorizedBackoff::new(*self)
    }
}

/// Retry state for one logical request
///
/// The counter only moves when an attempt is rejected as unauthorized.
#[derive(Debug)]
pub struct UnauthorizedBackoff {
    policy: RetryPolicy,
    attempt: u32,
}

impl UnauthorizedBackoff {
    /// Constructs a new handler from a [`RetryPolicy`]
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy, attempt: 0 }
    }

    /// The zero-based index of the attempt about to be made
    #[inline]
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// The number of attempts made so far, once the current one completes
    #[inline]
    pub fn attempts(&self) -> u32 {
        self.attempt + 1
    }

    /// Reports that the current attempt was rejected as unauthorized
    ///
    /// Returns how long to wait before trying again, or `None` if the
    /// retry ceiling has been reached.
    pub fn unauthorized(&mut self) -> Option<Duration> {
        if self.attempt >= self.policy.max_retries {
            return None;
        }

        let delay = self.policy.delay_for(self.attempt);
        self.attempt += 1;
        Some(delay)
    }
}

impl From<RetryPolicy> for UnauthorizedBackoff {
    fn from(policy: RetryPolicy) -> Self {
        Self::new(policy)
    }
}
