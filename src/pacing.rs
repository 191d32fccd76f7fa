//! Randomness and sleeping behind injectable seams.
//!
//! Identity rotation, politeness delays, and retry jitter all draw from an
//! [`Entropy`] source and wait through a [`Sleeper`], so tests can pin the
//! random choices and observe requested delays without real waiting.

use std::fmt::Debug;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tracing::debug;

/// Source of the crawler's random choices.
pub trait Entropy: Send + Sync + Debug {
    /// Returns an index in `0..len`. `len` is never zero.
    fn pick(&self, len: usize) -> usize;

    /// Returns a duration in the closed interval `min..=max`.
    fn between(&self, min: Duration, max: Duration) -> Duration;
}

/// Thread-local RNG backed entropy used in production.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadEntropy;

impl Entropy for ThreadEntropy {
    fn pick(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }

    fn between(&self, min: Duration, max: Duration) -> Duration {
        if max <= min {
            return min;
        }
        let secs = rand::thread_rng().gen_range(min.as_secs_f64()..=max.as_secs_f64());
        Duration::from_secs_f64(secs)
    }
}

/// Deterministic entropy: always the same index, always the same fraction of a window.
#[derive(Debug, Clone, Copy)]
pub struct FixedEntropy {
    index: usize,
    fraction: f64,
}

impl FixedEntropy {
    /// `fraction` is clamped to `0.0..=1.0`; `0.0` always yields the window minimum.
    #[must_use]
    pub fn new(index: usize, fraction: f64) -> Self {
        Self {
            index,
            fraction: fraction.clamp(0.0, 1.0),
        }
    }
}

impl Entropy for FixedEntropy {
    fn pick(&self, len: usize) -> usize {
        self.index.min(len.saturating_sub(1))
    }

    fn between(&self, min: Duration, max: Duration) -> Duration {
        if max <= min {
            return min;
        }
        min + (max - min).mul_f64(self.fraction)
    }
}

/// Suspends the current task.
#[async_trait]
pub trait Sleeper: Send + Sync + Debug {
    /// Waits for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Real waiting on the Tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Records every requested sleep and returns immediately.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    calls: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Durations requested so far, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<Duration> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(duration);
        }
    }
}

/// Closed interval from which a randomized politeness delay is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayWindow {
    min: Duration,
    max: Duration,
}

impl DelayWindow {
    /// Creates a window; callers validate `min <= max` through the crawler config.
    #[must_use]
    pub const fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    /// Window in whole seconds.
    #[must_use]
    pub const fn from_secs(min: u64, max: u64) -> Self {
        Self::new(Duration::from_secs(min), Duration::from_secs(max))
    }

    /// Lower bound.
    #[must_use]
    pub const fn min(&self) -> Duration {
        self.min
    }

    /// Upper bound.
    #[must_use]
    pub const fn max(&self) -> Duration {
        self.max
    }

    /// Whether the window is well formed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }

    /// Draws a delay from the window.
    #[must_use]
    pub fn sample(&self, entropy: &dyn Entropy) -> Duration {
        entropy.between(self.min, self.max)
    }

    /// Draws a delay and sleeps for it. Returns the delay used.
    pub async fn pause(&self, entropy: &dyn Entropy, sleeper: &dyn Sleeper) -> Duration {
        let delay = self.sample(entropy);
        debug!(delay_ms = delay.as_millis(), "politeness pause");
        sleeper.sleep(delay).await;
        delay
    }
}
