//! Pacing between sequential archive operations.
//!
//! Upstream hosts and storage endpoints rate-limit per source, so the runner
//! waits on a [`Pacer`] between repositories. Swapping the pacer changes the
//! strategy without touching orchestration.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Default delay between two archive operations.
pub const DEFAULT_PACING_INTERVAL: Duration = Duration::from_secs(5);

/// Decides how long to wait before the next archive operation.
#[async_trait]
pub trait Pacer: Send + Sync {
    /// Waits until the next operation may start.
    async fn pause(&self);
}

/// Waits a fixed interval every time.
#[derive(Debug, Clone, Copy)]
pub struct FixedIntervalPacer {
    interval: Duration,
}

impl FixedIntervalPacer {
    /// Creates a pacer waiting `interval` between operations.
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Returns the configured interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for FixedIntervalPacer {
    fn default() -> Self {
        Self::new(DEFAULT_PACING_INTERVAL)
    }
}

#[async_trait]
impl Pacer for FixedIntervalPacer {
    async fn pause(&self) {
        if self.interval.is_zero() {
            return;
        }
        debug!(wait_ms = self.interval.as_millis() as u64, "Pacing before next repository");
        tokio::time::sleep(self.interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn waits_fixed_interval() {
        let pacer = FixedIntervalPacer::new(Duration::from_secs(5));
        let start = Instant::now();

        pacer.pause().await;
        pacer.pause().await;

        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(10));
        assert!(elapsed < Duration::from_secs(11));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_does_not_wait() {
        let pacer = FixedIntervalPacer::new(Duration::ZERO);
        let start = Instant::now();

        pacer.pause().await;

        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[test]
    fn default_interval() {
        assert_eq!(FixedIntervalPacer::default().interval(), DEFAULT_PACING_INTERVAL);
    }
}
