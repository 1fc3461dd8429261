//! Pacing and rate-limit backoff for remote calls.
//!
//! Two tiers: proactive pacing between chunks that grows with the number of calls made in a
//! run, and a reactive wait-then-retry-once when the provider reports throttling.

use crate::config::RateLimitSettings;
use std::time::Duration;
use tracing::info;

/// Number of retries allowed after a rate-limited attempt.
pub const RATE_LIMIT_RETRIES: u32 = 1;

/// Scheduling policy for inference calls.
#[derive(Debug, Clone)]
pub struct RateController {
    base_delay: Duration,
    step_delay: Duration,
    step_every: usize,
    max_delay: Duration,
    backoff: Duration,
    resume_delay: Duration,
}

impl Default for RateController {
    fn default() -> Self {
        Self::from_settings(&RateLimitSettings::default())
    }
}

impl RateController {
    pub fn from_settings(settings: &RateLimitSettings) -> Self {
        Self {
            base_delay: Duration::from_secs(settings.base_delay_secs),
            step_delay: Duration::from_secs(settings.step_delay_secs),
            step_every: settings.step_every.max(1),
            max_delay: Duration::from_secs(settings.max_delay_secs),
            backoff: Duration::from_secs(settings.rate_limit_backoff_secs),
            resume_delay: Duration::from_secs(settings.resume_delay_secs),
        }
    }

    /// Delay after processing the chunk at 0-based `position` in a full run.
    ///
    /// With defaults: 2s for the first 10 chunks, 4s for the next 10, 6s afterwards.
    pub fn pacing_delay(&self, position: usize) -> Duration {
        let tier = (position / self.step_every) as u32;
        let delay = self.base_delay + self.step_delay.saturating_mul(tier);
        delay.min(self.max_delay)
    }

    /// Sleep for the pacing delay of `position`.
    pub async fn pace(&self, position: usize) {
        sleep(self.pacing_delay(position)).await;
    }

    /// Sleep for the rate-limit backoff.
    pub async fn back_off(&self, chunk_index: u32) {
        info!(
            "Rate limit hit on chunk {}. Waiting {} seconds...",
            chunk_index,
            self.backoff.as_secs()
        );
        sleep(self.backoff).await;
    }

    /// Sleep for the resume pre-delay.
    pub async fn before_resume_attempt(&self) {
        sleep(self.resume_delay).await;
    }
}

async fn sleep(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
