use std::time::Duration;

/// Exponential backoff with jitter, grounded on
/// `riptide-fetch::fetch::RetryConfig`.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Delay to wait before the `attempt`-th retry (0-indexed).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let base = self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(attempt as i32);
        let base = base.min(self.max_delay.as_secs_f64());
        let delay = if self.jitter {
            let jitter_frac: f64 = rand::random::<f64>() * 0.3;
            base * (1.0 + jitter_frac)
        } else {
            base
        };
        Duration::from_secs_f64(delay)
    }
}
