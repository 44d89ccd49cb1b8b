use core_config::{ConfigError, FromEnv, env_parse};
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

/// Backoff schedule for opening the pool while Postgres starts up.
///
/// Delays double from `base_delay` up to `max_delay`. With `jitter` each
/// delay is scaled by a random factor in `[0.5, 1.0)`.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    pub attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 6,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
            jitter: true,
        }
    }
}

impl RetryConfig {
    pub fn attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn without_jitter(mut self) -> Self {
        self.jitter = false;
        self
    }

    /// Undithered pause after failed attempt number `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    fn pause_after(&self, attempt: u32) -> Duration {
        let delay = self.delay_after(attempt);
        if self.jitter {
            delay.mul_f64(rand::random_range(0.5..1.0))
        } else {
            delay
        }
    }
}

impl FromEnv for RetryConfig {
    /// - `DB_CONNECT_ATTEMPTS` (default 6)
    /// - `DB_CONNECT_BASE_DELAY_MS` (default 250)
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let base_ms: u64 = env_parse("DB_CONNECT_BASE_DELAY_MS", 250)?;
        Ok(Self::default()
            .attempts(env_parse("DB_CONNECT_ATTEMPTS", defaults.attempts)?)
            .base_delay(Duration::from_millis(base_ms)))
    }
}

/// Run `operation` until it succeeds or `config.attempts` runs are used up.
///
/// The error of the last attempt is returned.
pub async fn retry_with_backoff<F, Fut, T, E>(mut operation: F, config: &RetryConfig) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let attempts = config.attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    info!(attempt, "Connected after retrying");
                }
                return Ok(value);
            }
            Err(e) if attempt >= attempts => {
                warn!(attempt, "Giving up: {}", e);
                return Err(e);
            }
            Err(e) => {
                let pause = config.pause_after(attempt);
                warn!(
                    attempt,
                    attempts,
                    pause_ms = pause.as_millis() as u64,
                    "Attempt failed: {}",
                    e
                );
                tokio::time::sleep(pause).await;
                attempt += 1;
            }
        }
    }
}
