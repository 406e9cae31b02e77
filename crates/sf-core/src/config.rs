//! Runtime configuration for the orchestration core.
//!
//! Everything a component needs to behave differently per deployment —
//! concurrency caps, retry/backoff constants, checkpoint retention, and the
//! human-review validation threshold — lives here rather than as a literal
//! in the component itself. The specification calls out the validation
//! threshold and severity-to-band mapping explicitly as things that must
//! stay configuration, not hardcoded constants; this struct is where they
//! live.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcurrencyConfig {
    pub max_parallel_tools: usize,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self { max_parallel_tools: 4 }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub retry_delay_secs: f64,
    pub backoff_multiplier: f64,
    pub max_retry_delay_secs: f64,
    pub jitter_fraction: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay_secs: 5.0,
            backoff_multiplier: 2.0,
            max_retry_delay_secs: 300.0,
            jitter_fraction: 0.0,
        }
    }
}

impl RetryConfig {
    /// `delay = min(retry_delay * multiplier^(attempt-1), max_retry_delay)`,
    /// matching `TaskScheduler._execute_single_task` in the original
    /// implementation. `attempt` is 1-based (the first retry is attempt 1).
    /// `jitter_fraction == 0.0` (the default) gives a fully deterministic
    /// delay; a nonzero fraction scales it by a uniform `1 ± jitter_fraction`
    /// factor via [`Self::backoff_delay_jittered`].
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exp = self.backoff_multiplier.powi(attempt.saturating_sub(1) as i32);
        let secs = (self.retry_delay_secs * exp).min(self.max_retry_delay_secs);
        Duration::from_secs_f64(secs.max(0.0))
    }

    /// [`Self::backoff_delay`] with jitter applied: multiplies the computed
    /// delay by a uniform random factor in `[1 - jitter_fraction, 1 +
    /// jitter_fraction]`. With `jitter_fraction == 0.0` this is identical to
    /// the unjittered delay.
    pub fn backoff_delay_jittered(&self, attempt: u32) -> Duration {
        let base = self.backoff_delay(attempt);
        if self.jitter_fraction <= 0.0 {
            return base;
        }
        let factor = 1.0 + rand::thread_rng().gen_range(-self.jitter_fraction..=self.jitter_fraction);
        Duration::from_secs_f64((base.as_secs_f64() * factor).max(0.0))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckpointConfig {
    pub enabled: bool,
    pub max_checkpoints: usize,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self { enabled: true, max_checkpoints: 20 }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Findings with `confidence < confidence_threshold * 100` are dropped
    /// by the validate node rather than carried into the final report.
    /// `confidence` is on a 0-100 scale; the threshold itself is expressed
    /// on the 0.0-1.0 scale the specification documents it on.
    pub confidence_threshold: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self { confidence_threshold: 0.3 }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub concurrency: ConcurrencyConfig,
    pub retry: RetryConfig,
    pub checkpoint: CheckpointConfig,
    pub validation: ValidationConfig,
}

impl WorkflowConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}
