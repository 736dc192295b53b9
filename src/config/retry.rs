//! Retry policy configuration (spec §3, `RetryConfig`).

use serde::{Deserialize, Serialize};

/// Backoff strategy between retry attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Backoff {
    Exponential,
}

impl Backoff {
    /// Case-insensitive parse of the YAML `backoff` string, per spec §4.4.
    pub fn parse(raw: &str) -> Option<Backoff> {
        if raw.eq_ignore_ascii_case("exponential") {
            Some(Backoff::Exponential)
        } else {
            None
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_multiplier() -> f64 {
    2.0
}

/// A sentinel delay used instead of letting the exponential computation
/// wrap around a 64-bit millisecond counter (Design Notes §9).
pub const DELAY_OVERFLOW_SENTINEL_MS: u64 = 1 << 53;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_delay_ms", rename = "delay")]
    pub delay_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guard: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backoff: Option<String>,
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    #[serde(default, rename = "maxDelay", skip_serializing_if = "Option::is_none")]
    pub max_delay_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfig {
            max_attempts: default_max_attempts(),
            delay_ms: default_delay_ms(),
            guard: None,
            backoff: None,
            multiplier: default_multiplier(),
            max_delay_ms: None,
            retries: None,
        }
    }
}

impl RetryConfig {
    /// `retries + 1` wins over `maxAttempts` when `retries` is present
    /// (Design Notes §9, Open Question 3).
    pub fn effective_attempts(&self) -> u32 {
        match self.retries {
            Some(r) => r.saturating_add(1),
            None => self.max_attempts.max(1),
        }
    }

    pub fn backoff(&self) -> Option<Backoff> {
        self.backoff.as_deref().and_then(Backoff::parse)
    }

    /// Delay before the attempt whose 1-based index is `attempt_index`
    /// (the upcoming retry, per spec §4.4's `computeRetryDelay`).
    pub fn compute_delay_ms(&self, attempt_index: u32) -> u64 {
        let base = self.delay_ms;
        match self.backoff() {
            Some(Backoff::Exponential) => {
                let factor = self
                    .multiplier
                    .powi((attempt_index.saturating_sub(1)) as i32);
                let scaled = (base as f64) * factor;
                let exponential =
                    if !scaled.is_finite() || scaled > DELAY_OVERFLOW_SENTINEL_MS as f64 {
                        DELAY_OVERFLOW_SENTINEL_MS
                    } else {
                        scaled as u64
                    };
                match self.max_delay_ms {
                    Some(max) => exponential.min(max),
                    None => exponential,
                }
            }
            None => base,
        }
    }
}
