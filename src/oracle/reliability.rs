use std::time::Duration;

use crate::oracle::{
    error::{OracleError, OracleErrorKind},
    types::ReliabilityConfig,
};

#[derive(Debug, Clone)]
pub struct ReliabilityLayer {
    config: ReliabilityConfig,
}

impl ReliabilityLayer {
    pub fn new(config: ReliabilityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReliabilityConfig {
        &self.config
    }

    /// Delay before retry number `attempt` (1-based); doubles per attempt up to the cap.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let base = self.config.backoff_base_ms.max(1) as f64;
        let max = self.config.backoff_max_ms.max(1) as f64;
        let exp = attempt.saturating_sub(1).min(30) as i32;
        let without_jitter = (base * 2f64.powi(exp)).min(max);
        let jitter_factor = 0.9 + (attempt as f64 % 3.0) * 0.05;
        Duration::from_millis((without_jitter * jitter_factor) as u64)
    }

    pub fn can_retry(&self, err: &OracleError, attempt: u32) -> bool {
        if err.kind == OracleErrorKind::Cancelled {
            return false;
        }
        err.retryable && attempt < self.config.max_retries
    }
}
