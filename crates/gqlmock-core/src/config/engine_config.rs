use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{MockError, Result};

/// What `resolve` yields when no mock matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnmatchedPolicy {
    /// Surface an `UnmatchedOperation` to the caller
    Error,
    /// Resolve to an empty result; the log still records the miss
    Muted,
}

/// Global engine settings supplied by the host environment
///
/// The unmatched policy has no default: hosts must choose one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Delay applied to mocks without their own (milliseconds)
    #[serde(default = "default_delay_ms")]
    pub default_delay_ms: i64,

    pub unmatched: UnmatchedPolicy,
}

fn default_delay_ms() -> i64 {
    super::defaults::DEFAULT_DELAY_MS as i64
}

impl EngineSettings {
    pub fn new(unmatched: UnmatchedPolicy) -> Self {
        Self {
            default_delay_ms: default_delay_ms(),
            unmatched,
        }
    }

    /// Builder method for the default delay
    pub fn with_default_delay(mut self, delay: Duration) -> Self {
        self.default_delay_ms = i64::try_from(delay.as_millis()).unwrap_or(i64::MAX);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_delay_ms < 0 {
            return Err(MockError::InvalidSettings(format!(
                "default_delay_ms must not be negative, got {}",
                self.default_delay_ms
            )));
        }
        Ok(())
    }

    /// Default delay; only meaningful after `validate` succeeded
    pub fn default_delay(&self) -> Duration {
        Duration::from_millis(self.default_delay_ms.max(0) as u64)
    }
}
