use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Tunables for [`AnprPipeline`](crate::AnprPipeline).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineOptions {
    /// Maximum number of regions recognised at the same time
    pub max_concurrent_recognitions: usize,
    /// Per-region recognition deadline in milliseconds; unset means no deadline
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recognition_timeout_ms: Option<u64>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_concurrent_recognitions: 4,
            recognition_timeout_ms: None,
        }
    }
}

impl PipelineOptions {
    /// Loads options from a JSON file; missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read pipeline options from {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid pipeline options in {}", path.display()))
    }

    pub fn with_max_concurrent_recognitions(mut self, limit: usize) -> Self {
        self.max_concurrent_recognitions = limit;
        self
    }

    pub fn with_recognition_timeout(mut self, timeout: Duration) -> Self {
        self.recognition_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Concurrency limit with zero treated as one.
    pub fn recognition_permits(&self) -> usize {
        self.max_concurrent_recognitions.max(1)
    }

    pub fn recognition_timeout(&self) -> Option<Duration> {
        self.recognition_timeout_ms.map(Duration::from_millis)
    }
}
