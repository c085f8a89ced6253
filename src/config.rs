use crate::candidate::SplitCandidate;
use crate::errors::SplitError;
use serde::{Deserialize, Serialize};

/// Settings shared by every worker taking part in an exchange.
/// All workers must agree on these, since they decide the buffer layout.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SyncConfig {
    /// Upper bound on the categorical thresholds of any candidate.
    pub max_cat_threshold: usize,
    /// Decode and reduce worker buffers in parallel.
    pub parallel: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            max_cat_threshold: 32,
            parallel: true,
        }
    }
}

impl SyncConfig {
    pub fn new(max_cat_threshold: usize, parallel: bool) -> Self {
        SyncConfig {
            max_cat_threshold,
            parallel,
        }
    }

    /// Check that a slot sized for `max_cat_threshold` categories is addressable.
    pub fn validate(&self) -> Result<(), SplitError> {
        SplitCandidate::framed_size(self.max_cat_threshold).map(|_| ())
    }

    pub fn from_json(json: &str) -> Result<Self, SplitError> {
        let config: SyncConfig = serde_json::from_str(json)?;
        config.validate()?;
        log::debug!("Loaded sync config {:?}", config);
        Ok(config)
    }
}
