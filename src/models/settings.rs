//! Assembly settings
//!
//! Loaded from YAML; every key is optional and falls back to the default.
//!
//! ```yaml
//! max_denominator: 64
//! close_beat_ties: false
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::duration::DEFAULT_MAX_DENOMINATOR;
use super::errors::{NotationError, NotationResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblySettings {
    /// Denominator bound for float durations and the part-wide division grid
    pub max_denominator: i64,

    /// Give the later fragment of a beat split an incoming tie. When false
    /// the later fragment keeps the tie state the event had before the split.
    pub close_beat_ties: bool,

    /// Rescale measures containing sub-quarter durations to integers
    pub rescale_measures: bool,

    /// Flag beats whose durations are not binary subdivisions as tuplets
    pub detect_tuplets: bool,
}

impl Default for AssemblySettings {
    fn default() -> Self {
        Self {
            max_denominator: DEFAULT_MAX_DENOMINATOR,
            close_beat_ties: true,
            rescale_measures: true,
            detect_tuplets: true,
        }
    }
}

impl AssemblySettings {
    pub fn from_yaml_str(yaml: &str) -> NotationResult<Self> {
        let settings: AssemblySettings =
            serde_yaml::from_str(yaml).map_err(|e| NotationError::Settings(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> NotationResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            NotationError::Settings(format!("cannot read {}: {}", path.display(), e))
        })?;
        log::debug!("Loading assembly settings from {}", path.display());
        Self::from_yaml_str(&text)
    }

    pub fn validate(&self) -> NotationResult<()> {
        if self.max_denominator < 1 {
            return Err(NotationError::Settings(format!(
                "max_denominator must be at least 1, got {}",
                self.max_denominator
            )));
        }
        Ok(())
    }
}
