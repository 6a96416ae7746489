// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Session configuration for the FIFO core
//!
//! Loaded from TOML or from `EEFIFO_*` environment variables (a `.env`
//! file is honoured). Every field has a hardware-accurate default, so an
//! empty file is a valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::diagnostics::{Anomaly, Diagnostics};
use super::error::{FifoError, Result};
use super::gif::GifFifo;

/// How broken invariants are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssertionPolicy {
    /// Abort on any broken invariant
    #[default]
    Strict,
    /// Report broken invariants as advisory anomalies and fall back
    Tolerant,
}

impl AssertionPolicy {
    /// Report a broken invariant
    ///
    /// Under [`AssertionPolicy::Strict`] this panics. Under
    /// [`AssertionPolicy::Tolerant`] it logs an error, forwards an
    /// [`Anomaly::InvariantViolation`] and returns so the caller can take
    /// its fallback path.
    #[track_caller]
    pub fn violation(self, diagnostics: &dyn Diagnostics, message: &str) {
        match self {
            AssertionPolicy::Strict => panic!("{}", message),
            AssertionPolicy::Tolerant => {
                log::error!("{}", message);
                diagnostics.warn(Anomaly::InvariantViolation {
                    message: message.to_string(),
                });
            }
        }
    }

    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(AssertionPolicy::Strict),
            "tolerant" => Ok(AssertionPolicy::Tolerant),
            other => Err(FifoError::ConfigParse(format!(
                "unknown assertion policy '{}'",
                other
            ))),
        }
    }
}

/// FIFO core configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FifoConfig {
    /// Handling of broken invariants
    pub assertions: AssertionPolicy,

    /// GIF FIFO depth in quadwords
    pub gif_fifo_capacity: usize,

    /// Capacity of the download channel from the render worker
    pub download_queue_depth: usize,
}

impl Default for FifoConfig {
    fn default() -> Self {
        Self {
            assertions: AssertionPolicy::Strict,
            gif_fifo_capacity: 16,
            download_queue_depth: 16,
        }
    }
}

impl FifoConfig {
    /// Environment variable selecting the assertion policy
    pub const ENV_ASSERTIONS: &'static str = "EEFIFO_ASSERTIONS";

    /// Environment variable overriding the GIF FIFO depth
    pub const ENV_GIF_FIFO_CAPACITY: &'static str = "EEFIFO_GIF_FIFO_CAPACITY";

    /// Environment variable overriding the download channel depth
    pub const ENV_DOWNLOAD_QUEUE_DEPTH: &'static str = "EEFIFO_DOWNLOAD_QUEUE_DEPTH";

    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| FifoError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| FifoError::ConfigSerialize(e.to_string()))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Defaults overridden by the process environment
    ///
    /// A `.env` file in the working directory is loaded first when present.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            log::debug!("Loaded environment from {}", path.display());
        }
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `EEFIFO_*` overrides supplied by `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(Self::ENV_ASSERTIONS) {
            self.assertions = AssertionPolicy::parse(&value)?;
        }
        if let Some(value) = lookup(Self::ENV_GIF_FIFO_CAPACITY) {
            self.gif_fifo_capacity = parse_count(Self::ENV_GIF_FIFO_CAPACITY, &value)?;
        }
        if let Some(value) = lookup(Self::ENV_DOWNLOAD_QUEUE_DEPTH) {
            self.download_queue_depth = parse_count(Self::ENV_DOWNLOAD_QUEUE_DEPTH, &value)?;
        }
        self.validate()
    }

    /// Check that every value is usable
    ///
    /// # Errors
    ///
    /// [`FifoError::InvalidConfig`] if the GIF FIFO depth does not fit
    /// STAT.FQC or the download channel has no room.
    pub fn validate(&self) -> Result<()> {
        if self.gif_fifo_capacity == 0 || self.gif_fifo_capacity > GifFifo::MAX_CAPACITY {
            return Err(FifoError::InvalidConfig(format!(
                "gif_fifo_capacity must be 1-{}, got {}",
                GifFifo::MAX_CAPACITY,
                self.gif_fifo_capacity
            )));
        }
        if self.download_queue_depth == 0 {
            return Err(FifoError::InvalidConfig(
                "download_queue_depth must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_count(key: &str, value: &str) -> Result<usize> {
    value
        .trim()
        .parse()
        .map_err(|e| FifoError::ConfigParse(format!("{}: {}", key, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::diagnostics::RecordingDiagnostics;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = FifoConfig::default();
        assert_eq!(config.assertions, AssertionPolicy::Strict);
        assert_eq!(config.gif_fifo_capacity, 16);
        assert_eq!(config.download_queue_depth, 16);
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(FifoConfig::from_toml_str("").unwrap(), FifoConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = FifoConfig::from_toml_str("assertions = \"tolerant\"\n").unwrap();
        assert_eq!(config.assertions, AssertionPolicy::Tolerant);
        assert_eq!(config.gif_fifo_capacity, 16);
    }

    #[test]
    fn test_invalid_capacity_rejected() {
        let err = FifoConfig::from_toml_str("gif_fifo_capacity = 0").unwrap_err();
        assert!(matches!(err, FifoError::InvalidConfig(_)));
        assert!(FifoConfig::from_toml_str("gif_fifo_capacity = 32").is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eefifo.toml");
        let config = FifoConfig {
            assertions: AssertionPolicy::Tolerant,
            gif_fifo_capacity: 8,
            download_queue_depth: 4,
        };

        config.save(&path).unwrap();
        assert_eq!(FifoConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = FifoConfig::load(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, FifoError::Io(_)));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            (FifoConfig::ENV_ASSERTIONS, "Tolerant"),
            (FifoConfig::ENV_GIF_FIFO_CAPACITY, " 12 "),
        ]
        .into_iter()
        .collect();

        let mut config = FifoConfig::default();
        config
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.assertions, AssertionPolicy::Tolerant);
        assert_eq!(config.gif_fifo_capacity, 12);
        assert_eq!(config.download_queue_depth, 16);
    }

    #[test]
    fn test_bad_override() {
        let mut config = FifoConfig::default();
        let err = config
            .apply_overrides(|key| (key == FifoConfig::ENV_ASSERTIONS).then(|| "lenient".to_string()))
            .unwrap_err();
        assert!(matches!(err, FifoError::ConfigParse(_)));
    }

    #[test]
    fn test_tolerant_violation_reports() {
        let sink = RecordingDiagnostics::new();
        AssertionPolicy::Tolerant.violation(&sink, "FQC = 0 on VIF FIFO read");
        assert_eq!(
            sink.anomalies(),
            vec![Anomaly::InvariantViolation {
                message: "FQC = 0 on VIF FIFO read".to_string()
            }]
        );
    }

    #[test]
    #[should_panic(expected = "decoder rejected")]
    fn test_strict_violation_panics() {
        let sink = RecordingDiagnostics::new();
        AssertionPolicy::Strict.violation(&sink, "decoder rejected");
    }
}
