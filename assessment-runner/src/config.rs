//! Runner configuration
//!
//! Loads run settings from a TOML file; every field has a default so a bare
//! `assess` invocation works without one.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use itemgauge::{conventional_groups, ModelGroup};

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid ensemble layout: {0}")]
    Layout(String),
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ensemble: EnsembleLayout,
    #[serde(default)]
    pub parsing: ParsingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// How many trained models each ensemble carries, and how the QA models
/// split into cohorts. The first `assessment_models` QA models in the logit
/// export are tagged as the assessment cohort, the remainder as prediction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsembleLayout {
    #[serde(default = "default_qa_models")]
    pub qa_models: usize,
    #[serde(default = "default_assessment_models")]
    pub assessment_models: usize,
    #[serde(default = "default_complexity_models")]
    pub complexity_models: usize,
}

impl EnsembleLayout {
    /// Group tags for the QA ensemble in export order.
    pub fn qa_group_tags(&self) -> Result<Vec<ModelGroup>, ConfigError> {
        conventional_groups(self.qa_models, self.assessment_models)
            .map_err(|e| ConfigError::Layout(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.qa_group_tags()?;
        if self.complexity_models == 0 {
            return Err(ConfigError::Layout(
                "complexity_models must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for EnsembleLayout {
    fn default() -> Self {
        Self {
            qa_models: default_qa_models(),
            assessment_models: default_assessment_models(),
            complexity_models: default_complexity_models(),
        }
    }
}

/// Batch parsing policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsingConfig {
    /// Skip generations that fail to parse, logging each with its record
    /// index, instead of aborting the run.
    #[serde(default)]
    pub skip_malformed: bool,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            skip_malformed: false,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_true")]
    pub write_json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            write_json: default_true(),
        }
    }
}

// Default value functions
fn default_qa_models() -> usize { 6 }
fn default_assessment_models() -> usize { 3 }
fn default_complexity_models() -> usize { 3 }
fn default_output_dir() -> String { "results".to_string() }
fn default_true() -> bool { true }

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Config = toml::from_str(&content)?;
        config.ensemble.validate()?;
        Ok(config)
    }

    /// A commented sample configuration for `init-config`.
    pub fn sample_toml() -> String {
        let sample = "\
# itemgauge assessment-runner configuration

[ensemble]
# Total QA models in the logit export; the first `assessment_models`
# are the assessment cohort, the rest the prediction cohort.
qa_models = 6
assessment_models = 3
complexity_models = 3

[parsing]
# Skip generations without separator structure instead of aborting.
skip_malformed = false

[output]
output_dir = \"results\"
write_json = true
";
        sample.to_string()
    }
}
