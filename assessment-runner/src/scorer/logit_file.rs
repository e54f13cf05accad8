//! Precomputed logit tensors exported by the inference collaborator
//!
//! Export format, one JSON document:
//!
//! ```json
//! {
//!   "qa":         [[[...4 floats...], ...records...], ...models...],
//!   "complexity": [[[...3 floats...], ...records...], ...models...]
//! }
//! ```
//!
//! Model order in the `qa` tensor follows the export convention: assessment
//! cohort first, prediction cohort after. The configured ensemble layout
//! turns that ordering into explicit group tags at load time, so nothing
//! downstream depends on positions.

use serde::Deserialize;

use itemgauge::{ComplexityEnsemble, QaEnsemble, QaRecord};

use super::{ScoreResult, ScoreSource, ScoreSourceError};
use crate::config::EnsembleLayout;

#[derive(Debug, Deserialize)]
struct LogitExport {
    qa: Vec<Vec<Vec<f64>>>,
    complexity: Vec<Vec<Vec<f64>>>,
}

/// Score source backed by a logit export file.
#[derive(Debug)]
pub struct LogitFileSource {
    name: String,
    qa: QaEnsemble,
    complexity: ComplexityEnsemble,
}

impl LogitFileSource {
    /// Read and validate an export against the configured layout.
    pub fn from_file(
        path: impl AsRef<std::path::Path>,
        layout: &EnsembleLayout,
    ) -> ScoreResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ScoreSourceError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let export: LogitExport = serde_json::from_str(&content)?;
        Self::from_export(path.display().to_string(), export, layout)
    }

    fn from_export(
        name: String,
        export: LogitExport,
        layout: &EnsembleLayout,
    ) -> ScoreResult<Self> {
        if export.qa.len() != layout.qa_models {
            return Err(ScoreSourceError::ModelCountMismatch {
                task: "qa",
                expected: layout.qa_models,
                got: export.qa.len(),
            });
        }
        if export.complexity.len() != layout.complexity_models {
            return Err(ScoreSourceError::ModelCountMismatch {
                task: "complexity",
                expected: layout.complexity_models,
                got: export.complexity.len(),
            });
        }

        let groups = layout
            .qa_group_tags()
            .map_err(|e| ScoreSourceError::Layout(e.to_string()))?;

        let qa = QaEnsemble::from_nested(&export.qa, groups)?;
        let complexity = ComplexityEnsemble::from_nested(&export.complexity)?;

        Ok(Self {
            name,
            qa,
            complexity,
        })
    }
}

impl ScoreSource for LogitFileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn qa_logits(&self, records: &[QaRecord]) -> ScoreResult<QaEnsemble> {
        if self.qa.num_records() != records.len() {
            return Err(ScoreSourceError::RecordCountMismatch {
                task: "qa",
                expected: records.len(),
                got: self.qa.num_records(),
            });
        }
        Ok(self.qa.clone())
    }

    fn complexity_logits(&self, records: &[QaRecord]) -> ScoreResult<ComplexityEnsemble> {
        if self.complexity.num_records() != records.len() {
            return Err(ScoreSourceError::RecordCountMismatch {
                task: "complexity",
                expected: records.len(),
                got: self.complexity.num_records(),
            });
        }
        Ok(self.complexity.clone())
    }
}
