//! Score sources — the inference collaborator boundary
//!
//! The runner never tokenizes text or drives an accelerator. It hands a
//! record batch to a [`ScoreSource`] and receives validated logit tensors
//! back; everything about models, devices, and batching is the source's
//! concern. The one implementation here reads tensors the inference side
//! exported to disk.

pub mod logit_file;

pub use logit_file::LogitFileSource;

use itemgauge::{ComplexityEnsemble, EnsembleError, QaEnsemble, QaRecord};

/// Error types for score-source operations
#[derive(Debug, thiserror::Error)]
pub enum ScoreSourceError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed logit export: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Ensemble(#[from] EnsembleError),

    #[error("invalid ensemble layout: {0}")]
    Layout(String),

    #[error("{task} export carries {got} models, configured layout expects {expected}")]
    ModelCountMismatch {
        task: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("{task} export covers {got} records but the batch has {expected}")]
    RecordCountMismatch {
        task: &'static str,
        expected: usize,
        got: usize,
    },
}

pub type ScoreResult<T> = Result<T, ScoreSourceError>;

/// A provider of per-option and per-class logits for a record batch.
pub trait ScoreSource {
    /// Identifies the source in logs and reports.
    fn name(&self) -> &str;

    /// QA logits `[model][record][option]` for the batch, group-tagged.
    fn qa_logits(&self, records: &[QaRecord]) -> ScoreResult<QaEnsemble>;

    /// Complexity logits `[model][record][class]` for the batch.
    fn complexity_logits(&self, records: &[QaRecord]) -> ScoreResult<ComplexityEnsemble>;
}
