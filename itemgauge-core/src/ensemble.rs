//! Validated logit tensors for the QA and complexity ensembles
//!
//! Score tensors arrive from the inference collaborator as nested arrays
//! indexed `[model][record][option_or_class]`. Everything downstream assumes
//! rectangular shape, a fixed class axis, and a non-empty batch, so those
//! invariants are enforced here at construction; the statistics in
//! [`crate::stats`] then operate on known-good tensors.
//!
//! QA models carry an explicit group tag. The trained cohorts are
//! interchangeable files on disk and nothing in a raw tensor says which
//! model judges answerability and which simulates a best guess, so the tag
//! travels with the tensor instead of living in a loading-order convention.

use ndarray::{Array2, Array3, Axis};
use serde::{Deserialize, Serialize};

use crate::record::NUM_OPTIONS;

/// Number of ordinal difficulty buckets the complexity models emit.
pub const NUM_COMPLEXITY_CLASSES: usize = 3;

/// Role of one trained QA model within the six-model ensemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelGroup {
    /// Judges whether an item is answerable at all.
    Assessment,
    /// Simulates a best-guess answer, independent of the assessment cohort.
    Prediction,
}

/// Error type for score-tensor construction
#[derive(Debug, thiserror::Error)]
pub enum EnsembleError {
    #[error("no models in score tensor")]
    NoModels,

    #[error("empty record batch in score tensor")]
    EmptyBatch,

    #[error("model {model} covers {got} records, expected {expected}")]
    RaggedRecords {
        model: usize,
        expected: usize,
        got: usize,
    },

    #[error("model {model}, record {record}: {got} values on the class axis, expected {expected}")]
    WrongClassCount {
        model: usize,
        record: usize,
        expected: usize,
        got: usize,
    },

    #[error("class axis has {got} entries, expected {expected}")]
    ClassAxis { expected: usize, got: usize },

    #[error("{got} group tags for {models} models")]
    GroupCountMismatch { models: usize, got: usize },

    #[error("no models tagged as {group:?}")]
    MissingGroup { group: ModelGroup },
}

/// Logits from the QA ensemble: `[model][record][option]` with every model
/// tagged as assessment or prediction.
#[derive(Debug, Clone)]
pub struct QaEnsemble {
    logits: Array3<f64>,
    groups: Vec<ModelGroup>,
}

impl QaEnsemble {
    /// Wrap a logit tensor, validating shape and group coverage.
    pub fn new(logits: Array3<f64>, groups: Vec<ModelGroup>) -> Result<Self, EnsembleError> {
        let (models, records, classes) = logits.dim();
        if models == 0 {
            return Err(EnsembleError::NoModels);
        }
        if records == 0 {
            return Err(EnsembleError::EmptyBatch);
        }
        if classes != NUM_OPTIONS {
            return Err(EnsembleError::ClassAxis {
                expected: NUM_OPTIONS,
                got: classes,
            });
        }
        if groups.len() != models {
            return Err(EnsembleError::GroupCountMismatch {
                models,
                got: groups.len(),
            });
        }
        for group in [ModelGroup::Assessment, ModelGroup::Prediction] {
            if !groups.contains(&group) {
                return Err(EnsembleError::MissingGroup { group });
            }
        }
        Ok(Self { logits, groups })
    }

    /// Build from the collaborator's nested-array export, rejecting ragged
    /// input with the offending model/record index.
    pub fn from_nested(
        nested: &[Vec<Vec<f64>>],
        groups: Vec<ModelGroup>,
    ) -> Result<Self, EnsembleError> {
        let logits = nested_to_array(nested, NUM_OPTIONS)?;
        Self::new(logits, groups)
    }

    pub fn num_models(&self) -> usize {
        self.logits.dim().0
    }

    pub fn num_records(&self) -> usize {
        self.logits.dim().1
    }

    pub fn logits(&self) -> &Array3<f64> {
        &self.logits
    }

    pub fn groups(&self) -> &[ModelGroup] {
        &self.groups
    }

    /// Model indices tagged with `group`. Non-empty by construction.
    pub fn group_members(&self, group: ModelGroup) -> Vec<usize> {
        self.groups
            .iter()
            .enumerate()
            .filter(|(_, g)| **g == group)
            .map(|(i, _)| i)
            .collect()
    }

    /// Mean logits across the models of one group: `[record][option]`.
    pub fn group_mean_logits(&self, group: ModelGroup) -> Array2<f64> {
        let members = self.group_members(group);
        let (_, records, classes) = self.logits.dim();
        let mut mean = Array2::<f64>::zeros((records, classes));
        for &model in &members {
            mean += &self.logits.index_axis(Axis(0), model);
        }
        mean / members.len() as f64
    }
}

/// Logits from the complexity ensemble: `[model][record][class]` over the
/// three ordinal difficulty buckets. The cohort is unordered; no group tags.
#[derive(Debug, Clone)]
pub struct ComplexityEnsemble {
    logits: Array3<f64>,
}

impl ComplexityEnsemble {
    pub fn new(logits: Array3<f64>) -> Result<Self, EnsembleError> {
        let (models, records, classes) = logits.dim();
        if models == 0 {
            return Err(EnsembleError::NoModels);
        }
        if records == 0 {
            return Err(EnsembleError::EmptyBatch);
        }
        if classes != NUM_COMPLEXITY_CLASSES {
            return Err(EnsembleError::ClassAxis {
                expected: NUM_COMPLEXITY_CLASSES,
                got: classes,
            });
        }
        Ok(Self { logits })
    }

    pub fn from_nested(nested: &[Vec<Vec<f64>>]) -> Result<Self, EnsembleError> {
        let logits = nested_to_array(nested, NUM_COMPLEXITY_CLASSES)?;
        Self::new(logits)
    }

    pub fn num_models(&self) -> usize {
        self.logits.dim().0
    }

    pub fn num_records(&self) -> usize {
        self.logits.dim().1
    }

    pub fn logits(&self) -> &Array3<f64> {
        &self.logits
    }
}

/// Convert a nested `[model][record][class]` export into a dense tensor,
/// failing fast on ragged shapes.
fn nested_to_array(nested: &[Vec<Vec<f64>>], classes: usize) -> Result<Array3<f64>, EnsembleError> {
    let models = nested.len();
    if models == 0 {
        return Err(EnsembleError::NoModels);
    }
    let records = nested[0].len();
    if records == 0 {
        return Err(EnsembleError::EmptyBatch);
    }

    for (m, per_model) in nested.iter().enumerate() {
        if per_model.len() != records {
            return Err(EnsembleError::RaggedRecords {
                model: m,
                expected: records,
                got: per_model.len(),
            });
        }
        for (r, row) in per_model.iter().enumerate() {
            if row.len() != classes {
                return Err(EnsembleError::WrongClassCount {
                    model: m,
                    record: r,
                    expected: classes,
                    got: row.len(),
                });
            }
        }
    }

    let mut array = Array3::<f64>::zeros((models, records, classes));
    for (m, per_model) in nested.iter().enumerate() {
        for (r, row) in per_model.iter().enumerate() {
            for (c, &value) in row.iter().enumerate() {
                array[[m, r, c]] = value;
            }
        }
    }
    Ok(array)
}

/// Group tags for the conventional six-model layout: the first
/// `assessment_models` are the assessment cohort, the rest prediction.
pub fn conventional_groups(
    total_models: usize,
    assessment_models: usize,
) -> Result<Vec<ModelGroup>, EnsembleError> {
    if total_models == 0 {
        return Err(EnsembleError::NoModels);
    }
    if assessment_models == 0 {
        return Err(EnsembleError::MissingGroup {
            group: ModelGroup::Assessment,
        });
    }
    if assessment_models >= total_models {
        return Err(EnsembleError::MissingGroup {
            group: ModelGroup::Prediction,
        });
    }
    let mut groups = vec![ModelGroup::Assessment; assessment_models];
    groups.extend(vec![ModelGroup::Prediction; total_models - assessment_models]);
    Ok(groups)
}
