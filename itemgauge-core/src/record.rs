//! QA record model, option repair, and the distinct-option quality filter

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Number of answer options every record must carry once repaired.
pub const NUM_OPTIONS: usize = 4;

/// Error type for record-level operations
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// Repair is impossible when there is no option to replicate from.
    #[error("record has no options to repair from")]
    NoOptions,

    /// Batch statistics are undefined over zero records.
    #[error("empty record batch")]
    EmptyBatch,
}

/// One line pair from the generation streams, not yet structured.
///
/// Consumed by [`crate::parser::parse_unit`] and discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawGenerationUnit {
    /// The passage the question was generated from.
    pub context: String,
    /// The raw separator-delimited generation output.
    pub generation: String,
}

impl RawGenerationUnit {
    pub fn new(context: impl Into<String>, generation: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            generation: generation.into(),
        }
    }
}

/// A structured multiple-choice item: question, source passage, and the
/// ordered answer options recovered from the generation output.
///
/// Records leave the parser with between 0 and [`NUM_OPTIONS`] options;
/// [`QaRecord::normalize_options`] repairs the count to exactly four before
/// the record is handed to the scoring ensembles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaRecord {
    pub question: String,
    pub context: String,
    pub options: Vec<String>,
}

impl QaRecord {
    pub fn new(
        question: impl Into<String>,
        context: impl Into<String>,
        options: Vec<String>,
    ) -> Self {
        Self {
            question: question.into(),
            context: context.into(),
            options,
        }
    }

    /// Number of distinct option strings, first-seen order, exact equality.
    pub fn distinct_option_count(&self) -> usize {
        self.options.iter().collect::<IndexSet<_>>().len()
    }

    /// True when the record carries four pairwise-distinct options.
    pub fn has_distinct_options(&self) -> bool {
        self.distinct_option_count() == NUM_OPTIONS
    }

    /// Repair the option list to exactly [`NUM_OPTIONS`] entries.
    ///
    /// Extra options are dropped from the end; missing options are filled by
    /// replicating the last provided option. Replication never invents
    /// content: a padded option is an exact duplicate, which downstream
    /// models treat as an equivalent (incorrect) choice. A record with zero
    /// options cannot be repaired and is rejected.
    pub fn normalize_options(&mut self) -> Result<(), RecordError> {
        if self.options.is_empty() {
            return Err(RecordError::NoOptions);
        }
        while self.options.len() > NUM_OPTIONS {
            self.options.pop();
        }
        while self.options.len() < NUM_OPTIONS {
            let last = self.options[self.options.len() - 1].clone();
            self.options.push(last);
        }
        Ok(())
    }
}

/// Fraction of records whose options are four pairwise-distinct strings.
///
/// Must be computed on records as parsed, before
/// [`QaRecord::normalize_options`]: padding duplicates the last option, so
/// normalization can only lower the distinct count, never repair it.
pub fn fraction_with_distinct_options(records: &[QaRecord]) -> Result<f64, RecordError> {
    if records.is_empty() {
        return Err(RecordError::EmptyBatch);
    }
    let valid = records.iter().filter(|r| r.has_distinct_options()).count();
    Ok(valid as f64 / records.len() as f64)
}
