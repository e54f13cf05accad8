//! itemgauge - quality assessment for machine-generated multiple-choice items
//!
//! A generator writes reading-comprehension items as separator-delimited
//! lines; independently trained classifier ensembles score them. This crate
//! is the pure core of that pipeline:
//!
//! - [`parser`] rebuilds `{question, context, options}` records from the
//!   loosely delimited generation format,
//! - [`record`] repairs option counts to exactly four and measures how many
//!   items arrived with four distinct options,
//! - [`ensemble`] wraps the collaborator's logit tensors with validated
//!   shapes and explicit model-group tags,
//! - [`stats`] turns those tensors into three batch scalars:
//!   unanswerability (expected entropy), ensemble agreement, and ordinal
//!   complexity.
//!
//! Model loading, tokenization, and inference live behind the tensor
//! boundary and are not part of this crate.
//!
//! # Example
//!
//! ```rust
//! use itemgauge::{fraction_with_distinct_options, parse};
//!
//! let raw = "intro[SEP] Which metal is liquid at room temperature?\
//!            [SEP] Mercury[SEP] Iron[SEP] Gold[SEP] Tin";
//! let mut record = parse(raw, "The passage the item was generated from.").unwrap();
//!
//! assert_eq!(record.question, "Which metal is liquid at room temperature?");
//! assert_eq!(record.options.len(), 4);
//!
//! let fraction = fraction_with_distinct_options(std::slice::from_ref(&record)).unwrap();
//! assert_eq!(fraction, 1.0);
//!
//! record.normalize_options().unwrap();
//! ```

pub mod ensemble;
pub mod parser;
pub mod record;
pub mod stats;

pub use ensemble::{
    conventional_groups, ComplexityEnsemble, EnsembleError, ModelGroup, QaEnsemble,
    NUM_COMPLEXITY_CLASSES,
};
pub use parser::{parse, parse_batch, parse_unit, strip_enumerators, ParseError, Segments, SEPARATOR};
pub use record::{
    fraction_with_distinct_options, QaRecord, RawGenerationUnit, RecordError, NUM_OPTIONS,
};
pub use stats::{complexity, ensemble_agreement, unanswerability, ENTROPY_EPSILON, ORDINAL_WEIGHTS};
