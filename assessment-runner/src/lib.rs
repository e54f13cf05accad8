//! Assessment runner for machine-generated multiple-choice items
//!
//! Drives the itemgauge core over real inputs: two line-aligned text
//! streams (passages and raw generations), plus a logit export produced by
//! the inference side for the parsed batch. Produces one report per run
//! carrying the distinct-option fraction and the three ensemble scores,
//! each independently failable.
//!
//! # Pipeline
//!
//! 1. [`loader`] pairs the context and generation streams.
//! 2. `itemgauge::parse_batch` rebuilds records, surfacing malformed
//!    generations per record index.
//! 3. The distinct-option fraction is measured, then options are repaired
//!    to exactly four.
//! 4. A [`scorer::ScoreSource`] supplies group-tagged logit tensors.
//! 5. [`reporting`] prints the console report and writes the JSON summary.

pub mod config;
pub mod loader;
pub mod reporting;
pub mod scorer;

pub use config::Config;
