//! Parser for separator-delimited generation output
//!
//! Generators emit one item per line, with every newline of the raw
//! completion replaced by `" [SEP] "`. A well-formed line therefore looks
//! like
//!
//! ```text
//!  [SEP] Who wrote the passage? [SEP] A. Poe [SEP] B. Twain [SEP] C. Woolf [SEP] D. Keats
//! ```
//!
//! where the text before the first separator is prompt or blank-line
//! residue, the next segment is the question, and the remaining segments are
//! answer options, usually decorated with enumerator artifacts ("1.", "A)",
//! "c.") that the model was never asked for.
//!
//! The parser is a stateless pass over the line: collapse doubled
//! separators, strip enumerators, then walk the segments.

use crate::record::{QaRecord, RawGenerationUnit, NUM_OPTIONS};

/// The fixed delimiter between question, context echo, and each option in
/// the generation format. Part of the format contract, not a tunable.
pub const SEPARATOR: &str = "[SEP]";

/// Enumerator artifacts stripped from generations, each with one leading and
/// one trailing space. Matching is exact-substring: a coincidental
/// mid-sentence occurrence (e.g. "vitamin a. deficiency") is stripped too.
/// That over-reach is an accepted property of the format, kept because
/// option text almost never contains these sequences.
const ENUMERATOR_PATTERNS: [&str; 20] = [
    " 1. ", " 2. ", " 3. ", " 4. ",
    " A. ", " B. ", " C. ", " D. ",
    " A) ", " B) ", " C) ", " D) ",
    " a) ", " b) ", " c) ", " d) ",
    " a. ", " b. ", " c. ", " d. ",
];

/// Error type for generation parsing
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The line contains no separator token at all, so no question/option
    /// boundary exists. Surfaced per record; batch callers attach the
    /// record index via position in [`parse_batch`] output.
    #[error("no separator token in generation: {raw:?}")]
    MissingSeparator { raw: String },
}

/// Iterator over separator-delimited segments of a generation line.
///
/// Yields the text before the first separator, then the text between each
/// consecutive pair, then the unterminated tail. Exactly one character is
/// skipped after each separator (the space the format always emits there);
/// segment text up to the next separator is yielded verbatim, trailing
/// spaces included.
pub struct Segments<'a> {
    rest: &'a str,
    done: bool,
}

impl<'a> Segments<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            rest: input,
            done: false,
        }
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.done {
            return None;
        }
        match self.rest.find(SEPARATOR) {
            Some(pos) => {
                let segment = &self.rest[..pos];
                let tail = &self.rest[pos + SEPARATOR.len()..];
                // skip the single post-separator character
                let mut chars = tail.chars();
                chars.next();
                self.rest = chars.as_str();
                Some(segment)
            }
            None => {
                self.done = true;
                Some(self.rest)
            }
        }
    }
}

/// Collapse the residue of a blank generated line. A completion starting
/// with `"\n\n"` arrives as `"[SEP]  [SEP]"` (two interior spaces); each
/// such pair folds into a single separator. One pass, matching the
/// generation-side substitution exactly.
fn collapse_doubled_separators(text: &str) -> String {
    let doubled = format!("{SEPARATOR}  {SEPARATOR}");
    text.replace(&doubled, SEPARATOR)
}

/// Remove enumerator artifacts, replacing each with a single space.
///
/// Substring-based and order-independent across the supported forms. For a
/// single inserted prefix the operation is idempotent: the replacement
/// leaves no new ` X. `-shaped sequence behind.
pub fn strip_enumerators(text: &str) -> String {
    let mut out = text.to_string();
    for pattern in ENUMERATOR_PATTERNS {
        out = out.replace(pattern, " ");
    }
    out
}

/// Parse one generation line into a [`QaRecord`].
///
/// The segment before the first separator is discarded, the following
/// segment becomes the question, and up to [`NUM_OPTIONS`] further segments
/// become options. Fewer segments yield a short option list for the
/// normalizer to resolve; extra segments beyond four are ignored.
pub fn parse(generation: &str, context: &str) -> Result<QaRecord, ParseError> {
    let cleaned = strip_enumerators(&collapse_doubled_separators(generation));
    let mut segments = Segments::new(&cleaned);

    // Prompt/blank-line residue before the first separator.
    let _residue = segments.next();

    let question = match segments.next() {
        Some(q) => q.to_string(),
        None => {
            return Err(ParseError::MissingSeparator {
                raw: generation.to_string(),
            })
        }
    };

    let options: Vec<String> = segments.take(NUM_OPTIONS).map(str::to_string).collect();

    Ok(QaRecord::new(question, context, options))
}

/// Parse one [`RawGenerationUnit`].
pub fn parse_unit(unit: &RawGenerationUnit) -> Result<QaRecord, ParseError> {
    parse(&unit.generation, &unit.context)
}

/// Parse a batch, surfacing failures per record.
///
/// One malformed generation must not discard the run: each element of the
/// returned vector is the outcome for the unit at the same index, so callers
/// can skip, log, or abort with a precise record index.
pub fn parse_batch(units: &[RawGenerationUnit]) -> Vec<Result<QaRecord, ParseError>> {
    units.iter().map(parse_unit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTEXT: &str = "The passage under test.";

    #[test]
    fn parses_a_well_formed_generation() {
        let raw = " [SEP] Who wrote the passage?[SEP] Poe[SEP] Twain[SEP] Woolf[SEP] Keats";
        let record = parse(raw, CONTEXT).unwrap();
        assert_eq!(record.question, "Who wrote the passage?");
        assert_eq!(record.context, CONTEXT);
        assert_eq!(record.options, vec!["Poe", "Twain", "Woolf", "Keats"]);
    }

    #[test]
    fn round_trips_a_synthetic_record() {
        let question = "Which metal is liquid at room temperature?";
        let options = ["Mercury", "Iron", "Gold", "Tin"];
        let raw = format!(
            "intro[SEP] {}[SEP] {}[SEP] {}[SEP] {}[SEP] {}",
            question, options[0], options[1], options[2], options[3]
        );
        let record = parse(&raw, CONTEXT).unwrap();
        assert_eq!(record.question, question);
        assert_eq!(record.options, options);
    }

    #[test]
    fn keeps_segment_text_verbatim_including_trailing_spaces() {
        let raw = "x [SEP] A question? [SEP] one [SEP] two";
        let record = parse(raw, CONTEXT).unwrap();
        assert_eq!(record.question, "A question? ");
        assert_eq!(record.options, vec!["one ", "two"]);
    }

    #[test]
    fn collapses_blank_line_residue() {
        let raw = " [SEP]  [SEP] The question?[SEP] a[SEP] b[SEP] c[SEP] d";
        let record = parse(raw, CONTEXT).unwrap();
        assert_eq!(record.question, "The question?");
        assert_eq!(record.options.len(), 4);
    }

    #[test]
    fn strips_each_supported_enumerator_form() {
        for prefix in ["1. ", "B) ", "c. ", "d) ", "A. "] {
            let raw = format!(
                "x[SEP] Q?[SEP] {}first[SEP] second[SEP] third[SEP] fourth",
                prefix
            );
            let record = parse(&raw, CONTEXT).unwrap();
            assert_eq!(record.options[0], "first", "prefix {:?} survived", prefix);
        }
    }

    #[test]
    fn enumerator_stripping_is_idempotent() {
        let once = strip_enumerators("pick 1. the first or b) the second");
        let twice = strip_enumerators(&once);
        assert_eq!(once, twice);
        assert_eq!(once, "pick the first or the second");
    }

    #[test]
    fn strips_coincidental_mid_sentence_matches() {
        // Accepted heuristic over-reach: the pattern fires inside option text.
        let stripped = strip_enumerators("low vitamin a. levels");
        assert_eq!(stripped, "low vitamin levels");
    }

    #[test]
    fn stops_collecting_after_four_options() {
        let raw = "x[SEP] Q?[SEP] a[SEP] b[SEP] c[SEP] d[SEP] e[SEP] f";
        let record = parse(raw, CONTEXT).unwrap();
        assert_eq!(record.options, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn short_generations_yield_short_option_lists() {
        let raw = "x[SEP] Q?[SEP] only one";
        let record = parse(raw, CONTEXT).unwrap();
        assert_eq!(record.options, vec!["only one"]);

        let raw = "x[SEP] Q?";
        let record = parse(raw, CONTEXT).unwrap();
        assert!(record.options.is_empty());
    }

    #[test]
    fn unterminated_tail_becomes_the_last_option() {
        let raw = "x[SEP] Q?[SEP] a[SEP] b[SEP] c[SEP] no trailing separator here";
        let record = parse(raw, CONTEXT).unwrap();
        assert_eq!(record.options[3], "no trailing separator here");
    }

    #[test]
    fn rejects_generations_without_any_separator() {
        let err = parse("free-form text with no structure", CONTEXT).unwrap_err();
        match err {
            ParseError::MissingSeparator { raw } => {
                assert!(raw.contains("free-form"));
            }
        }
    }

    #[test]
    fn batch_surfaces_failures_by_index() {
        let units = vec![
            RawGenerationUnit::new("c0", "x[SEP] Q0?[SEP] a[SEP] b[SEP] c[SEP] d"),
            RawGenerationUnit::new("c1", "garbage without separators"),
            RawGenerationUnit::new("c2", "x[SEP] Q2?[SEP] a[SEP] b[SEP] c[SEP] d"),
        ];
        let outcomes = parse_batch(&units);
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].is_ok());
        assert!(outcomes[1].is_err());
        assert!(outcomes[2].is_ok());
        assert_eq!(outcomes[2].as_ref().unwrap().question, "Q2?");
    }

    #[test]
    fn segment_iterator_walks_the_whole_line() {
        let segments: Vec<&str> = Segments::new("a[SEP] b[SEP] c").collect();
        assert_eq!(segments, vec!["a", "b", "c"]);

        let segments: Vec<&str> = Segments::new("no separator").collect();
        assert_eq!(segments, vec!["no separator"]);
    }

    #[test]
    fn segment_after_trailing_separator_is_empty() {
        let segments: Vec<&str> = Segments::new("a[SEP] b[SEP]").collect();
        assert_eq!(segments, vec!["a", "b", ""]);
    }
}
