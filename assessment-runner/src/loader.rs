//! Paired context/generation stream loading
//!
//! The generator writes one item per line to a responses file, aligned with
//! the contexts file it was prompted from. Both streams must have the same
//! number of lines; trailing whitespace on each line is generator noise and
//! is dropped.

use std::path::Path;

use itemgauge::RawGenerationUnit;

/// Error type for input loading
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("context/generation streams differ in length: {contexts} contexts, {generations} generations")]
    LengthMismatch { contexts: usize, generations: usize },
}

/// Load the two line-aligned streams into generation units.
pub fn load_generation_units(
    contexts_path: impl AsRef<Path>,
    generations_path: impl AsRef<Path>,
) -> Result<Vec<RawGenerationUnit>, LoadError> {
    let contexts = read_lines(contexts_path)?;
    let generations = read_lines(generations_path)?;

    if contexts.len() != generations.len() {
        return Err(LoadError::LengthMismatch {
            contexts: contexts.len(),
            generations: generations.len(),
        });
    }

    Ok(contexts
        .into_iter()
        .zip(generations)
        .map(|(context, generation)| RawGenerationUnit::new(context, generation))
        .collect())
}

fn read_lines(path: impl AsRef<Path>) -> Result<Vec<String>, LoadError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(content.lines().map(|l| l.trim_end().to_string()).collect())
}
