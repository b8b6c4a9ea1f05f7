//! Result types returned by the conversion entry points.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What a finished conversion produced.
///
/// Serialisable so the CLI can emit it with `--json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionReport {
    /// Where the PDF was written.
    pub output: PathBuf,
    /// Sources in the order they were rendered.
    pub sources: Vec<PathBuf>,
    /// Directory relative resources were resolved against.
    pub base_dir: PathBuf,
    /// Page-break markers in the assembled document (`sources.len() - 1`).
    pub page_breaks: usize,
    /// Size of the written PDF.
    pub pdf_bytes: usize,
    /// Engine that produced the PDF.
    pub engine: String,
    /// Wall-clock time for the whole conversion.
    pub duration_ms: u64,
}

impl ConversionReport {
    /// True when more than one source went into the PDF.
    pub fn is_merge(&self) -> bool {
        self.sources.len() > 1
    }
}
