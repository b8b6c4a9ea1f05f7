//! Error types for the markpdf library.
//!
//! A single error type, [`MarkPdfError`], covers every way a conversion can
//! fail. The variants fall into two families:
//!
//! * **Invalid input**: a source file is missing, unreadable, or not a
//!   Markdown file. These are detected before any PDF engine runs and always
//!   name the offending path.
//!
//! * **Rendering**: the external PDF engine could not be started, exited with
//!   a failure, or produced something that is not a PDF. The engine's own
//!   diagnostics are carried through verbatim in `detail`.
//!
//! Nothing in the crate terminates the process; only the `markpdf` binary maps
//! these errors to exit codes.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the markpdf library.
#[derive(Debug, Error)]
pub enum MarkPdfError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Source file was not found at the given path.
    #[error("File not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// Source file exists but does not carry the `.md` extension.
    #[error("Expected a .md file, got: '{path}'")]
    NotMarkdown { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// Any other failure reading a source (including invalid UTF-8).
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A merge was requested with an empty input list.
    #[error("No input files given; at least one Markdown file is required")]
    NoInputs,

    // ── Rendering errors ──────────────────────────────────────────────────
    /// The PDF engine executable could not be started.
    #[error(
        "Failed to start PDF engine '{program}': {source}\n\n\
Install it or point markpdf at an existing copy:\n\
  • WeasyPrint: pip install weasyprint\n\
  • Chromium:   use --engine chromium\n\
  • Or set MARKPDF_ENGINE_PATH=/path/to/executable\n"
    )]
    RendererNotFound {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The PDF engine ran but did not produce a PDF.
    #[error("PDF engine '{engine}' failed:\n{detail}")]
    RenderFailed { engine: String, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output PDF file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MarkPdfError {
    /// True for errors caused by a bad source path rather than by rendering.
    ///
    /// The CLI reports these as usage errors (exit status 2), including
    /// read failures that only show up after validation passed.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            MarkPdfError::FileNotFound { .. }
                | MarkPdfError::NotMarkdown { .. }
                | MarkPdfError::PermissionDenied { .. }
                | MarkPdfError::ReadFailed { .. }
                | MarkPdfError::NoInputs
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_not_found_names_path() {
        let e = MarkPdfError::FileNotFound {
            path: PathBuf::from("docs/missing.md"),
        };
        assert!(e.to_string().contains("docs/missing.md"), "got: {e}");
        assert!(e.is_invalid_input());
    }

    #[test]
    fn not_markdown_display() {
        let e = MarkPdfError::NotMarkdown {
            path: PathBuf::from("notes.txt"),
        };
        let msg = e.to_string();
        assert!(msg.contains(".md"), "got: {msg}");
        assert!(msg.contains("notes.txt"), "got: {msg}");
    }

    #[test]
    fn render_failed_keeps_engine_detail_verbatim() {
        let detail = "ERROR: Failed to load image at \"file:///x/missing.png\"";
        let e = MarkPdfError::RenderFailed {
            engine: "weasyprint".into(),
            detail: detail.into(),
        };
        assert!(e.to_string().contains(detail));
        assert!(!e.is_invalid_input());
    }

    #[test]
    fn renderer_not_found_has_hint() {
        let e = MarkPdfError::RendererNotFound {
            program: "weasyprint".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        let msg = e.to_string();
        assert!(msg.contains("weasyprint"));
        assert!(msg.contains("MARKPDF_ENGINE_PATH"));
    }
}
