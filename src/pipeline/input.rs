//! Input resolution: validate a user-supplied path and read it as Markdown.
//!
//! Validation is split from reading so the orchestrator can check an entire
//! merge batch before touching any file contents (see
//! [`crate::config::ValidationMode`]).

use crate::error::MarkPdfError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The only extension recognised as Markdown (compared case-insensitively).
pub const MARKDOWN_EXTENSION: &str = "md";

/// A Markdown source that has been validated and fully read.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    path: PathBuf,
    text: String,
}

impl SourceDocument {
    /// Path the document was read from, as given by the caller.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Full Markdown text.
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Check if the path carries the Markdown extension.
pub fn has_markdown_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(MARKDOWN_EXTENSION))
}

/// Validate that `path` exists and looks like a Markdown file.
///
/// Existence is checked first so a missing `notes.txt` reports "not found"
/// rather than "wrong extension".
pub fn validate_source(path: &Path) -> Result<(), MarkPdfError> {
    if !path.exists() {
        return Err(MarkPdfError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    if !has_markdown_extension(path) {
        return Err(MarkPdfError::NotMarkdown {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Validate and read a Markdown source into memory.
///
/// The file is opened, read to the end, and closed before this returns.
pub fn read_source(path: &Path) -> Result<SourceDocument, MarkPdfError> {
    validate_source(path)?;

    let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => MarkPdfError::FileNotFound {
            path: path.to_path_buf(),
        },
        ErrorKind::PermissionDenied => MarkPdfError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => MarkPdfError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    debug!("Read {} bytes from {}", text.len(), path.display());
    Ok(SourceDocument {
        path: path.to_path_buf(),
        text,
    })
}

/// Directory containing `path`, made absolute when possible.
///
/// A bare file name such as `README.md` has an empty parent; that maps to the
/// current directory.
pub fn base_dir_of(path: &Path) -> PathBuf {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::path::absolute(&parent).unwrap_or(parent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_has_markdown_extension() {
        assert!(has_markdown_extension(Path::new("README.md")));
        assert!(has_markdown_extension(Path::new("docs/CHAPTER.MD")));
        assert!(!has_markdown_extension(Path::new("notes.markdown")));
        assert!(!has_markdown_extension(Path::new("notes.txt")));
        assert!(!has_markdown_extension(Path::new("Makefile")));
        assert!(!has_markdown_extension(Path::new(".md")));
    }

    #[test]
    fn missing_file_is_not_found_even_with_wrong_extension() {
        let err = validate_source(Path::new("/definitely/not/here.txt")).unwrap_err();
        assert!(matches!(err, MarkPdfError::FileNotFound { .. }), "got: {err:?}");
    }

    #[test]
    fn existing_non_markdown_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "# not markdown by name").unwrap();

        let err = read_source(&path).unwrap_err();
        assert!(matches!(err, MarkPdfError::NotMarkdown { .. }), "got: {err:?}");
    }

    #[test]
    fn reads_markdown_text() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.md");
        std::fs::write(&path, "# Title\n\nHello").unwrap();

        let doc = read_source(&path).unwrap();
        assert_eq!(doc.text(), "# Title\n\nHello");
        assert_eq!(doc.path(), path.as_path());
    }

    #[test]
    fn invalid_utf8_is_a_read_failure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("binary.md");
        std::fs::write(&path, [0xff, 0xfe, 0x00, 0x41]).unwrap();

        let err = read_source(&path).unwrap_err();
        assert!(matches!(err, MarkPdfError::ReadFailed { .. }), "got: {err:?}");
    }

    #[test]
    fn bare_file_name_resolves_to_current_dir() {
        let base = base_dir_of(Path::new("README.md"));
        assert!(base.is_absolute());
        assert_eq!(base, std::path::absolute(".").unwrap());
    }
}
