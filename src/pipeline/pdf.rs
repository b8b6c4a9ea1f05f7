//! PDF rendering: hand an assembled HTML document to an external engine.
//!
//! The rest of the crate only sees the two-argument surface of
//! [`PdfRenderer::render`]: a document string and a base directory in, PDF
//! bytes out. Page geometry is never passed explicitly; engines read it from
//! the `@page` rule in the embedded stylesheet.
//!
//! Two engines are supported, both driven as child processes:
//!
//! * [`WeasyPrintRenderer`] (default): `weasyprint --base-url <dir> in.html -`
//! * [`ChromiumRenderer`]: headless `--print-to-pdf`; the base directory is
//!   injected as a `<base href>` because Chromium resolves relative URLs
//!   against the document location otherwise
//!
//! The HTML is written to a [`TempDir`] that is removed when rendering
//! returns. Engine diagnostics are passed through unmodified.

use crate::error::MarkPdfError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::sync::Arc;
use tempfile::TempDir;
use tracing::{debug, warn};
use url::Url;

const INPUT_FILE_NAME: &str = "document.html";
const OUTPUT_FILE_NAME: &str = "document.pdf";

/// Lays out an HTML document and produces PDF bytes.
///
/// Relative resource references in `html` (images, etc.) must resolve against
/// `base_dir`. Implementations are swapped through
/// [`crate::config::ConversionConfigBuilder::renderer`].
pub trait PdfRenderer: Send + Sync {
    /// Short engine name for logs and reports.
    fn name(&self) -> &str;

    /// Render `html` to PDF bytes.
    fn render(&self, html: &str, base_dir: &Path) -> Result<Vec<u8>, MarkPdfError>;
}

/// Built-in external engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PdfEngine {
    /// WeasyPrint CLI (default).
    #[default]
    WeasyPrint,
    /// Headless Chromium / Chrome.
    Chromium,
}

impl PdfEngine {
    /// Executable looked up on `PATH` when no explicit path is configured.
    pub fn default_program(self) -> &'static str {
        match self {
            PdfEngine::WeasyPrint => "weasyprint",
            PdfEngine::Chromium => "chromium",
        }
    }

    /// Build a renderer for this engine, optionally overriding the executable.
    pub fn renderer(self, program: Option<&Path>) -> Arc<dyn PdfRenderer> {
        let program = program
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(self.default_program()));
        match self {
            PdfEngine::WeasyPrint => Arc::new(WeasyPrintRenderer::with_program(program)),
            PdfEngine::Chromium => Arc::new(ChromiumRenderer::with_program(program)),
        }
    }
}

impl fmt::Display for PdfEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PdfEngine::WeasyPrint => "weasyprint",
            PdfEngine::Chromium => "chromium",
        })
    }
}

// ── WeasyPrint ───────────────────────────────────────────────────────────────

/// Renders through the `weasyprint` command-line tool.
#[derive(Debug, Clone)]
pub struct WeasyPrintRenderer {
    program: PathBuf,
}

impl WeasyPrintRenderer {
    pub fn new() -> Self {
        Self::with_program(PdfEngine::WeasyPrint.default_program())
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Command line for one render: PDF goes to stdout.
    fn command(&self, input: &Path, base_dir: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("--base-url")
            .arg(dir_with_trailing_slash(base_dir))
            .arg("--encoding")
            .arg("utf-8")
            .arg(input)
            .arg("-")
            .stdin(Stdio::null());
        cmd
    }
}

impl Default for WeasyPrintRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfRenderer for WeasyPrintRenderer {
    fn name(&self) -> &str {
        "weasyprint"
    }

    fn render(&self, html: &str, base_dir: &Path) -> Result<Vec<u8>, MarkPdfError> {
        let workdir = scratch_dir()?;
        let input = workdir.path().join(INPUT_FILE_NAME);
        write_scratch(&input, html)?;

        let mut cmd = self.command(&input, base_dir);
        debug!("Running {:?}", cmd);
        let output = run(&mut cmd, &self.program)?;
        check_status(self.name(), &output)?;
        log_engine_warnings(self.name(), &output.stderr);

        verify_pdf(self.name(), output.stdout)
    }
}

// ── Chromium ─────────────────────────────────────────────────────────────────

/// Renders through headless Chromium's `--print-to-pdf`.
#[derive(Debug, Clone)]
pub struct ChromiumRenderer {
    program: PathBuf,
}

impl ChromiumRenderer {
    pub fn new() -> Self {
        Self::with_program(PdfEngine::Chromium.default_program())
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, input: &Path, output: &Path) -> Result<Command, MarkPdfError> {
        let mut print_to = std::ffi::OsString::from("--print-to-pdf=");
        print_to.push(output);

        let mut cmd = Command::new(&self.program);
        cmd.arg("--headless")
            .arg("--disable-gpu")
            .arg("--no-pdf-header-footer")
            .arg("--allow-file-access-from-files")
            .arg(print_to)
            .arg(file_url(input)?.as_str())
            .stdin(Stdio::null());
        Ok(cmd)
    }
}

impl Default for ChromiumRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfRenderer for ChromiumRenderer {
    fn name(&self) -> &str {
        "chromium"
    }

    fn render(&self, html: &str, base_dir: &Path) -> Result<Vec<u8>, MarkPdfError> {
        let workdir = scratch_dir()?;
        let input = workdir.path().join(INPUT_FILE_NAME);
        let pdf_path = workdir.path().join(OUTPUT_FILE_NAME);
        write_scratch(&input, &inject_base_href(html, base_dir)?)?;

        let mut cmd = self.command(&input, &pdf_path)?;
        debug!("Running {:?}", cmd);
        let output = run(&mut cmd, &self.program)?;
        check_status(self.name(), &output)?;

        let bytes = std::fs::read(&pdf_path).map_err(|e| MarkPdfError::RenderFailed {
            engine: self.name().to_string(),
            detail: format!(
                "no PDF written to {}: {e}\n{}",
                pdf_path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        })?;

        verify_pdf(self.name(), bytes)
    }
}

/// Insert `<base href="file:///…/">` right after `<head>` so relative
/// references resolve against `base_dir` instead of the scratch directory.
pub fn inject_base_href(html: &str, base_dir: &Path) -> Result<String, MarkPdfError> {
    let tag = format!(
        "\n  <base href=\"{}\">",
        html_escape::encode_double_quoted_attribute(directory_url(base_dir)?.as_str())
    );
    Ok(match html.find("<head>") {
        Some(pos) => {
            let at = pos + "<head>".len();
            let mut out = String::with_capacity(html.len() + tag.len());
            out.push_str(&html[..at]);
            out.push_str(&tag);
            out.push_str(&html[at..]);
            out
        }
        None => format!("{}\n{html}", tag.trim_start()),
    })
}

// ── Shared helpers ───────────────────────────────────────────────────────────

fn scratch_dir() -> Result<TempDir, MarkPdfError> {
    TempDir::with_prefix("markpdf-")
        .map_err(|e| MarkPdfError::Internal(format!("Failed to create temp dir: {e}")))
}

fn write_scratch(path: &Path, html: &str) -> Result<(), MarkPdfError> {
    std::fs::write(path, html)
        .map_err(|e| MarkPdfError::Internal(format!("Failed to write {}: {e}", path.display())))
}

fn run(cmd: &mut Command, program: &Path) -> Result<Output, MarkPdfError> {
    cmd.output().map_err(|e| MarkPdfError::RendererNotFound {
        program: program.display().to_string(),
        source: e,
    })
}

fn check_status(engine: &str, output: &Output) -> Result<(), MarkPdfError> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    let detail = if stderr.trim().is_empty() {
        format!("exited with {}", output.status)
    } else {
        stderr.trim_end().to_string()
    };
    Err(MarkPdfError::RenderFailed {
        engine: engine.to_string(),
        detail,
    })
}

/// Surface non-fatal engine messages (missing images, unsupported CSS).
fn log_engine_warnings(engine: &str, stderr: &[u8]) {
    for line in String::from_utf8_lossy(stderr).lines() {
        let line = line.trim();
        if !line.is_empty() {
            warn!("{engine}: {line}");
        }
    }
}

/// Reject engine output that does not start with the PDF magic bytes.
pub fn verify_pdf(engine: &str, bytes: Vec<u8>) -> Result<Vec<u8>, MarkPdfError> {
    if bytes.starts_with(b"%PDF") {
        Ok(bytes)
    } else {
        let head = &bytes[..bytes.len().min(8)];
        Err(MarkPdfError::RenderFailed {
            engine: engine.to_string(),
            detail: format!(
                "output is not a PDF ({} bytes, starts with {:?})",
                bytes.len(),
                String::from_utf8_lossy(head)
            ),
        })
    }
}

fn dir_with_trailing_slash(dir: &Path) -> PathBuf {
    let mut s = dir.as_os_str().to_os_string();
    if !s.to_string_lossy().ends_with(std::path::MAIN_SEPARATOR) {
        s.push(std::path::MAIN_SEPARATOR_STR);
    }
    PathBuf::from(s)
}

/// `file://` URL for a file. Relative paths are resolved against the
/// current directory first.
pub fn file_url(path: &Path) -> Result<Url, MarkPdfError> {
    let absolute = absolute_path(path)?;
    Url::from_file_path(&absolute).map_err(|()| {
        MarkPdfError::Internal(format!("Cannot express {} as a file URL", absolute.display()))
    })
}

/// `file://` URL for a directory, always ending in `/`.
pub fn directory_url(dir: &Path) -> Result<Url, MarkPdfError> {
    let absolute = absolute_path(dir)?;
    Url::from_directory_path(&absolute).map_err(|()| {
        MarkPdfError::Internal(format!(
            "Cannot express {} as a directory URL",
            absolute.display()
        ))
    })
}

fn absolute_path(path: &Path) -> Result<PathBuf, MarkPdfError> {
    std::path::absolute(path).map_err(|e| {
        MarkPdfError::Internal(format!("Cannot resolve {}: {e}", path.display()))
    })
}
