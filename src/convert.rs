//! Conversion entry points.
//!
//! Both public conversions run the same sequence, split in two halves so the
//! assembled HTML can be inspected without a PDF engine:
//!
//! ```text
//! prepare_*        read → render fragment(s) → assemble   (pure, no engine)
//! render_prepared  PDF engine → write output file
//! ```
//!
//! Everything is synchronous. Sources are read fully and closed before the
//! next one is opened, and the output file is the only thing written.

use crate::config::{ConversionConfig, ValidationMode};
use crate::error::MarkPdfError;
use crate::output::ConversionReport;
use crate::pipeline::assemble::{assemble, AssembledDocument};
use crate::pipeline::input::{self, base_dir_of};
use crate::pipeline::markdown::{self, Fragment};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Output file used by [`convert_merged`] when none is given.
pub const DEFAULT_MERGED_OUTPUT: &str = "merged_output.pdf";

/// An assembled document plus what the PDF engine needs to render it.
#[derive(Debug, Clone)]
pub struct PreparedDocument {
    /// The complete HTML document.
    pub document: AssembledDocument,
    /// Directory relative resources resolve against. For a merge this is the
    /// directory of the first source, for every fragment.
    pub base_dir: PathBuf,
    /// Sources in document order.
    pub sources: Vec<PathBuf>,
}

/// Default output for a single conversion: the input path with a `.pdf`
/// extension, next to the input.
pub fn default_single_output(input: &Path) -> PathBuf {
    input.with_extension("pdf")
}

/// Convert one Markdown file to PDF.
///
/// # Arguments
/// * `input`  — path to a `.md` file
/// * `output` — destination; defaults to [`default_single_output`]
/// * `config` — conversion configuration
///
/// An existing file at the destination is replaced without warning.
///
/// # Errors
/// * `FileNotFound` / `NotMarkdown` / `ReadFailed` for a bad source
/// * `RendererNotFound` / `RenderFailed` from the PDF engine
/// * `OutputWriteFailed` if the PDF cannot be written
pub fn convert_single(
    input: impl AsRef<Path>,
    output: Option<&Path>,
    config: &ConversionConfig,
) -> Result<ConversionReport, MarkPdfError> {
    let started = Instant::now();
    let input = input.as_ref();
    info!("Starting conversion: {}", input.display());

    let prepared = prepare_single(input, config)?;
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_single_output(input));

    let report = finish(&prepared, &output, config, started)?;
    info!("Converted {} → {}", input.display(), report.output.display());
    Ok(report)
}

/// Merge several Markdown files into one PDF, in the order given.
///
/// A page break separates consecutive sources. Relative resources from *every*
/// source resolve against the directory of the first one.
///
/// # Arguments
/// * `inputs` — non-empty, ordered list of `.md` files
/// * `output` — destination; defaults to [`DEFAULT_MERGED_OUTPUT`]
/// * `config` — conversion configuration; `config.validation` decides whether
///   all inputs are checked before any is rendered
///
/// # Errors
/// `NoInputs` for an empty list, plus everything [`convert_single`] returns.
/// Any failure aborts the merge before the output file is touched.
pub fn convert_merged<P: AsRef<Path>>(
    inputs: &[P],
    output: Option<&Path>,
    config: &ConversionConfig,
) -> Result<ConversionReport, MarkPdfError> {
    let started = Instant::now();
    info!("Starting merge of {} file(s)", inputs.len());

    let prepared = prepare_merged(inputs, config)?;
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MERGED_OUTPUT));

    let report = finish(&prepared, &output, config, started)?;
    info!(
        "Merged {} file(s) → {}",
        report.sources.len(),
        report.output.display()
    );
    Ok(report)
}

/// Read, render and assemble one source without running a PDF engine.
pub fn prepare_single(
    input: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<PreparedDocument, MarkPdfError> {
    let path = input.as_ref();

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(1);
    }

    let fragment = render_source(1, 1, path, config)?;
    let document = assemble(&[&fragment.html], &config.stylesheet, fragment.title.as_deref())?;

    Ok(PreparedDocument {
        document,
        base_dir: base_dir_of(path),
        sources: vec![path.to_path_buf()],
    })
}

/// Read, render and assemble several sources without running a PDF engine.
pub fn prepare_merged<P: AsRef<Path>>(
    inputs: &[P],
    config: &ConversionConfig,
) -> Result<PreparedDocument, MarkPdfError> {
    let first = inputs.first().ok_or(MarkPdfError::NoInputs)?.as_ref();
    let total = inputs.len();

    if config.validation == ValidationMode::Upfront {
        for path in inputs {
            input::validate_source(path.as_ref())?;
        }
        debug!("Validated {} source(s) upfront", total);
    }

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(total);
    }

    let mut fragments: Vec<String> = Vec::with_capacity(total);
    let mut title: Option<String> = None;

    for (i, path) in inputs.iter().enumerate() {
        let fragment = render_source(i + 1, total, path.as_ref(), config)?;
        if i == 0 {
            title = fragment.title;
        }
        fragments.push(fragment.html);
    }

    let document = assemble(&fragments, &config.stylesheet, title.as_deref())?;
    debug!(
        "Assembled {} fragment(s) with {} page break(s)",
        document.fragment_count(),
        document.page_breaks()
    );

    Ok(PreparedDocument {
        document,
        base_dir: base_dir_of(first),
        sources: inputs.iter().map(|p| p.as_ref().to_path_buf()).collect(),
    })
}

/// Run the PDF engine over a prepared document and write the result.
///
/// The output is written in one go after the engine succeeds, so a failed
/// render never leaves a partial file behind.
pub fn render_prepared(
    prepared: &PreparedDocument,
    output: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionReport, MarkPdfError> {
    finish(prepared, output.as_ref(), config, Instant::now())
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn render_source(
    index: usize,
    total: usize,
    path: &Path,
    config: &ConversionConfig,
) -> Result<Fragment, MarkPdfError> {
    if let Some(ref cb) = config.progress_callback {
        cb.on_source_start(index, total, path);
    }

    let source = input::read_source(path)?;
    let fragment = markdown::render_fragment(source.text());
    debug!(
        "Source {}/{} {}: {} bytes of HTML",
        index,
        total,
        source.path().display(),
        fragment.html.len()
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_source_complete(index, total, fragment.html.len());
    }
    Ok(fragment)
}

fn finish(
    prepared: &PreparedDocument,
    output: &Path,
    config: &ConversionConfig,
    started: Instant,
) -> Result<ConversionReport, MarkPdfError> {
    let renderer = config.resolve_renderer();
    if let Some(ref cb) = config.progress_callback {
        cb.on_render_start(renderer.name());
    }

    debug!(
        "Rendering {} bytes of HTML with {} (base dir {})",
        prepared.document.html().len(),
        renderer.name(),
        prepared.base_dir.display()
    );
    let pdf = renderer.render(prepared.document.html(), &prepared.base_dir)?;
    write_output(output, &pdf)?;

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(output, pdf.len());
    }

    Ok(ConversionReport {
        output: output.to_path_buf(),
        sources: prepared.sources.clone(),
        base_dir: prepared.base_dir.clone(),
        page_breaks: prepared.document.page_breaks(),
        pdf_bytes: pdf.len(),
        engine: renderer.name().to_string(),
        duration_ms: started.elapsed().as_millis() as u64,
    })
}

/// Write the PDF, replacing any existing file. Missing parent directories
/// are created.
fn write_output(path: &Path, pdf: &[u8]) -> Result<(), MarkPdfError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| MarkPdfError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
    }

    std::fs::write(path, pdf).map_err(|e| MarkPdfError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    debug!("Wrote {} bytes to {}", pdf.len(), path.display());
    Ok(())
}
