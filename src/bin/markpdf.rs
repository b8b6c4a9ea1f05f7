//! CLI binary for markpdf.
//!
//! A thin shim over the library crate that validates inputs, maps CLI flags
//! to `ConversionConfig`, and prints results.

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use markpdf::pipeline::input::validate_source;
use markpdf::{
    convert_merged, convert_single, ConversionConfig, ConversionProgressCallback,
    ConversionReport, MarkPdfError, PdfEngine, ProgressCallback, DEFAULT_MERGED_OUTPUT,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress: one bar per conversion, counting sources, then a
/// spinner message while the PDF engine runs.
struct CliProgressCallback {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            bar: Mutex::new(None),
        })
    }

    /// Remove the bar from the terminal, if one is showing.
    fn clear(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(bar) = guard.take() {
                bar.finish_and_clear();
            }
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(ref bar) = *guard {
                f(bar);
            }
        }
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_sources: usize) {
        let bar = ProgressBar::new(total_sources as u64);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:32.green/238}] {pos}/{len}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);
        bar.set_style(style);
        bar.set_prefix("Reading");
        bar.enable_steady_tick(Duration::from_millis(80));

        if let Ok(mut guard) = self.bar.lock() {
            *guard = Some(bar);
        }
    }

    fn on_source_start(&self, _index: usize, _total: usize, path: &Path) {
        self.with_bar(|bar| bar.set_message(path.display().to_string()));
    }

    fn on_source_complete(&self, _index: usize, _total: usize, _html_len: usize) {
        self.with_bar(|bar| bar.inc(1));
    }

    fn on_render_start(&self, engine: &str) {
        self.with_bar(|bar| {
            bar.set_prefix("Rendering");
            bar.set_message(format!("PDF via {engine}…"));
        });
    }

    fn on_conversion_complete(&self, _output: &Path, _pdf_bytes: usize) {
        self.clear();
    }
}

impl Drop for CliProgressCallback {
    fn drop(&mut self) {
        self.clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  markpdf README.md
  markpdf ch1.md ch2.md ch3.md
  markpdf ch1.md ch2.md -m -o book.pdf

NOTES:
  In merge mode, relative image paths in every file are resolved against
  the directory of the FIRST file. Existing output files are overwritten.

ENVIRONMENT VARIABLES:
  MARKPDF_ENGINE        PDF engine: weasyprint (default) or chromium
  MARKPDF_ENGINE_PATH   Path to the engine executable
  RUST_LOG              Override log filtering (e.g. markpdf=debug)
"#;

/// Convert Markdown files into beautifully styled PDFs.
#[derive(Parser, Debug)]
#[command(
    name = "markpdf",
    version,
    about = "Convert Markdown files into beautifully styled PDFs.",
    disable_version_flag = true,
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_help = AFTER_HELP
)]
struct Cli {
    /// One or more Markdown (.md) files to convert.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Merge all input files into a single PDF (with page breaks between files).
    #[arg(short, long)]
    merge: bool,

    /// Output filename. In merge mode defaults to 'merged_output.pdf';
    /// in separate mode sets the name for a single-file conversion.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print version.
    #[arg(short = 'v', long = "version", action = clap::ArgAction::Version)]
    version: Option<bool>,

    /// PDF engine used to lay out the document.
    #[arg(long, env = "MARKPDF_ENGINE", value_enum, default_value = "weasyprint")]
    engine: EngineArg,

    /// Path to the engine executable (default: looked up on PATH).
    #[arg(long, env = "MARKPDF_ENGINE_PATH")]
    engine_path: Option<PathBuf>,

    /// Print conversion reports as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "MARKPDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(long, env = "MARKPDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "MARKPDF_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum EngineArg {
    Weasyprint,
    Chromium,
}

impl From<EngineArg> for PdfEngine {
    fn from(v: EngineArg) -> Self {
        match v {
            EngineArg::Weasyprint => PdfEngine::WeasyPrint,
            EngineArg::Chromium => PdfEngine::Chromium,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar provides all the feedback that matters, so library
    // INFO logs are suppressed while it is shown.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Validate usage before touching any file ──────────────────────────
    if !cli.merge && cli.output.is_some() && cli.files.len() > 1 {
        Cli::command()
            .error(
                ErrorKind::ArgumentConflict,
                "--output can only be used with a single file in separate mode. \
                 Use --merge to combine files into one PDF.",
            )
            .exit();
    }

    for file in &cli.files {
        if let Err(e) = validate_source(file) {
            invalid_input(&e);
        }
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress = show_progress.then(CliProgressCallback::new);
    let config = build_config(&cli, progress.clone())?;

    // ── Run conversion ───────────────────────────────────────────────────
    let reports = match run_conversions(&cli, &config) {
        Ok(reports) => reports,
        Err(e) => {
            // Keep the error readable: no spinner line left above it.
            if let Some(ref progress) = progress {
                progress.clear();
            }
            let bad_input = e
                .downcast_ref::<MarkPdfError>()
                .filter(|inner| inner.is_invalid_input());
            if let Some(inner) = bad_input {
                invalid_input(inner);
            }
            return Err(e);
        }
    };

    if cli.json {
        let json =
            serde_json::to_string_pretty(&reports).context("Failed to serialise reports")?;
        println!("{json}");
    } else if cli.verbose && !cli.quiet {
        let total_ms: u64 = reports.iter().map(|r| r.duration_ms).sum();
        let total_bytes: usize = reports.iter().map(|r| r.pdf_bytes).sum();
        eprintln!(
            "   {}",
            dim(&format!(
                "{} PDF(s), {total_bytes} bytes, {total_ms}ms total",
                reports.len()
            ))
        );
    }

    Ok(())
}

/// Convert every input as requested, printing a line per written PDF.
fn run_conversions(cli: &Cli, config: &ConversionConfig) -> Result<Vec<ConversionReport>> {
    let mut reports: Vec<ConversionReport> = Vec::new();

    if cli.merge {
        let output = cli
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MERGED_OUTPUT));
        let report =
            convert_merged(&cli.files, Some(output.as_path()), config).context("Merge failed")?;
        if !cli.quiet && !cli.json {
            println!(
                "{}  Merged {} file(s)  →  {}",
                green("✔"),
                report.sources.len(),
                bold(&report.output.display().to_string())
            );
        }
        reports.push(report);
    } else {
        for file in &cli.files {
            let report = convert_single(file, cli.output.as_deref(), config)
                .with_context(|| format!("Failed to convert {}", file.display()))?;
            if !cli.quiet && !cli.json {
                println!(
                    "{}  {}  →  {}",
                    green("✔"),
                    file.display(),
                    bold(&report.output.display().to_string())
                );
            }
            reports.push(report);
        }
    }

    Ok(reports)
}

/// Bad input paths exit like any other usage error (status 2).
fn invalid_input(err: &MarkPdfError) -> ! {
    Cli::command().error(ErrorKind::ValueValidation, err).exit()
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<Arc<CliProgressCallback>>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder().engine(cli.engine.into());

    if let Some(ref path) = cli.engine_path {
        builder = builder.engine_path(path.clone());
    }

    if let Some(progress) = progress {
        let cb: ProgressCallback = progress;
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
