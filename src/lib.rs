//! # markpdf
//!
//! Convert Markdown files into styled, paginated PDFs, one PDF per file or
//! merged into a single PDF with a page break between sources.
//!
//! ## Pipeline Overview
//!
//! ```text
//! .md files
//!  │
//!  ├─ 1. Input     validate extension/existence, read UTF-8 text
//!  ├─ 2. Markdown  pulldown-cmark → HTML fragment (ids, [TOC], highlighting)
//!  ├─ 3. Assemble  one HTML document, inline CSS, page breaks between fragments
//!  ├─ 4. PDF       external engine (WeasyPrint or headless Chromium)
//!  └─ 5. Output    PDF written to disk, ConversionReport returned
//! ```
//!
//! Page size and margins come from the `@page` rule in the embedded
//! stylesheet (A4, 2.5cm/2cm by default). Markdown parsing and PDF layout are
//! both delegated; this crate only orchestrates them.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use markpdf::{convert_merged, convert_single, ConversionConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), markpdf::MarkPdfError> {
//!     let config = ConversionConfig::default();
//!
//!     // README.md → README.pdf
//!     let report = convert_single("README.md", None, &config)?;
//!     println!("wrote {}", report.output.display());
//!
//!     // ch1.md + ch2.md → book.pdf, images resolved next to ch1.md
//!     convert_merged(&["ch1.md", "ch2.md"], Some(Path::new("book.pdf")), &config)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `markpdf` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod styles;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, ValidationMode};
pub use convert::{
    convert_merged, convert_single, default_single_output, prepare_merged, prepare_single,
    render_prepared, PreparedDocument, DEFAULT_MERGED_OUTPUT,
};
pub use error::MarkPdfError;
pub use output::ConversionReport;
pub use pipeline::assemble::{assemble, AssembledDocument, Stylesheet};
pub use pipeline::markdown::{render_fragment, Fragment};
pub use pipeline::pdf::{ChromiumRenderer, PdfEngine, PdfRenderer, WeasyPrintRenderer};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use styles::{DEFAULT_STYLESHEET, PAGE_BREAK};
