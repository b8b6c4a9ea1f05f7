//! Progress-callback trait for conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the pipeline reads each source and renders the PDF.
//!
//! # Example
//!
//! ```rust
//! use markpdf::{ConversionProgressCallback, ConversionConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     rendered: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_source_complete(&self, index: usize, total: usize, html_len: usize) {
//!         self.rendered.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Source {}/{} done ({} bytes of HTML)", index, total, html_len);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     rendered: AtomicUsize::new(0),
//! });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by the conversion pipeline as it works through its sources.
///
/// Conversion is sequential, so events arrive in order on the calling thread.
/// The trait is still `Send + Sync` so one callback can be shared by several
/// configs. All methods default to no-ops.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before any source is read.
    ///
    /// # Arguments
    /// * `total_sources` — number of Markdown files in this conversion
    fn on_conversion_start(&self, total_sources: usize) {
        let _ = total_sources;
    }

    /// Called just before a source is read and rendered to HTML.
    ///
    /// # Arguments
    /// * `index` — 1-indexed position in the input list
    /// * `total` — number of sources
    /// * `path`  — the source path as given
    fn on_source_start(&self, index: usize, total: usize, path: &Path) {
        let _ = (index, total, path);
    }

    /// Called when a source has been rendered to an HTML fragment.
    ///
    /// # Arguments
    /// * `index`    — 1-indexed position in the input list
    /// * `total`    — number of sources
    /// * `html_len` — byte length of the fragment
    fn on_source_complete(&self, index: usize, total: usize, html_len: usize) {
        let _ = (index, total, html_len);
    }

    /// Called once the document is assembled, before the PDF engine runs.
    fn on_render_start(&self, engine: &str) {
        let _ = engine;
    }

    /// Called after the PDF has been written.
    ///
    /// # Arguments
    /// * `output`    — path of the written PDF
    /// * `pdf_bytes` — size of the PDF
    fn on_conversion_complete(&self, output: &Path, pdf_bytes: usize) {
        let _ = (output, pdf_bytes);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
