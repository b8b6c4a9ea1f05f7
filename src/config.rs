//! Configuration types for Markdown-to-PDF conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The defaults are what the `markpdf`
//! binary uses: the built-in stylesheet, upfront validation, and WeasyPrint
//! found on `PATH`.

use crate::error::MarkPdfError;
use crate::pipeline::assemble::Stylesheet;
use crate::pipeline::pdf::{PdfEngine, PdfRenderer};
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for a conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use markpdf::{ConversionConfig, PdfEngine, ValidationMode};
///
/// let config = ConversionConfig::builder()
///     .engine(PdfEngine::Chromium)
///     .validation(ValidationMode::Lazy)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone, Default)]
pub struct ConversionConfig {
    /// CSS embedded into every assembled document. Default: the built-in
    /// A4 stylesheet ([`crate::styles::DEFAULT_STYLESHEET`]).
    pub stylesheet: Stylesheet,

    /// When merge inputs are validated. Default: [`ValidationMode::Upfront`].
    pub validation: ValidationMode,

    /// External engine used when no `renderer` is set. Default: WeasyPrint.
    pub engine: PdfEngine,

    /// Explicit engine executable. If None, the engine's default program is
    /// looked up on `PATH`.
    pub engine_path: Option<PathBuf>,

    /// Pre-constructed renderer. Takes precedence over `engine`/`engine_path`.
    pub renderer: Option<Arc<dyn PdfRenderer>>,

    /// Optional progress callback, invoked once per source and around the
    /// PDF render.
    pub progress_callback: Option<ProgressCallback>,
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("stylesheet", &self.stylesheet)
            .field("validation", &self.validation)
            .field("engine", &self.engine)
            .field("engine_path", &self.engine_path)
            .field("renderer", &self.renderer.as_ref().map(|r| r.name().to_string()))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Resolve the renderer, from most-specific to least-specific:
    /// the pre-built `renderer`, then `engine` with `engine_path`.
    pub fn resolve_renderer(&self) -> Arc<dyn PdfRenderer> {
        match self.renderer {
            Some(ref renderer) => Arc::clone(renderer),
            None => self.engine.renderer(self.engine_path.as_deref()),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn stylesheet(mut self, stylesheet: Stylesheet) -> Self {
        self.config.stylesheet = stylesheet;
        self
    }

    pub fn validation(mut self, mode: ValidationMode) -> Self {
        self.config.validation = mode;
        self
    }

    pub fn engine(mut self, engine: PdfEngine) -> Self {
        self.config.engine = engine;
        self
    }

    pub fn engine_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.engine_path = Some(path.into());
        self
    }

    pub fn renderer(mut self, renderer: Arc<dyn PdfRenderer>) -> Self {
        self.config.renderer = Some(renderer);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, MarkPdfError> {
        let c = &self.config;
        if c.stylesheet.as_str().trim().is_empty() {
            return Err(MarkPdfError::InvalidConfig(
                "Stylesheet must not be empty".into(),
            ));
        }
        if c
            .engine_path
            .as_ref()
            .is_some_and(|p| p.as_os_str().is_empty())
        {
            return Err(MarkPdfError::InvalidConfig(
                "Engine path must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// When the sources of a merge are checked for existence and extension.
///
/// Either way a failure aborts the merge and no PDF is written; the modes
/// differ only in how much work happens before the failure is noticed.
///
/// | Mode | Behaviour |
/// |------|-----------|
/// | `Upfront` | every path is validated before any file is read (default) |
/// | `Lazy` | each path is validated just before it is read and rendered |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Validate the whole batch first. No rendering work is wasted.
    #[default]
    Upfront,
    /// Validate file by file while rendering; earlier fragments are
    /// discarded if a later file is invalid.
    Lazy,
}
