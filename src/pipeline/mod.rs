//! Pipeline stages for Markdown-to-PDF conversion.
//!
//! Each submodule implements exactly one transformation step, so the PDF
//! engine can be swapped without touching Markdown handling or assembly.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ markdown ──▶ assemble ──▶ pdf
//! (.md path)  (fragment)   (document)   (engine)
//! ```
//!
//! 1. [`input`]    — validate the path and read the source text
//! 2. [`markdown`] — render one source to an HTML fragment (pulldown-cmark +
//!    syntect)
//! 3. [`assemble`] — join fragments with page breaks and embed the stylesheet
//! 4. [`pdf`]      — run the external engine; the only stage that spawns a
//!    process

pub mod assemble;
pub mod input;
pub mod markdown;
pub mod pdf;
