//! Document assembly: wrap HTML fragments into one complete, styled document.
//!
//! The assembled document is the unit handed to the PDF engine. Exactly one
//! is produced per output PDF, however many fragments fed it. The stylesheet
//! is embedded inline so rendering never reaches out for styling.

use crate::error::MarkPdfError;
use crate::styles::{DEFAULT_STYLESHEET, PAGE_BREAK};
use std::borrow::Cow;
use std::fmt;

/// CSS embedded into every assembled document.
///
/// Defaults to [`DEFAULT_STYLESHEET`].
#[derive(Clone, PartialEq, Eq)]
pub struct Stylesheet(Cow<'static, str>);

impl Stylesheet {
    pub fn new(css: impl Into<Cow<'static, str>>) -> Self {
        Self(css.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_STYLESHEET
    }
}

impl Default for Stylesheet {
    fn default() -> Self {
        Self(Cow::Borrowed(DEFAULT_STYLESHEET))
    }
}

impl fmt::Debug for Stylesheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_default() {
            f.write_str("Stylesheet(<default>)")
        } else {
            write!(f, "Stylesheet({} bytes)", self.0.len())
        }
    }
}

/// A complete HTML document ready for the PDF engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledDocument {
    html: String,
    fragment_count: usize,
}

impl AssembledDocument {
    pub fn html(&self) -> &str {
        &self.html
    }

    /// Number of fragments in the body.
    pub fn fragment_count(&self) -> usize {
        self.fragment_count
    }

    /// Number of page-break markers between fragments.
    pub fn page_breaks(&self) -> usize {
        self.fragment_count.saturating_sub(1)
    }
}

/// Wrap fragments into one document, separated by [`PAGE_BREAK`].
///
/// Markers go strictly between consecutive fragments. `title`, when given,
/// becomes the document `<title>` (engines use it as PDF metadata).
pub fn assemble<S: AsRef<str>>(
    fragments: &[S],
    stylesheet: &Stylesheet,
    title: Option<&str>,
) -> Result<AssembledDocument, MarkPdfError> {
    if fragments.is_empty() {
        return Err(MarkPdfError::NoInputs);
    }

    let separator = format!("\n{PAGE_BREAK}\n");
    let body = fragments
        .iter()
        .map(|f| f.as_ref())
        .collect::<Vec<&str>>()
        .join(&separator);

    Ok(AssembledDocument {
        html: wrap_html(&body, stylesheet, title),
        fragment_count: fragments.len(),
    })
}

fn wrap_html(body: &str, stylesheet: &Stylesheet, title: Option<&str>) -> String {
    let title = title
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| format!("  <title>{}</title>\n", html_escape::encode_text(t)))
        .unwrap_or_default();

    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n  \
         <meta charset=\"utf-8\">\n\
         {title}  \
         <style>\n{css}\n  </style>\n\
         </head>\n\
         <body>\n{body}\n</body>\n\
         </html>",
        css = stylesheet.as_str(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn single_fragment_has_no_page_break() {
        let doc = assemble(&["<p>only</p>"], &Stylesheet::default(), None).unwrap();
        assert!(!doc.html().contains(PAGE_BREAK));
        assert_eq!(doc.fragment_count(), 1);
        assert_eq!(doc.page_breaks(), 0);
    }

    #[test]
    fn markers_go_strictly_between_fragments() {
        let doc = assemble(&["<p>a</p>", "<p>b</p>", "<p>c</p>"], &Stylesheet::default(), None)
            .unwrap();
        let html = doc.html();
        assert_eq!(html.matches(PAGE_BREAK).count(), 2);
        assert_eq!(doc.page_breaks(), 2);

        let body_start = html.find("<body>\n").unwrap() + "<body>\n".len();
        let body_end = html.find("\n</body>").unwrap();
        let body = &html[body_start..body_end];
        assert_eq!(
            body,
            format!("<p>a</p>\n{PAGE_BREAK}\n<p>b</p>\n{PAGE_BREAK}\n<p>c</p>")
        );
    }

    #[test]
    fn exact_document_layout() {
        let css = Stylesheet::new("body { color: red; }");
        let doc = assemble(&["<h1>T</h1>"], &css, None).unwrap();
        assert_eq!(
            doc.html(),
            "<!DOCTYPE html>\n\
             <html lang=\"en\">\n\
             <head>\n\
             \x20 <meta charset=\"utf-8\">\n\
             \x20 <style>\n\
             body { color: red; }\n\
             \x20 </style>\n\
             </head>\n\
             <body>\n\
             <h1>T</h1>\n\
             </body>\n\
             </html>"
        );
    }

    #[test]
    fn title_is_escaped_into_head() {
        let doc = assemble(&["<p>x</p>"], &Stylesheet::default(), Some("Q&A <draft>")).unwrap();
        assert!(doc.html().contains("  <title>Q&amp;A &lt;draft&gt;</title>\n  <style>"));
    }

    #[test]
    fn blank_title_is_omitted() {
        let doc = assemble(&["<p>x</p>"], &Stylesheet::default(), Some("  ")).unwrap();
        assert!(!doc.html().contains("<title>"));
    }

    #[test]
    fn stylesheet_is_embedded_once() {
        let doc = assemble(&["<p>a</p>", "<p>b</p>"], &Stylesheet::default(), None).unwrap();
        assert!(doc.html().starts_with("<!DOCTYPE html>"));
        assert_eq!(doc.html().matches("<style>").count(), 1);
        assert!(doc.html().contains(DEFAULT_STYLESHEET));
        assert!(!doc.html().contains("<link"));
    }

    #[test]
    fn empty_input_is_rejected() {
        let none: [&str; 0] = [];
        let err = assemble(&none, &Stylesheet::default(), None).unwrap_err();
        assert!(matches!(err, MarkPdfError::NoInputs));
    }

    #[test]
    fn stylesheet_debug_is_compact() {
        assert_eq!(format!("{:?}", Stylesheet::default()), "Stylesheet(<default>)");
        assert_eq!(format!("{:?}", Stylesheet::new("a{}")), "Stylesheet(3 bytes)");
    }
}
