//! Built-in stylesheet and pagination markup.
//!
//! Everything that decides how the PDF *looks* lives here: the page geometry
//! (`@page`), typography, and the marker used to force a page break between
//! merged documents. The CSS is embedded inline into every assembled
//! document, so the output never depends on network or filesystem access for
//! styling.
//!
//! Callers can swap the stylesheet through
//! [`crate::config::ConversionConfigBuilder::stylesheet`]; these constants are
//! used only when no override is provided.

/// Literal markup inserted between fragments in merge mode.
///
/// Both WeasyPrint and Chromium honour `page-break-after` on a block element.
pub const PAGE_BREAK: &str = r#"<div style="page-break-after: always;"></div>"#;

/// Default stylesheet: A4 pages, 2.5cm/2cm margins, print-friendly typography.
pub const DEFAULT_STYLESHEET: &str = r#"@page {
    size: A4;
    margin: 2.5cm 2cm;
}

body {
    font-family: "Segoe UI", "Helvetica Neue", Arial, sans-serif;
    font-size: 12pt;
    line-height: 1.6;
    color: #1a1a1a;
    max-width: 100%;
}

/* Headings */
h1, h2, h3, h4, h5, h6 {
    color: #111;
    margin-top: 1.4em;
    margin-bottom: 0.6em;
    line-height: 1.3;
    page-break-after: avoid;
}
h1 { font-size: 2em;   border-bottom: 2px solid #ddd; padding-bottom: 0.3em; }
h2 { font-size: 1.5em; border-bottom: 1px solid #eee; padding-bottom: 0.25em; }
h3 { font-size: 1.25em; }

/* Paragraphs, links */
p {
    margin: 0.8em 0;
    text-align: justify;
}
a {
    color: #0366d6;
    text-decoration: none;
}

/* Lists */
ul, ol {
    padding-left: 1.8em;
    margin: 0.6em 0;
}
li {
    margin: 0.25em 0;
}

/* Code */
code {
    font-family: "Fira Code", "Cascadia Code", "Consolas", monospace;
    font-size: 0.9em;
    background: #f5f5f5;
    padding: 0.15em 0.35em;
    border-radius: 4px;
}
pre {
    background: #f6f8fa;
    border: 1px solid #e1e4e8;
    border-radius: 6px;
    padding: 1em;
    overflow-x: auto;
    line-height: 1.45;
    white-space: pre-wrap;
}
pre code {
    background: transparent;
    padding: 0;
}
.codehilite pre {
    font-family: "Fira Code", "Cascadia Code", "Consolas", monospace;
    font-size: 0.9em;
}

/* Blockquotes */
blockquote {
    margin: 1em 0;
    padding: 0.5em 1em;
    border-left: 4px solid #dfe2e5;
    color: #555;
    background: #fafafa;
}

/* Tables */
table {
    border-collapse: collapse;
    width: 100%;
    margin: 1em 0;
}
th, td {
    border: 1px solid #dfe2e5;
    padding: 0.6em 1em;
    text-align: left;
}
th {
    background: #f6f8fa;
    font-weight: 600;
}
tr:nth-child(even) {
    background: #fafbfc;
}

/* Table of contents ([TOC] marker) */
.toc {
    margin: 1em 0 2em;
}
.toc ul {
    list-style: none;
    padding-left: 1.2em;
}
.toc > ul {
    padding-left: 0;
}

/* Horizontal rule */
hr {
    border: none;
    border-top: 1px solid #e1e4e8;
    margin: 2em 0;
}

/* Images */
img {
    max-width: 100%;
    height: auto;
}
"#;
