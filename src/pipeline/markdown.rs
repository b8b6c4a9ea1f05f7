//! Markdown → HTML fragment rendering.
//!
//! Parsing is delegated to `pulldown-cmark`; this module only post-processes
//! the event stream to add what the fixed extension set promises on top of
//! plain CommonMark:
//!
//! * every heading gets a stable `id` (table-of-contents anchors), and a
//!   paragraph consisting solely of `[TOC]` becomes a nested link list
//! * fenced code is highlighted with `syntect` (inline styles, so no extra CSS
//!   is needed) inside a `div.codehilite`
//! * tables, strikethrough, smart punctuation and `{#id .class}` heading
//!   attributes come straight from the parser options
//! * a trailing `{: #id .class key=value}` list sets attributes on the image
//!   it directly follows, otherwise on the enclosing paragraph
//!
//! Rendering never fails: malformed Markdown degrades to literal text, and a
//! highlighter error falls back to escaped plain code.

use once_cell::sync::Lazy;
use pulldown_cmark::{CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use regex::Regex;
use std::collections::HashSet;
use std::fmt::Write;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;
use tracing::{debug, warn};
use unicode_normalization::UnicodeNormalization;

/// Paragraph text replaced by a generated table of contents.
pub const TOC_MARKER: &str = "[TOC]";

/// syntect theme used for fenced code.
pub const HIGHLIGHT_THEME: &str = "InspiredGitHub";

const TOC_PLACEHOLDER: &str = "<!--markpdf:toc-->";

static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);

static RE_SLUG_STRIP: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s-]").unwrap());
static RE_SLUG_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-\s]+").unwrap());

static RE_ATTR_LIST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{:?\s*([^{}]*?)\s*\}\s*$").unwrap());
static RE_ATTR_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"#([\w-]+)|\.([\w-]+)|([\w-]+)=(?:"([^"]*)"|'([^']*)'|([^\s"']+))"#).unwrap()
});

/// One rendered Markdown source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// HTML body markup, no doctype/head/body.
    pub html: String,
    /// Plain text of the first heading, if any.
    pub title: Option<String>,
    /// Headings in document order.
    pub toc: Vec<TocEntry>,
}

/// A heading collected for the table of contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub level: u8,
    pub id: String,
    pub text: String,
}

/// Parser options for the fixed extension set.
pub fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_SMART_PUNCTUATION
        | Options::ENABLE_HEADING_ATTRIBUTES
}

/// Render Markdown text to an HTML fragment.
pub fn render_fragment(markdown: &str) -> Fragment {
    let mut ids = HeadingIds::default();
    let mut toc: Vec<TocEntry> = Vec::new();
    let mut has_toc_marker = false;

    let mut events = Parser::new_ext(markdown, parser_options());
    let mut out: Vec<Event<'_>> = Vec::new();

    while let Some(event) = events.next() {
        match event {
            Event::Start(Tag::Heading {
                level,
                id,
                classes,
                attrs,
            }) => {
                let inner = take_until(&mut events, |e| matches!(e, Event::End(TagEnd::Heading(_))));
                let text = plain_text(&inner);
                let id = match id {
                    Some(explicit) => ids.claim(&explicit),
                    None => ids.claim(&slugify(&text)),
                };
                toc.push(TocEntry {
                    level: heading_level_to_num(level),
                    id: id.clone(),
                    text,
                });

                out.push(Event::Start(Tag::Heading {
                    level,
                    id: Some(CowStr::from(id)),
                    classes,
                    attrs,
                }));
                out.extend(inner);
                out.push(Event::End(TagEnd::Heading(level)));
            }
            Event::Start(Tag::CodeBlock(kind)) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => fence_language(&info),
                    CodeBlockKind::Indented => None,
                };
                let mut code = String::new();
                for e in events.by_ref() {
                    match e {
                        Event::Text(t) => code.push_str(&t),
                        Event::End(TagEnd::CodeBlock) => break,
                        _ => {}
                    }
                }
                out.push(Event::Html(CowStr::from(highlight_code(&code, lang.as_deref()))));
            }
            Event::Start(Tag::Paragraph) => {
                let mut inner =
                    take_until(&mut events, |e| matches!(e, Event::End(TagEnd::Paragraph)));
                if is_toc_marker(&inner) {
                    has_toc_marker = true;
                    out.push(Event::Html(CowStr::from(format!("{TOC_PLACEHOLDER}\n"))));
                    continue;
                }
                match take_trailing_attrs(&mut inner) {
                    Some(attrs) if matches!(inner.last(), Some(Event::End(TagEnd::Image))) => {
                        apply_image_attrs(&mut inner, &attrs);
                        out.push(Event::Start(Tag::Paragraph));
                        out.extend(inner);
                        out.push(Event::End(TagEnd::Paragraph));
                    }
                    Some(attrs) => {
                        trim_trailing_space(&mut inner);
                        out.push(Event::Html(CowStr::from(format!("<p{}>", attrs.to_html()))));
                        out.extend(inner);
                        out.push(Event::Html(CowStr::from("</p>\n")));
                    }
                    None => {
                        out.push(Event::Start(Tag::Paragraph));
                        out.extend(inner);
                        out.push(Event::End(TagEnd::Paragraph));
                    }
                }
            }
            other => out.push(other),
        }
    }

    let mut html = String::with_capacity(markdown.len() * 3 / 2);
    pulldown_cmark::html::push_html(&mut html, out.into_iter());

    if has_toc_marker {
        html = html.replace(TOC_PLACEHOLDER, &render_toc(&toc));
    }

    debug!(
        "Rendered fragment: {} bytes markdown → {} bytes html, {} headings",
        markdown.len(),
        html.len(),
        toc.len()
    );

    Fragment {
        title: toc.first().map(|e| e.text.clone()),
        html,
        toc,
    }
}

/// Collect events up to (not including) the first one matching `is_end`,
/// consuming the end event.
fn take_until<'a, I, F>(events: &mut I, is_end: F) -> Vec<Event<'a>>
where
    I: Iterator<Item = Event<'a>>,
    F: Fn(&Event<'a>) -> bool,
{
    let mut inner = Vec::new();
    for e in events.by_ref() {
        if is_end(&e) {
            break;
        }
        inner.push(e);
    }
    inner
}

/// Concatenate the visible text of inline events.
fn plain_text(events: &[Event<'_>]) -> String {
    let mut text = String::new();
    for e in events {
        match e {
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            _ => {}
        }
    }
    text.trim().to_string()
}

fn is_toc_marker(inner: &[Event<'_>]) -> bool {
    inner.iter().all(|e| matches!(e, Event::Text(_))) && plain_text(inner) == TOC_MARKER
}

/// First word of a fence info string (` ```rust title="x" ` → `rust`).
fn fence_language(info: &str) -> Option<String> {
    info.split(|c: char| c.is_whitespace() || c == ',' || c == '{')
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Convert heading level enum to number (1-6).
fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

// ── Attribute lists ──────────────────────────────────────────────────────────

/// Parsed `{: #id .class key=value}` block.
#[derive(Debug, Default, PartialEq, Eq)]
struct AttrList {
    id: Option<String>,
    classes: Vec<String>,
    pairs: Vec<(String, String)>,
}

impl AttrList {
    /// Parse the inside of the braces. Anything that is not an attribute
    /// token means the braces were ordinary text.
    fn parse(body: &str) -> Option<Self> {
        // Smart punctuation has already curled the quotes.
        let body = body
            .replace(['\u{201c}', '\u{201d}'], "\"")
            .replace(['\u{2018}', '\u{2019}'], "'");

        let mut list = Self::default();
        let mut end = 0;
        for caps in RE_ATTR_TOKEN.captures_iter(&body) {
            let Some(token) = caps.get(0) else { continue };
            if !body[end..token.start()].trim().is_empty() {
                return None;
            }
            end = token.end();

            if let Some(id) = caps.get(1) {
                list.id = Some(id.as_str().to_string());
            } else if let Some(class) = caps.get(2) {
                list.classes.push(class.as_str().to_string());
            } else if let Some(key) = caps.get(3) {
                let value = (4..=6).find_map(|i| caps.get(i)).map_or("", |m| m.as_str());
                list.pairs.push((key.as_str().to_string(), value.to_string()));
            }
        }

        let is_empty = list.id.is_none() && list.classes.is_empty() && list.pairs.is_empty();
        (!is_empty && body[end..].trim().is_empty()).then_some(list)
    }

    /// Attributes as ` name="value"` pairs, ready to go inside a start tag.
    fn to_html(&self) -> String {
        use html_escape::encode_double_quoted_attribute as attr;

        let mut out = String::new();
        if let Some(ref id) = self.id {
            let _ = write!(out, " id=\"{}\"", attr(id));
        }
        if !self.classes.is_empty() {
            let _ = write!(out, " class=\"{}\"", attr(&self.classes.join(" ")));
        }
        for (key, value) in &self.pairs {
            let _ = write!(out, " {key}=\"{}\"", attr(value));
        }
        out
    }
}

/// Split a trailing attribute list off the end of paragraph content.
///
/// Returns `None`, leaving `inner` untouched, when there is no list or the
/// list is all the paragraph contains.
fn take_trailing_attrs(inner: &mut Vec<Event<'_>>) -> Option<AttrList> {
    let start = inner
        .iter()
        .rposition(|e| !matches!(e, Event::Text(_)))
        .map_or(0, |i| i + 1);
    let text: String = inner[start..]
        .iter()
        .filter_map(|e| match e {
            Event::Text(t) => Some(&**t),
            _ => None,
        })
        .collect();

    let caps = RE_ATTR_LIST.captures(&text)?;
    let attrs = AttrList::parse(caps.get(1)?.as_str())?;
    let prefix = &text[..caps.get(0)?.start()];
    if start == 0 && prefix.trim().is_empty() {
        return None;
    }

    let prefix = prefix.to_string();
    inner.truncate(start);
    if !prefix.is_empty() {
        inner.push(Event::Text(CowStr::from(prefix)));
    }
    Some(attrs)
}

/// Replace the image that ends `inner` with an `<img>` carrying `attrs`.
fn apply_image_attrs(inner: &mut Vec<Event<'_>>, attrs: &AttrList) {
    use html_escape::encode_double_quoted_attribute as attr;

    let Some(start) = inner
        .iter()
        .rposition(|e| matches!(e, Event::Start(Tag::Image { .. })))
    else {
        return;
    };
    let alt = plain_text(&inner[start + 1..inner.len() - 1]);
    let Event::Start(Tag::Image {
        ref dest_url,
        ref title,
        ..
    }) = inner[start]
    else {
        return;
    };

    let title = if title.is_empty() {
        String::new()
    } else {
        format!(" title=\"{}\"", attr(&**title))
    };
    let img = format!(
        "<img src=\"{}\" alt=\"{}\"{title}{} />",
        attr(&**dest_url),
        attr(&alt),
        attrs.to_html()
    );

    inner.truncate(start);
    inner.push(Event::InlineHtml(CowStr::from(img)));
}

/// Drop line breaks and whitespace left in front of a removed attribute list.
fn trim_trailing_space(inner: &mut Vec<Event<'_>>) {
    loop {
        let trimmed = match inner.last() {
            Some(Event::SoftBreak | Event::HardBreak) => None,
            Some(Event::Text(t)) if t.ends_with(char::is_whitespace) => {
                Some(t.trim_end().to_string())
            }
            _ => break,
        };
        inner.pop();
        if let Some(text) = trimmed.filter(|t| !t.is_empty()) {
            inner.push(Event::Text(CowStr::from(text)));
            break;
        }
    }
}

// ── Heading ids ──────────────────────────────────────────────────────────────

/// Turn heading text into an anchor id: fold accents to ASCII, strip
/// punctuation, lowercase, and join words with `-`.
pub fn slugify(text: &str) -> String {
    let folded: String = text.nfkd().filter(char::is_ascii).collect();
    let stripped = RE_SLUG_STRIP.replace_all(&folded, "");
    let lowered = stripped.trim().to_lowercase();
    let slug = RE_SLUG_SEPARATORS.replace_all(&lowered, "-");
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "section".to_string()
    } else {
        slug.to_string()
    }
}

/// Ids already handed out within one fragment.
#[derive(Debug, Default)]
struct HeadingIds {
    used: HashSet<String>,
}

impl HeadingIds {
    /// Reserve `base`, or `base_1`, `base_2`, … if it is taken.
    fn claim(&mut self, base: &str) -> String {
        let mut candidate = base.to_string();
        let mut n = 1;
        while self.used.contains(&candidate) {
            candidate = format!("{base}_{n}");
            n += 1;
        }
        self.used.insert(candidate.clone());
        candidate
    }
}

// ── Table of contents ────────────────────────────────────────────────────────

/// Render headings as nested `<ul>` lists inside `div.toc`.
pub fn render_toc(entries: &[TocEntry]) -> String {
    let mut html = String::from("<div class=\"toc\">\n");
    let mut levels: Vec<u8> = Vec::new();

    for entry in entries {
        if levels.last().is_none_or(|&top| entry.level > top) {
            html.push_str("<ul>\n");
            levels.push(entry.level);
        } else {
            html.push_str("</li>\n");
            while levels.len() > 1 && entry.level <= levels[levels.len() - 2] {
                html.push_str("</ul>\n</li>\n");
                levels.pop();
            }
            // A shallower heading that still sits below its parent joins the
            // current list and becomes the level deeper headings nest under.
            if let Some(top) = levels.last_mut() {
                *top = (*top).min(entry.level);
            }
        }
        write!(
            html,
            "<li><a href=\"#{}\">{}</a>",
            html_escape::encode_double_quoted_attribute(&entry.id),
            html_escape::encode_text(&entry.text)
        )
        .unwrap();
    }
    for _ in &levels {
        html.push_str("</li>\n</ul>\n");
    }

    html.push_str("</div>\n");
    html
}

// ── Code highlighting ────────────────────────────────────────────────────────

fn theme() -> Option<&'static Theme> {
    THEME_SET.themes.get(HIGHLIGHT_THEME)
}

/// Render a code block as `div.codehilite`, highlighted when the language is
/// known to syntect.
pub fn highlight_code(code: &str, lang: Option<&str>) -> String {
    let syntax = lang.and_then(|l| SYNTAX_SET.find_syntax_by_token(l));

    if let (Some(syntax), Some(theme)) = (syntax, theme()) {
        match syntect::html::highlighted_html_for_string(code, &SYNTAX_SET, syntax, theme) {
            Ok(highlighted) => return format!("<div class=\"codehilite\">{highlighted}</div>\n"),
            Err(e) => warn!(
                "Highlighting failed for language {:?}, falling back to plain text: {}",
                lang, e
            ),
        }
    }

    let class = lang
        .map(|l| format!(" class=\"language-{}\"", html_escape::encode_double_quoted_attribute(l)))
        .unwrap_or_default();
    format!(
        "<div class=\"codehilite\"><pre><code{class}>{}</code></pre></div>\n",
        html_escape::encode_text(code)
    )
}
