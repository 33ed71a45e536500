//! Field content decoding.
//!
//! Feeds embed markup in three incompatible ways, and a single decoder has to
//! reconcile all of them into an `html`/`text` pair:
//!
//! - **CDATA**: the raw data is the markup. Entities inside it were never
//!   processed, so they survive into `html` and are decoded only when the
//!   text is extracted.
//! - **Single escaping** (`&lt;b&gt;`): the XML parse already decoded one
//!   layer, so the serialized children are real markup.
//! - **Double escaping** (`&amp;lt;b&amp;gt;`): after the XML pass the text
//!   still reads `&lt;b&gt;`. That literal becomes `html`; extracting text
//!   performs the missing second pass.
//!
//! The case is never chosen up front. CDATA is detected structurally and the
//! two escaping cases fall out of whatever the XML pass produced.

use std::cell::OnceCell;

use scraper::Html;

use super::xml::Element;

/// Decoded `html`/`text` pair for one field node.
///
/// Both representations are computed on first access, so a field that the
/// priority rules never consult is never re-parsed as HTML.
pub struct Decoded<'a> {
    source: Source<'a>,
    html: OnceCell<String>,
    text: OnceCell<String>,
}

#[derive(Clone, Copy)]
enum Source<'a> {
    Missing,
    Markup(&'a Element),
    Literal(&'a Element),
}

impl<'a> Decoded<'a> {
    fn new(source: Source<'a>) -> Self {
        Self {
            source,
            html: OnceCell::new(),
            text: OnceCell::new(),
        }
    }

    /// Best-effort markup, trimmed.
    pub fn html(&self) -> &str {
        self.html.get_or_init(|| match self.source {
            Source::Missing => String::new(),
            Source::Markup(node) => markup_of(node).trim().to_string(),
            Source::Literal(node) => node.trimmed_text(),
        })
    }

    /// Visible text with tags stripped, trimmed.
    pub fn text(&self) -> &str {
        self.text.get_or_init(|| match self.source {
            Source::Missing => String::new(),
            Source::Markup(_) => html_to_text(self.html()),
            Source::Literal(_) => self.html().to_string(),
        })
    }
}

/// Decodes one field node (`description`, `content:encoded`, ...).
///
/// A missing node decodes to an empty pair.
pub fn decode(node: Option<&Element>) -> Decoded<'_> {
    Decoded::new(match node {
        Some(node) => Source::Markup(node),
        None => Source::Missing,
    })
}

/// Decodes an Atom text construct according to its `type` attribute.
///
/// `html` and `xhtml` go through [`decode`]. `text`, a missing attribute, or
/// any other value is taken literally: both outputs are the trimmed text.
pub fn decode_atom_element(node: Option<&Element>) -> Decoded<'_> {
    Decoded::new(match node {
        Some(node) => match node.attr("type").map(str::trim) {
            Some("html") | Some("xhtml") => Source::Markup(node),
            _ => Source::Literal(node),
        },
        None => Source::Missing,
    })
}

fn markup_of(node: &Element) -> String {
    if node.has_cdata() {
        node.text()
    } else {
        node.inner_xml().unwrap_or_else(|e| {
            tracing::debug!(element = %node.name, error = %e, "Falling back to text for markup");
            node.text()
        })
    }
}

/// Extracts visible text from an HTML fragment.
///
/// Entities are decoded by the HTML parser. A bare `&` that does not start a
/// known entity is kept as-is, and `<` that does not open a tag stays literal.
pub fn html_to_text(html: &str) -> String {
    if !html.contains(|c: char| c == '<' || c == '&') {
        return html.trim().to_string();
    }

    let fragment = Html::parse_fragment(html);
    let text: String = fragment.root_element().text().collect();
    text.trim().to_string()
}

/// Returns the first candidate that evaluates to a non-empty string.
///
/// Candidates are evaluated lazily and in order; later ones are not called
/// once a value is found. Returns an empty string when nothing matches.
pub fn first_non_empty(candidates: &[&dyn Fn() -> String]) -> String {
    candidates
        .iter()
        .map(|candidate| candidate())
        .find(|value| !value.is_empty())
        .unwrap_or_default()
}
