use thiserror::Error;

use super::descriptor::FormatDescriptor;
use super::model::{JsonFeed, JSON_FEED_VERSION};
use super::xml::parse_document;
use super::{atom, rss};

/// The only failure normalization can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Malformed XML, or a document that is neither RSS/RDF nor Atom shaped.
    #[error("Unsupported feed format: expected RSS, RDF or Atom")]
    UnsupportedFormat,
}

static DEFAULT_DESCRIPTORS: [FormatDescriptor; 2] = [rss::DESCRIPTOR, atom::DESCRIPTOR];

/// The standard descriptor list: RSS/RDF first, then Atom.
pub fn default_descriptors() -> &'static [FormatDescriptor] {
    &DEFAULT_DESCRIPTORS
}

/// Normalizes a raw feed document into a [`JsonFeed`].
///
/// The document is parsed once. Descriptors are tried in order and the first
/// whose predicate accepts the root resolves the whole feed. `feed_url` is
/// left empty for the caller to fill.
///
/// Input is assumed to be UTF-8; no BOM or encoding declaration handling is
/// performed.
///
/// # Errors
///
/// Returns [`ParseError::UnsupportedFormat`] when the input is not
/// well-formed XML or when no descriptor matches.
pub fn normalize(raw: &[u8], descriptors: &[FormatDescriptor]) -> Result<JsonFeed, ParseError> {
    let content = std::str::from_utf8(raw).map_err(|e| {
        tracing::debug!(error = %e, "Feed document is not valid UTF-8");
        ParseError::UnsupportedFormat
    })?;

    let root = parse_document(content).map_err(|e| {
        tracing::debug!(error = %e, "Feed document is not well-formed XML");
        ParseError::UnsupportedFormat
    })?;

    let Some(descriptor) = descriptors.iter().find(|d| (d.matches)(&root)) else {
        tracing::debug!(root = %root.name, "No feed format matches document root");
        return Err(ParseError::UnsupportedFormat);
    };

    let channel = (descriptor.channel)(&root);
    let items: Vec<_> = (descriptor.items)(&root)
        .into_iter()
        .map(descriptor.item)
        .collect();

    tracing::debug!(
        format = descriptor.name,
        items = items.len(),
        "Normalized feed"
    );

    Ok(JsonFeed {
        version: JSON_FEED_VERSION.to_string(),
        title: channel.title,
        home_page_url: channel.home_page_url,
        feed_url: String::new(),
        items,
    })
}
