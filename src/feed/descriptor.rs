use super::model::JsonFeedItem;
use super::xml::Element;

/// Top-level fields a channel resolver contributes to the feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelFields {
    pub title: String,
    pub home_page_url: String,
}

/// Describes one feed dialect family as plain data.
///
/// The dispatcher scans an ordered list of descriptors and uses the first
/// whose `matches` predicate accepts the document root. A non-matching
/// descriptor contributes nothing.
#[derive(Clone, Copy)]
pub struct FormatDescriptor {
    /// Short label used in logs.
    pub name: &'static str,
    /// Structural predicate over the document root.
    pub matches: fn(&Element) -> bool,
    /// Resolves feed-level fields.
    pub channel: fn(&Element) -> ChannelFields,
    /// Selects the item elements, in document order.
    pub items: fn(&Element) -> Vec<&Element>,
    /// Resolves one item element.
    pub item: fn(&Element) -> JsonFeedItem,
}

impl std::fmt::Debug for FormatDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatDescriptor")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// True for MIME types of the `image/*` family.
pub(crate) fn is_image_type(mime: Option<&str>) -> bool {
    mime.is_some_and(|mime| mime.trim_start().starts_with("image"))
}
