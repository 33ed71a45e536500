use super::date::to_iso8601;
use super::decode::{decode, decode_atom_element, first_non_empty};
use super::descriptor::{is_image_type, ChannelFields, FormatDescriptor};
use super::model::JsonFeedItem;
use super::xml::Element;

pub const DESCRIPTOR: FormatDescriptor = FormatDescriptor {
    name: "atom",
    matches,
    channel: resolve_channel,
    items: select_items,
    item: resolve_item,
};

fn matches(root: &Element) -> bool {
    root.name == "feed"
}

fn resolve_channel(root: &Element) -> ChannelFields {
    ChannelFields {
        title: decode_atom_element(root.child("title")).text().to_string(),
        home_page_url: href_of(root.child("link")),
    }
}

fn select_items(root: &Element) -> Vec<&Element> {
    root.children_named("entry").collect()
}

fn resolve_item(entry: &Element) -> JsonFeedItem {
    let summary = decode_atom_element(entry.child("summary"));
    let content = decode_atom_element(entry.child("content"));

    JsonFeedItem {
        id: String::new(),
        url: href_of(entry.child("link")),
        // Item titles are plain text whatever their declared type.
        title: decode(entry.child("title")).text().to_string(),
        summary: first_non_empty(&[
            &|| summary.text().to_string(),
            &|| content.text().to_string(),
        ]),
        content_text: first_non_empty(&[
            &|| content.text().to_string(),
            &|| summary.text().to_string(),
        ]),
        content_html: first_non_empty(&[
            &|| content.html().to_string(),
            &|| summary.html().to_string(),
        ]),
        image: entry
            .children_named("link")
            .find(|link| link.attr("rel") == Some("enclosure") && is_image_type(link.attr("type")))
            .and_then(|link| link.attr("href"))
            .map(str::to_string),
        date_published: entry
            .child("published")
            .and_then(|node| to_iso8601(&node.text())),
        date_modified: entry
            .child("updated")
            .and_then(|node| to_iso8601(&node.text())),
    }
}

fn href_of(link: Option<&Element>) -> String {
    link.and_then(|link| link.attr("href"))
        .map(|href| href.trim().to_string())
        .unwrap_or_default()
}
