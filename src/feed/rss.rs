//! RSS 2.0 and RDF/RSS 1.0.
//!
//! Both dialects put feed metadata in a `channel` element directly under the
//! document root (`rss > channel`, `rdf:RDF > channel`). They differ in where
//! items live: RSS 2.0 nests them inside the channel while RDF makes them
//! siblings of it. One descriptor covers both by looking in either place.
//!
//! Documents that wrap the channel deeper in the tree are accepted as long
//! as that channel has items.

use super::date::to_iso8601;
use super::decode::{decode, first_non_empty};
use super::descriptor::{is_image_type, ChannelFields, FormatDescriptor};
use super::model::JsonFeedItem;
use super::xml::Element;

pub const DESCRIPTOR: FormatDescriptor = FormatDescriptor {
    name: "rss",
    matches,
    channel: resolve_channel,
    items: select_items,
    item: resolve_item,
};

fn find_channel(root: &Element) -> Option<&Element> {
    if root.name == "channel" {
        return Some(root);
    }
    root.child("channel").or_else(|| find_nested_channel(root))
}

/// First `channel` deeper in the tree that actually carries items.
fn find_nested_channel(element: &Element) -> Option<&Element> {
    element.elements().find_map(|child| {
        if child.name == "channel" && child.child("item").is_some() {
            Some(child)
        } else {
            find_nested_channel(child)
        }
    })
}

fn matches(root: &Element) -> bool {
    find_channel(root).is_some()
}

fn resolve_channel(root: &Element) -> ChannelFields {
    let channel = find_channel(root);

    ChannelFields {
        // Channel titles are always treated as plain text.
        title: decode(channel.and_then(|c| c.child("title")))
            .text()
            .to_string(),
        home_page_url: channel
            .and_then(|c| c.child("link"))
            .map(Element::trimmed_text)
            .unwrap_or_default(),
    }
}

fn select_items(root: &Element) -> Vec<&Element> {
    let Some(channel) = find_channel(root) else {
        return Vec::new();
    };

    let mut items: Vec<&Element> = channel.children_named("item").collect();
    if !std::ptr::eq(channel, root) {
        // RDF: items are siblings of the channel
        items.extend(root.children_named("item"));
    }
    items
}

fn resolve_item(item: &Element) -> JsonFeedItem {
    let description = decode(item.child("description"));
    let content = decode(item.child("content:encoded"));

    JsonFeedItem {
        id: String::new(),
        url: item
            .child("link")
            .map(Element::trimmed_text)
            .unwrap_or_default(),
        title: decode(item.child("title")).text().to_string(),
        summary: first_non_empty(&[
            &|| description.text().to_string(),
            &|| content.text().to_string(),
        ]),
        content_text: first_non_empty(&[
            &|| content.text().to_string(),
            &|| description.text().to_string(),
        ]),
        content_html: first_non_empty(&[
            &|| content.html().to_string(),
            &|| description.html().to_string(),
        ]),
        image: item
            .children_named("enclosure")
            .find(|enclosure| is_image_type(enclosure.attr("type")))
            .and_then(|enclosure| enclosure.attr("url"))
            .map(str::to_string),
        date_published: first_timestamp(item, &["pubDate", "dc:date"]),
        date_modified: first_timestamp(item, &["dc:modified", "atom:updated"]),
    }
}

/// Parses the first present, parseable timestamp among the named children.
fn first_timestamp(item: &Element, names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| item.child(name))
        .find_map(|node| to_iso8601(&node.text()))
}
