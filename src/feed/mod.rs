//! Feed normalization engine.
//!
//! Turns RSS 2.0, RDF/RSS 1.0 and Atom documents into a single canonical
//! [`JsonFeed`] record, so downstream code never needs to know which XML
//! dialect produced an item.
//!
//! # Architecture
//!
//! - [`xml`] - Owned element tree built with `quick-xml`, keeping CDATA apart from text
//! - [`decode`] - Field content decoding (CDATA, single and double escaping) and
//!   the first-non-empty priority rule
//! - [`rss`] / [`atom`] - Format descriptors: match predicate plus channel and item resolvers
//! - [`parser`] - The dispatcher: parse once, first matching descriptor wins
//!
//! Normalization is pure and synchronous. It never touches the network or
//! the filesystem and can run concurrently on independent documents.
//!
//! # Example
//!
//! ```
//! use feedloom::feed::{default_descriptors, normalize};
//!
//! let xml = br#"<rss version="2.0"><channel>
//!     <title>Example</title>
//!     <link>https://example.com</link>
//!     <item><title>Hello</title><description>I'm &lt;b&gt;bold&lt;/b&gt;</description></item>
//! </channel></rss>"#;
//!
//! let feed = normalize(xml, default_descriptors()).unwrap();
//! assert_eq!(feed.items[0].content_html, "I'm <b>bold</b>");
//! assert_eq!(feed.items[0].summary, "I'm bold");
//! ```

pub mod atom;
mod date;
pub mod decode;
pub mod descriptor;
mod model;
pub mod parser;
pub mod rss;
pub mod xml;

pub use decode::{decode, decode_atom_element, first_non_empty, Decoded};
pub use descriptor::{ChannelFields, FormatDescriptor};
pub use model::{JsonFeed, JsonFeedItem, JSON_FEED_VERSION};
pub use parser::{default_descriptors, normalize, ParseError};
