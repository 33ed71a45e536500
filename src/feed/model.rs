use serde::{Deserialize, Serialize};

/// Version identifier written into every normalized feed.
pub const JSON_FEED_VERSION: &str = "https://jsonfeed.org/version/1.1";

/// A feed normalized into the JSON Feed 1.1 shape.
///
/// Produced once per source document. `feed_url` is never filled by the
/// normalizer itself; the caller knows where the document came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonFeed {
    pub version: String,
    pub title: String,
    pub home_page_url: String,
    pub feed_url: String,
    /// Items in source document order. Duplicates are kept.
    pub items: Vec<JsonFeedItem>,
}

/// A single entry of a [`JsonFeed`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonFeedItem {
    /// Always empty; no identity scheme is derived from the source.
    pub id: String,
    pub url: String,
    pub title: String,
    /// Plain text, markup stripped.
    pub summary: String,
    /// Plain text, markup stripped.
    pub content_text: String,
    /// Best-effort markup. When the source had no real markup this is the
    /// literal (possibly entity-escaped) string, so it is not guaranteed to
    /// be well-formed HTML.
    pub content_html: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// UTC ISO-8601, present only if the source timestamp parsed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_published: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_modified: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_optionals_are_omitted_not_null() {
        let item = JsonFeedItem {
            url: "https://example.com/1".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&item).unwrap();
        let obj = json.as_object().unwrap();

        assert!(!obj.contains_key("image"));
        assert!(!obj.contains_key("date_published"));
        assert!(!obj.contains_key("date_modified"));
        assert_eq!(obj["id"], "");
        assert_eq!(obj["summary"], "");
    }

    #[test]
    fn test_present_optionals_are_serialized() {
        let item = JsonFeedItem {
            image: Some("https://example.com/a.png".to_string()),
            date_published: Some("2020-01-01T00:00:00.000Z".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(json["image"], "https://example.com/a.png");
        assert_eq!(json["date_published"], "2020-01-01T00:00:00.000Z");
        assert!(json.get("date_modified").is_none());
    }

    #[test]
    fn test_feed_reads_back_from_its_json() {
        let feed = JsonFeed {
            version: JSON_FEED_VERSION.to_string(),
            title: "Blog".to_string(),
            home_page_url: "https://example.com".to_string(),
            feed_url: "https://example.com/feed.xml".to_string(),
            items: vec![
                JsonFeedItem {
                    url: "https://example.com/1".to_string(),
                    content_html: "I'm <b>bold</b>".to_string(),
                    date_modified: Some("2020-01-01T00:00:00.000Z".to_string()),
                    ..Default::default()
                },
                JsonFeedItem::default(),
            ],
        };

        let json = serde_json::to_string(&feed).unwrap();
        let read: JsonFeed = serde_json::from_str(&json).unwrap();
        assert_eq!(read, feed);
    }

    #[test]
    fn test_missing_optional_keys_read_as_none() {
        let json = r#"{"id":"","url":"u","title":"t","summary":"","content_text":"","content_html":""}"#;
        let item: JsonFeedItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.image, None);
        assert_eq!(item.date_published, None);
        assert_eq!(item.date_modified, None);
    }
}
