use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// Offset-carrying formats tried after RFC 3339 and RFC 2822.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%:z",
];

/// Formats without an offset; interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Parses a feed timestamp and renders it as UTC ISO-8601 with millisecond
/// precision (`2020-01-02T03:04:05.000Z`).
///
/// Returns `None` for empty or unparseable input. Callers treat that as
/// "field absent"; a bad date never fails the item.
pub fn to_iso8601(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    match parse_timestamp(raw) {
        Some(timestamp) => Some(timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)),
        None => {
            tracing::trace!(value = %raw, "Dropping unparseable timestamp");
            None
        }
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.with_timezone(&Utc));
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc2822(raw) {
        return Some(timestamp.with_timezone(&Utc));
    }
    // chrono rejects a weekday that disagrees with the date
    if let Some(timestamp) =
        strip_weekday(raw).and_then(|rest| DateTime::parse_from_rfc2822(rest).ok())
    {
        return Some(timestamp.with_timezone(&Utc));
    }
    for format in OFFSET_FORMATS {
        if let Ok(timestamp) = DateTime::parse_from_str(raw, format) {
            return Some(timestamp.with_timezone(&Utc));
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(timestamp.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|timestamp| timestamp.and_utc())
}

/// Drops a leading `Www,` day name.
fn strip_weekday(raw: &str) -> Option<&str> {
    let (day, rest) = raw.split_once(',')?;
    let day = day.trim();
    (!day.is_empty() && day.chars().all(|c| c.is_ascii_alphabetic())).then(|| rest.trim_start())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc3339_to_utc_millis() {
        assert_eq!(
            to_iso8601("2021-03-04T05:06:07+02:00").as_deref(),
            Some("2021-03-04T03:06:07.000Z")
        );
        assert_eq!(
            to_iso8601("2021-03-04T05:06:07.25Z").as_deref(),
            Some("2021-03-04T05:06:07.250Z")
        );
    }

    #[test]
    fn test_rfc2822() {
        assert_eq!(
            to_iso8601("Thu, 04 Mar 2021 05:06:07 GMT").as_deref(),
            Some("2021-03-04T05:06:07.000Z")
        );
        assert_eq!(
            to_iso8601("Thu, 04 Mar 2021 05:06:07 -0500").as_deref(),
            Some("2021-03-04T10:06:07.000Z")
        );
    }

    #[test]
    fn test_rfc2822_with_wrong_weekday() {
        // 2021-03-04 is a Thursday
        assert_eq!(
            to_iso8601("Wed, 04 Mar 2021 05:06:07 GMT").as_deref(),
            Some("2021-03-04T05:06:07.000Z")
        );
        assert_eq!(
            to_iso8601("04 Mar 2021 05:06:07 GMT").as_deref(),
            Some("2021-03-04T05:06:07.000Z")
        );
    }

    #[test]
    fn test_offset_without_colon() {
        assert_eq!(
            to_iso8601("2021-03-04T05:06:07+0100").as_deref(),
            Some("2021-03-04T04:06:07.000Z")
        );
        assert_eq!(
            to_iso8601("2021-03-04T05:06:07.5-0230").as_deref(),
            Some("2021-03-04T07:36:07.500Z")
        );
    }

    #[test]
    fn test_common_deviations() {
        assert_eq!(
            to_iso8601("2021-03-04 05:06:07").as_deref(),
            Some("2021-03-04T05:06:07.000Z")
        );
        assert_eq!(
            to_iso8601("2021-03-04T05:06:07").as_deref(),
            Some("2021-03-04T05:06:07.000Z")
        );
        assert_eq!(
            to_iso8601("2021-03-04").as_deref(),
            Some("2021-03-04T00:00:00.000Z")
        );
    }

    #[test]
    fn test_surrounding_whitespace_ignored() {
        assert_eq!(
            to_iso8601("\n  2021-03-04T05:06:07Z  ").as_deref(),
            Some("2021-03-04T05:06:07.000Z")
        );
    }

    #[test]
    fn test_unparseable_is_none() {
        assert_eq!(to_iso8601(""), None);
        assert_eq!(to_iso8601("   "), None);
        assert_eq!(to_iso8601("not a date"), None);
        assert_eq!(to_iso8601("2021-13-45T99:00:00Z"), None);
    }
}
