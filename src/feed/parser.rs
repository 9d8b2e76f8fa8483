//! Inbound feed parsing for RSS, Atom, and JSON Feed documents.

use std::io::Cursor;

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use feed_rs::model::Feed;
use feed_rs::parser;
use tracing::debug;

use crate::TARGET_FEED;

/// Helper function to validate a URL
pub fn is_valid_url(url: &str) -> bool {
    if let Ok(parsed) = url::Url::parse(url) {
        parsed.scheme() == "http" || parsed.scheme() == "https"
    } else {
        false
    }
}

/// Parse a date string in the formats that show up in real feeds.
pub fn parse_date(date_str: &str) -> Option<DateTime<Utc>> {
    // Try RFC3339
    if let Ok(date) = DateTime::parse_from_rfc3339(date_str) {
        return Some(date.with_timezone(&Utc));
    }

    // Try RFC2822
    if let Ok(date) = DateTime::parse_from_rfc2822(date_str) {
        return Some(date.with_timezone(&Utc));
    }

    // Try ISO 8601 with a numeric offset
    if let Ok(date) = DateTime::parse_from_str(date_str, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(date.with_timezone(&Utc));
    }

    None
}

/// Clean up malformed XML
pub fn cleanup_xml(xml: &str) -> String {
    let mut cleaned = xml.trim().to_string();

    // Remove any UTF-8 BOM if present
    if let Some(stripped) = cleaned.strip_prefix('\u{FEFF}') {
        cleaned = stripped.to_string();
    }

    // Remove any leading junk before <?xml, <rss, or <feed
    if let Some(xml_start) = cleaned.find("<?xml") {
        cleaned = cleaned[xml_start..].to_string();
    } else if let Some(rss_start) = cleaned.find("<rss") {
        cleaned = cleaned[rss_start..].to_string();
    } else if let Some(feed_start) = cleaned.find("<feed") {
        cleaned = cleaned[feed_start..].to_string();
    }

    // Replace common problematic entities
    cleaned = cleaned
        .replace("&nbsp;", "&#160;")
        .replace("&ndash;", "&#8211;")
        .replace("&mdash;", "&#8212;")
        .replace("&rsquo;", "&#8217;")
        .replace("&lsquo;", "&#8216;")
        .replace("&rdquo;", "&#8221;")
        .replace("&ldquo;", "&#8220;")
        .replace("&amp;amp;", "&amp;")
        .replace("&apos;", "&#39;");

    // Remove any invalid XML characters
    cleaned = cleaned
        .chars()
        .filter(|&c| {
            matches!(c,
                '\u{0009}' | // tab
                '\u{000A}' | // newline
                '\u{000D}' | // carriage return
                '\u{0020}'..='\u{D7FF}' |
                '\u{E000}'..='\u{FFFD}' |
                '\u{10000}'..='\u{10FFFF}'
            )
        })
        .collect();

    // Ensure proper XML declaration if missing
    if !cleaned.starts_with("<?xml") {
        cleaned = format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}", cleaned);
    }

    cleaned
}

/// Parse a feed document, retrying once after XML cleanup when the document
/// still looks like RSS or Atom.
pub fn parse_feed(text: &str) -> Result<Feed> {
    match parser::parse(Cursor::new(text)) {
        Ok(feed) => Ok(feed),
        Err(first_err) => {
            let cleaned = cleanup_xml(text);
            if cleaned.contains("<rss") || cleaned.contains("<feed") {
                match parser::parse(Cursor::new(cleaned.as_bytes())) {
                    Ok(feed) => {
                        debug!(target: TARGET_FEED, "Feed parsed successfully after XML cleanup");
                        Ok(feed)
                    }
                    Err(second_err) => bail!(
                        "Failed to parse feed even after cleanup. First error: {}. Second error: {}",
                        first_err,
                        second_err
                    ),
                }
            } else {
                bail!("Content is not an RSS or Atom feed: {}", first_err)
            }
        }
    }
}
