//! Reloading the previously written output feed.
//!
//! The loader produces the same `FeedItem` shape as the item builder so
//! persisted history merges uniformly with freshly fetched entries.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::Utc;
use rss::Channel;
use tracing::{debug, warn};

use super::extract::MediaImage;
use super::item::{FeedItem, NO_DESCRIPTION, NO_TITLE};
use crate::feed::parse_date;
use crate::TARGET_FEED;

/// Parse the previous run's output back into normalized items.
///
/// A missing file is an empty history, not an error. An unreadable or
/// unparseable file is logged and treated the same way.
pub fn load_existing(path: &Path) -> Vec<FeedItem> {
    if !path.exists() {
        debug!(target: TARGET_FEED, "No existing feed at {}", path.display());
        return Vec::new();
    }

    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) => {
            warn!(
                target: TARGET_FEED,
                "Failed to open existing feed {}: {}",
                path.display(),
                err
            );
            return Vec::new();
        }
    };

    let channel = match Channel::read_from(BufReader::new(file)) {
        Ok(channel) => channel,
        Err(err) => {
            warn!(
                target: TARGET_FEED,
                "Failed to parse existing feed {}: {}",
                path.display(),
                err
            );
            return Vec::new();
        }
    };

    channel.items().iter().filter_map(item_from_rss).collect()
}

fn item_from_rss(item: &rss::Item) -> Option<FeedItem> {
    // An item that lost its link cannot be archived again; drop it the way
    // the builder drops linkless entries.
    let link = item.link()?.to_string();
    let guid = item
        .guid()
        .map(|guid| guid.value().to_string())
        .unwrap_or_else(|| link.clone());

    // A malformed pubDate degrades to the current time rather than losing
    // the item.
    let published = item
        .pub_date()
        .and_then(parse_date)
        .unwrap_or_else(Utc::now);

    let author = item
        .dublin_core_ext()
        .and_then(|dc| dc.creators().first().cloned())
        .or_else(|| item.author().map(str::to_string));

    Some(FeedItem {
        title: item.title().unwrap_or(NO_TITLE).to_string(),
        link,
        description: item.description().unwrap_or(NO_DESCRIPTION).to_string(),
        guid,
        published,
        author,
        media: media_from_extensions(item),
    })
}

fn media_from_extensions(item: &rss::Item) -> Option<MediaImage> {
    let content = item
        .extensions()
        .get("media")?
        .get("content")?
        .first()?;
    let url = content.attrs().get("url")?.clone();
    let credit = content
        .children()
        .get("credit")
        .and_then(|credits| credits.first())
        .and_then(|credit| credit.value())
        .map(str::to_string);

    Some(MediaImage { url, credit })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("rss_reformatter_loader_tests");
        fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    #[test]
    fn test_missing_file_is_empty_history() {
        let path = temp_path("does_not_exist.xml");
        assert!(load_existing(&path).is_empty());
    }

    #[test]
    fn test_unparseable_file_is_empty_history() {
        let path = temp_path("garbage.xml");
        fs::write(&path, "this is not xml at all").unwrap();

        assert!(load_existing(&path).is_empty());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_loads_persisted_items() {
        let path = temp_path("persisted.xml");
        fs::write(
            &path,
            r#"<?xml version="1.0" encoding="UTF-8"?>
            <rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/">
              <channel>
                <title>t</title><link>l</link><description>d</description>
                <item>
                  <title>Kept</title>
                  <link>https://archive.is/newest/https://example.com/a</link>
                  <description>Body</description>
                  <guid isPermaLink="false">key-a</guid>
                  <pubDate>Sat, 1 Mar 2025 12:00:00 +0000</pubDate>
                  <dc:creator>Sam Reporter</dc:creator>
                </item>
              </channel>
            </rss>"#,
        )
        .unwrap();

        let items = load_existing(&path);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].guid, "key-a");
        assert_eq!(
            items[0].link,
            "https://archive.is/newest/https://example.com/a"
        );
        assert_eq!(items[0].author.as_deref(), Some("Sam Reporter"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_malformed_pub_date_degrades_to_now() {
        let path = temp_path("bad_date.xml");
        fs::write(
            &path,
            r#"<rss version="2.0">
              <channel>
                <title>t</title><link>l</link><description>d</description>
                <item>
                  <title>x</title>
                  <link>https://example.com/a</link>
                  <guid isPermaLink="false">key</guid>
                  <pubDate>never o'clock</pubDate>
                </item>
              </channel>
            </rss>"#,
        )
        .unwrap();

        let before = Utc::now();
        let items = load_existing(&path);
        assert_eq!(items.len(), 1);
        assert!(items[0].published >= before);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_item_without_link_is_dropped() {
        let path = temp_path("linkless.xml");
        fs::write(
            &path,
            r#"<rss version="2.0">
              <channel>
                <title>t</title><link>l</link><description>d</description>
                <item>
                  <title>linkless</title>
                  <guid isPermaLink="false">key</guid>
                </item>
              </channel>
            </rss>"#,
        )
        .unwrap();

        assert!(load_existing(&path).is_empty());

        fs::remove_file(&path).unwrap();
    }
}
