//! RSS 2.0 serialization and file output.
//!
//! Media and Dublin Core enrichment is attached to the document tree
//! through the rss crate's extension support, so the serialized feed stays
//! well-formed no matter what the item content looks like.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use rss::extension::dublincore::DublinCoreExtensionBuilder;
use rss::extension::{Extension, ExtensionBuilder, ExtensionMap};
use rss::{Channel, ChannelBuilder, GuidBuilder, ImageBuilder, Item, ItemBuilder};

use super::extract::MediaImage;
use super::item::{ChannelInfo, FeedItem};

pub const MEDIA_NAMESPACE: &str = "http://search.yahoo.com/mrss/";
pub const DUBLIN_CORE_NAMESPACE: &str = "http://purl.org/dc/elements/1.1/";

/// Render channel metadata and the final item list as an RSS 2.0 channel.
/// `lastBuildDate` is stamped fresh on every call.
pub fn build_channel(info: &ChannelInfo, items: &[FeedItem]) -> Channel {
    let mut namespaces = BTreeMap::new();
    namespaces.insert("media".to_string(), MEDIA_NAMESPACE.to_string());
    namespaces.insert("dc".to_string(), DUBLIN_CORE_NAMESPACE.to_string());

    let rss_items: Vec<Item> = items.iter().map(item_to_rss).collect();

    ChannelBuilder::default()
        .namespaces(namespaces)
        .title(info.title.clone())
        .link(info.link.clone())
        .description(info.description.clone())
        .language(info.language.clone())
        .copyright(info.copyright.clone())
        .image(info.image.as_ref().map(|image| {
            ImageBuilder::default()
                .url(image.url.clone())
                .title(image.title.clone())
                .link(image.link.clone())
                .build()
        }))
        .last_build_date(Some(Utc::now().to_rfc2822()))
        .items(rss_items)
        .build()
}

/// Write the channel to `path`, creating parent directories as needed. The
/// previous file contents are fully replaced.
pub fn write_feed(path: &Path, channel: &Channel) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory {}", parent.display())
            })?;
        }
    }

    let xml = format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}", channel);
    fs::write(path, xml.as_bytes())
        .with_context(|| format!("Failed to write feed to {}", path.display()))
}

fn item_to_rss(item: &FeedItem) -> Item {
    let guid = GuidBuilder::default()
        .value(item.guid.clone())
        .permalink(false)
        .build();

    let mut rss_item = ItemBuilder::default()
        .title(Some(item.title.clone()))
        .link(Some(item.link.clone()))
        .description(Some(item.description.clone()))
        .guid(Some(guid))
        .pub_date(Some(item.published.to_rfc2822()))
        .build();

    if let Some(author) = &item.author {
        rss_item.set_dublin_core_ext(
            DublinCoreExtensionBuilder::default()
                .creators(vec![author.clone()])
                .build(),
        );
    }
    if let Some(media) = &item.media {
        rss_item.set_extensions(media_extension(media));
    }

    rss_item
}

fn media_extension(media: &MediaImage) -> ExtensionMap {
    let mut attrs = BTreeMap::new();
    attrs.insert("url".to_string(), media.url.clone());
    attrs.insert("medium".to_string(), "image".to_string());

    let mut children: BTreeMap<String, Vec<Extension>> = BTreeMap::new();
    if let Some(credit) = &media.credit {
        children.insert(
            "credit".to_string(),
            vec![ExtensionBuilder::default()
                .name("media:credit".to_string())
                .value(Some(credit.clone()))
                .build()],
        );
    }

    let content = ExtensionBuilder::default()
        .name("media:content".to_string())
        .attrs(attrs)
        .children(children)
        .build();

    let mut map = ExtensionMap::default();
    map.entry("media".to_string())
        .or_default()
        .insert("content".to_string(), vec![content]);
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::loader::load_existing;
    use chrono::TimeZone;
    use std::fs;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("rss_reformatter_output_tests");
        fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    fn sample_info() -> ChannelInfo {
        ChannelInfo {
            title: "Example News (archive.is)".to_string(),
            link: "https://example.com/rss.xml".to_string(),
            description: "All the news via archive.is".to_string(),
            image: None,
            language: Some("en".to_string()),
            copyright: None,
        }
    }

    fn sample_items() -> Vec<FeedItem> {
        let published = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        vec![
            FeedItem {
                title: "Enriched".to_string(),
                link: "https://archive.is/newest/https://example.com/a".to_string(),
                description: "Body A".to_string(),
                guid: "key-a".to_string(),
                published,
                author: Some("Sam Reporter".to_string()),
                media: Some(MediaImage {
                    url: "https://img.example.com/a.jpg".to_string(),
                    credit: Some("Getty & Co".to_string()),
                }),
            },
            FeedItem {
                title: "Plain".to_string(),
                link: "https://archive.is/newest/https://example.com/b".to_string(),
                description: "Body B".to_string(),
                guid: "key-b".to_string(),
                published,
                author: None,
                media: None,
            },
        ]
    }

    #[test]
    fn test_serializes_namespaces_and_extensions() {
        let channel = build_channel(&sample_info(), &sample_items());
        let xml = channel.to_string();

        assert!(xml.contains(r#"xmlns:media="http://search.yahoo.com/mrss/""#));
        assert!(xml.contains(r#"xmlns:dc="http://purl.org/dc/elements/1.1/""#));
        assert!(xml.contains(r#"url="https://img.example.com/a.jpg""#));
        assert!(xml.contains("<dc:creator>Sam Reporter</dc:creator>"));
        // Injected text is escaped by the serializer.
        assert!(xml.contains("Getty &amp; Co"));
        assert!(xml.contains(r#"<guid isPermaLink="false">key-a</guid>"#));
    }

    #[test]
    fn test_plain_item_carries_no_extensions() {
        let channel = build_channel(&sample_info(), &sample_items()[1..]);
        let xml = channel.to_string();

        assert!(!xml.contains("media:content"));
        assert!(!xml.contains("dc:creator"));
    }

    #[test]
    fn test_write_feed_creates_parent_directories() {
        let path = temp_path("nested/dir/feed.xml");
        let channel = build_channel(&sample_info(), &sample_items());

        write_feed(&path, &channel).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_round_trip_preserves_identity_and_enrichment() {
        let path = temp_path("round_trip.xml");
        let items = sample_items();
        let channel = build_channel(&sample_info(), &items);
        write_feed(&path, &channel).unwrap();

        let loaded = load_existing(&path);

        assert_eq!(loaded.len(), items.len());
        for (loaded_item, original) in loaded.iter().zip(&items) {
            assert_eq!(loaded_item.guid, original.guid);
            assert_eq!(loaded_item.link, original.link);
            assert_eq!(loaded_item.published, original.published);
        }
        assert_eq!(loaded[0].author.as_deref(), Some("Sam Reporter"));
        assert_eq!(
            loaded[0].media,
            Some(MediaImage {
                url: "https://img.example.com/a.jpg".to_string(),
                credit: Some("Getty & Co".to_string()),
            })
        );

        fs::remove_file(&path).unwrap();
    }
}
