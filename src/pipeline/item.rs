//! Normalized output items and channel metadata.
//!
//! `FeedItem` is the intermediate representation every pipeline stage takes
//! and returns: the builder produces it from fresh entries, the loader
//! reconstructs it from the previous output file, and the merge and
//! serialization stages consume it.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use feed_rs::model::Feed;
use tracing::debug;

use super::archive::{archive_link, archive_service};
use super::extract::{extract_author, extract_media, MediaImage};
use super::ReformatOptions;
use crate::TARGET_FEED;

pub const NO_TITLE: &str = "No Title";
pub const NO_DESCRIPTION: &str = "No Description";

/// One normalized feed item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    /// Archived article link, query string and fragment removed.
    pub link: String,
    pub description: String,
    /// Identity key: the upstream entry id, or the archived link when the
    /// upstream declares none. Unique within an output feed.
    pub guid: String,
    pub published: DateTime<Utc>,
    pub author: Option<String>,
    pub media: Option<MediaImage>,
}

/// Channel-level metadata for the output feed.
#[derive(Debug, Clone, Default)]
pub struct ChannelInfo {
    pub title: String,
    pub link: String,
    pub description: String,
    pub image: Option<ChannelImage>,
    pub language: Option<String>,
    pub copyright: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ChannelImage {
    pub url: String,
    pub title: String,
    pub link: String,
}

/// Build normalized items from a freshly parsed feed.
///
/// Entries without a link are dropped, as are entries outside the optional
/// domain filter and in-batch guid duplicates. Missing optional fields fall
/// back to defaults and never fail the entry.
pub fn build_items(feed: &Feed, options: &ReformatOptions) -> Vec<FeedItem> {
    let mut seen = HashSet::new();
    let mut items = Vec::new();

    for entry in &feed.entries {
        let Some(original_link) = entry.links.first().map(|link| link.href.clone()) else {
            debug!(target: TARGET_FEED, "Skipping entry without a link");
            continue;
        };

        if let Some(domain) = options.domain.as_deref() {
            if !original_link.contains(domain) {
                continue;
            }
        }

        let link = archive_link(&options.archive_prefix, &original_link);
        let guid = if entry.id.is_empty() {
            link.clone()
        } else {
            entry.id.clone()
        };
        if !seen.insert(guid.clone()) {
            debug!(target: TARGET_FEED, "Skipping duplicate guid in batch: {}", guid);
            continue;
        }

        let media = extract_media(entry);
        let mut description = entry
            .summary
            .as_ref()
            .map(|text| text.content.clone())
            .or_else(|| entry.content.as_ref().and_then(|content| content.body.clone()))
            .unwrap_or_else(|| NO_DESCRIPTION.to_string());
        if let Some(image) = &media {
            description = format!(
                r#"<img src="{}" alt="{}" /><br/><br/>{}"#,
                image.url,
                image.credit.as_deref().unwrap_or_default(),
                description
            );
        }

        items.push(FeedItem {
            title: entry
                .title
                .as_ref()
                .map(|title| title.content.clone())
                .unwrap_or_else(|| NO_TITLE.to_string()),
            link,
            description,
            guid,
            published: entry.published.unwrap_or_else(Utc::now),
            author: extract_author(entry),
            media,
        });
    }

    items
}

/// Derive output channel metadata from the upstream feed. The title and
/// description are labeled with the archive service host and, when one is
/// configured, the domain filter.
pub fn channel_info(feed: &Feed, options: &ReformatOptions) -> ChannelInfo {
    let service = archive_service(&options.archive_prefix);
    let feed_title = feed
        .title
        .as_ref()
        .map(|title| title.content.clone())
        .unwrap_or_else(|| "Feed".to_string());
    let feed_description = feed
        .description
        .as_ref()
        .map(|description| description.content.clone())
        .unwrap_or_else(|| "Reformatted Feed".to_string());
    let domain_suffix = options
        .domain
        .as_deref()
        .map(|domain| format!(" ({})", domain))
        .unwrap_or_default();

    let link = match options.domain.as_deref() {
        Some(domain) if domain.contains("://") => domain.to_string(),
        Some(domain) => format!("https://{}/", domain),
        None => options.source_url.clone(),
    };

    let image = feed.logo.as_ref().map(|logo| ChannelImage {
        url: logo.uri.clone(),
        title: logo.title.clone().unwrap_or_else(|| feed_title.clone()),
        link: logo
            .link
            .as_ref()
            .map(|logo_link| logo_link.href.clone())
            .unwrap_or_else(|| link.clone()),
    });

    ChannelInfo {
        title: format!("{}{} ({})", feed_title, domain_suffix, service),
        link,
        description: format!("{} via {}", feed_description, service),
        image,
        language: feed.language.clone(),
        copyright: feed.rights.as_ref().map(|rights| rights.content.clone()),
    }
}
