//! The reformatting pipeline.
//!
//! Every stage exchanges the same intermediate representation
//! ([`FeedItem`]): the builder and loader both produce it, the merge
//! engine combines it, and the serializer consumes it. Enrichment rides
//! along as optional fields instead of forking the pipeline.

pub mod archive;
pub mod extract;
pub mod item;
pub mod loader;
pub mod merge;
pub mod output;

pub use self::extract::MediaImage;
pub use self::item::{ChannelInfo, FeedItem};
pub use self::merge::{MergePolicy, MAX_FEED_ITEMS};

use std::path::PathBuf;

use anyhow::Result;
use tracing::{error, info, warn};

use crate::config::FeedSpec;
use crate::feed::{fetch_feed, is_valid_url, parse_feed};
use crate::TARGET_FEED;

/// Everything one feed run needs to know.
#[derive(Debug, Clone)]
pub struct ReformatOptions {
    pub source_url: String,
    pub output_path: PathBuf,
    /// When set, only article links containing this domain are kept.
    pub domain: Option<String>,
    pub archive_prefix: String,
    pub merge_policy: MergePolicy,
}

impl ReformatOptions {
    pub fn from_spec(spec: &FeedSpec, archive_prefix: &str, merge_policy: MergePolicy) -> Self {
        Self {
            source_url: spec.source_url.clone(),
            output_path: spec.output_path.clone(),
            domain: spec.domain.clone(),
            archive_prefix: archive_prefix.to_string(),
            merge_policy,
        }
    }
}

/// Run the full pipeline for one feed and rewrite its output file.
/// Returns the number of items written.
pub async fn reformat_feed(client: &reqwest::Client, options: &ReformatOptions) -> Result<usize> {
    info!(
        target: TARGET_FEED,
        "Processing feed: {} -> {}",
        options.source_url,
        options.output_path.display()
    );

    let body = fetch_feed(client, &options.source_url).await?;
    let feed = parse_feed(&body)?;

    let new_items = item::build_items(&feed, options);
    if new_items.is_empty() {
        warn!(
            target: TARGET_FEED,
            "No items found or processed in feed: {}",
            options.source_url
        );
    }

    let existing_items = loader::load_existing(&options.output_path);
    let merged = merge::merge_items(new_items, existing_items, options.merge_policy);

    let info = item::channel_info(&feed, options);
    let channel = output::build_channel(&info, &merged);
    output::write_feed(&options.output_path, &channel)?;

    info!(
        target: TARGET_FEED,
        "Saved {} items to {}",
        merged.len(),
        options.output_path.display()
    );
    Ok(merged.len())
}

/// Process every feed in the list, one at a time. A failure on one feed is
/// logged and never stops the rest of the batch. Returns how many feeds
/// completed.
pub async fn run_batch(
    client: &reqwest::Client,
    specs: &[FeedSpec],
    archive_prefix: &str,
    merge_policy: MergePolicy,
) -> usize {
    let mut processed = 0;

    for spec in specs {
        if !is_valid_url(&spec.source_url) {
            warn!(target: TARGET_FEED, "Skipping invalid feed URL: {}", spec.source_url);
            continue;
        }

        let options = ReformatOptions::from_spec(spec, archive_prefix, merge_policy);
        match reformat_feed(client, &options).await {
            Ok(_) => processed += 1,
            Err(err) => {
                error!(
                    target: TARGET_FEED,
                    "Error processing feed {}: {:#}",
                    spec.source_url,
                    err
                );
            }
        }
    }

    processed
}
