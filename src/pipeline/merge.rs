//! Merging freshly built items with the previously persisted set.

use std::collections::HashMap;

use clap::ValueEnum;
use sha2::{Digest, Sha256};

use super::item::FeedItem;

/// Upper bound on the number of items kept in the output feed.
pub const MAX_FEED_ITEMS: usize = 100;

/// What happens when a fresh item and a persisted item share a guid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum MergePolicy {
    /// Fresh data replaces the persisted item.
    #[default]
    PreferNew,
    /// The persisted item is kept untouched.
    PreferExisting,
}

/// Combine new and existing items into one deduplicated list, ordered by
/// publication time (newest first) and capped at [`MAX_FEED_ITEMS`].
///
/// The publication time first recorded for a guid is sticky: under
/// [`MergePolicy::PreferNew`] a replacement takes the persisted item's
/// timestamp, so re-fetching an entry never reshuffles the feed or changes
/// which items fall off the truncation boundary.
pub fn merge_items(
    new_items: Vec<FeedItem>,
    existing_items: Vec<FeedItem>,
    policy: MergePolicy,
) -> Vec<FeedItem> {
    let mut by_guid: HashMap<String, FeedItem> = HashMap::new();

    for item in existing_items {
        by_guid.insert(item.guid.clone(), item);
    }

    for mut item in new_items {
        match by_guid.get(&item.guid) {
            Some(existing) => {
                if policy == MergePolicy::PreferNew {
                    item.published = existing.published;
                    by_guid.insert(item.guid.clone(), item);
                }
            }
            None => {
                by_guid.insert(item.guid.clone(), item);
            }
        }
    }

    let mut merged: Vec<FeedItem> = by_guid.into_values().collect();
    merged.sort_by(|a, b| {
        b.published
            .cmp(&a.published)
            .then_with(|| guid_digest(&a.guid).cmp(&guid_digest(&b.guid)))
    });
    merged.truncate(MAX_FEED_ITEMS);
    merged
}

/// Deterministic tie-break for items sharing a publication time. Derived
/// from the guid so equal inputs sort identically on every run.
fn guid_digest(guid: &str) -> [u8; 32] {
    Sha256::digest(guid.as_bytes()).into()
}
