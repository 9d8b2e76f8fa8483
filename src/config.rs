//! Feed list configuration.
//!
//! The batch mode reads a line-oriented text file where each non-empty,
//! non-comment line names one feed to reformat:
//!
//! ```text
//! # source-url            output-path              [domain]
//! https://ft.com/rss.xml  feeds/ft.xml             ft.com
//! https://example.com/f   feeds/example.xml
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;

use crate::TARGET_FEED;

/// One line of the feed list: where to fetch from, where to write to, and
/// an optional domain the article links must contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSpec {
    pub source_url: String,
    pub output_path: PathBuf,
    pub domain: Option<String>,
}

/// Read and parse a feed list file.
pub fn parse_feed_list(path: &Path) -> Result<Vec<FeedSpec>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read feed list {}", path.display()))?;
    Ok(parse_feed_lines(&contents))
}

/// Parse feed list contents. Blank lines and `#` comments are ignored;
/// lines with fewer than two fields are logged and skipped.
pub fn parse_feed_lines(contents: &str) -> Vec<FeedSpec> {
    let mut specs = Vec::new();

    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut fields = line.split_whitespace();
        match (fields.next(), fields.next()) {
            (Some(source_url), Some(output_path)) => specs.push(FeedSpec {
                source_url: source_url.to_string(),
                output_path: PathBuf::from(output_path),
                domain: fields.next().map(str::to_string),
            }),
            _ => {
                warn!(
                    target: TARGET_FEED,
                    "Skipping malformed feed list line {}: {}",
                    index + 1,
                    line
                );
            }
        }
    }

    specs
}
