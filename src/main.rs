use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use rss_reformatter::config::parse_feed_list;
use rss_reformatter::feed::create_http_client;
use rss_reformatter::logging::configure_logging;
use rss_reformatter::pipeline::{reformat_feed, run_batch, MergePolicy, ReformatOptions};

const DEFAULT_ARCHIVE_PREFIX: &str = "https://archive.is/newest/";

#[derive(Parser)]
#[command(author, version, about = "Rewrite RSS feed links through an archive service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reformat a single feed
    Single {
        /// URL of the original RSS feed
        #[arg(long)]
        url: String,

        /// Path to save the generated XML file
        #[arg(long)]
        output: PathBuf,

        /// Only keep article links containing this domain (e.g. "ft.com")
        #[arg(long)]
        domain: Option<String>,

        /// Prefix prepended to cleaned article URLs
        #[arg(long, default_value = DEFAULT_ARCHIVE_PREFIX)]
        archive_prefix: String,

        /// Collision policy when a fetched item matches a persisted one
        #[arg(long, value_enum, default_value_t = MergePolicy::PreferNew)]
        merge_policy: MergePolicy,
    },

    /// Reformat every feed named in a feed list file
    Batch {
        /// Feed list file: one `source-url output-path [domain]` per line
        #[arg(long)]
        feeds: PathBuf,

        /// Prefix prepended to cleaned article URLs
        #[arg(long, default_value = DEFAULT_ARCHIVE_PREFIX)]
        archive_prefix: String,

        /// Collision policy when a fetched item matches a persisted one
        #[arg(long, value_enum, default_value_t = MergePolicy::PreferNew)]
        merge_policy: MergePolicy,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    configure_logging();

    let cli = Cli::parse();
    let client = create_http_client()?;

    match cli.command {
        Commands::Single {
            url,
            output,
            domain,
            archive_prefix,
            merge_policy,
        } => {
            let options = ReformatOptions {
                source_url: url,
                output_path: output,
                domain,
                archive_prefix,
                merge_policy,
            };
            reformat_feed(&client, &options).await?;
        }
        Commands::Batch {
            feeds,
            archive_prefix,
            merge_policy,
        } => {
            let specs = parse_feed_list(&feeds)?;
            if specs.is_empty() {
                bail!("No feeds found in {}", feeds.display());
            }
            let processed = run_batch(&client, &specs, &archive_prefix, merge_policy).await;
            info!("Processed {}/{} feeds", processed, specs.len());
        }
    }

    Ok(())
}
