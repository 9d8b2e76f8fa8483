//! Feed retrieval and inbound parsing.
//!
//! This module handles fetching raw feed documents over HTTP and parsing
//! them into structured entries.

mod client;
mod parser;

pub use self::client::{create_http_client, fetch_feed, REQUEST_TIMEOUT};
pub use self::parser::{cleanup_xml, is_valid_url, parse_date, parse_feed};
