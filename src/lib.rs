pub mod config;
pub mod feed;
pub mod logging;
pub mod pipeline;

pub const TARGET_WEB_REQUEST: &str = "web_request";
pub const TARGET_FEED: &str = "feed";
