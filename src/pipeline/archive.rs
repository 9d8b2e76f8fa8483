//! Article link rewriting through the archive service.

use url::Url;

/// Strip the query string and fragment from `link`, then prepend the
/// archive prefix. Links that fail to parse are passed through unchanged
/// behind the prefix.
pub fn archive_link(archive_prefix: &str, link: &str) -> String {
    match Url::parse(link) {
        Ok(mut url) => {
            url.set_query(None);
            url.set_fragment(None);
            format!("{}{}", archive_prefix, url)
        }
        Err(_) => format!("{}{}", archive_prefix, link),
    }
}

/// Host of the archive service, used to label the output channel.
pub fn archive_service(archive_prefix: &str) -> String {
    Url::parse(archive_prefix)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .unwrap_or_else(|| archive_prefix.trim_end_matches('/').to_string())
}
