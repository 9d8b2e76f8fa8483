//! Representative image and author extraction from parsed feed entries.
//!
//! Image sources are consulted in a fixed order: structured media content,
//! then thumbnails, then enclosure links, then a pattern scan over the
//! entry's HTML body. Explicit feed metadata always outranks anything
//! scraped out of the HTML.

use feed_rs::model::Entry;
use once_cell::sync::Lazy;
use regex::Regex;

static IMG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<img[^>]+src\s*=\s*["']([^"']+)["'][^>]*>"#).unwrap());

static ALT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"alt\s*=\s*["']([^"']*)["']"#).unwrap());

/// A representative image for an item, with an optional credit line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaImage {
    pub url: String,
    pub credit: Option<String>,
}

/// Find a representative image for the entry, first match wins.
pub fn extract_media(entry: &Entry) -> Option<MediaImage> {
    media_content_image(entry)
        .or_else(|| media_thumbnail(entry))
        .or_else(|| enclosure_image(entry))
        .or_else(|| scan_html_image(entry))
}

/// Author of the entry: explicit author first, then contributor.
pub fn extract_author(entry: &Entry) -> Option<String> {
    entry
        .authors
        .first()
        .or_else(|| entry.contributors.first())
        .map(|person| person.name.clone())
        .filter(|name| !name.is_empty())
}

fn media_content_image(entry: &Entry) -> Option<MediaImage> {
    for object in &entry.media {
        for content in &object.content {
            let is_image = content
                .content_type
                .as_ref()
                .map(|mime| mime.to_string().starts_with("image"))
                .unwrap_or(false);
            if !is_image {
                continue;
            }
            if let Some(url) = content.url.as_ref() {
                return Some(MediaImage {
                    url: url.to_string(),
                    credit: object
                        .credits
                        .first()
                        .map(|credit| credit.entity.clone())
                        .filter(|entity| !entity.is_empty()),
                });
            }
        }
    }
    None
}

fn media_thumbnail(entry: &Entry) -> Option<MediaImage> {
    entry
        .media
        .iter()
        .flat_map(|object| object.thumbnails.iter())
        .next()
        .map(|thumbnail| MediaImage {
            url: thumbnail.image.uri.clone(),
            credit: None,
        })
}

fn enclosure_image(entry: &Entry) -> Option<MediaImage> {
    entry
        .links
        .iter()
        .find(|link| {
            link.rel.as_deref() == Some("enclosure")
                && link
                    .media_type
                    .as_deref()
                    .map_or(false, |media_type| media_type.starts_with("image/"))
        })
        .map(|link| MediaImage {
            url: link.href.clone(),
            credit: None,
        })
}

/// Fall back to the first `<img>` tag in the entry body, preferring full
/// content over the summary. The tag's `alt` text doubles as a credit.
fn scan_html_image(entry: &Entry) -> Option<MediaImage> {
    let content_body = entry
        .content
        .as_ref()
        .and_then(|content| content.body.as_deref());
    let summary_body = entry.summary.as_ref().map(|text| text.content.as_str());

    first_img_tag(content_body.or(summary_body)?)
}

pub(crate) fn first_img_tag(html: &str) -> Option<MediaImage> {
    let captures = IMG_RE.captures(html)?;
    let tag = captures.get(0).map(|m| m.as_str()).unwrap_or_default();
    let credit = ALT_RE
        .captures(tag)
        .map(|alt| alt[1].to_string())
        .filter(|alt| !alt.is_empty());

    Some(MediaImage {
        url: captures[1].to_string(),
        credit,
    })
}
