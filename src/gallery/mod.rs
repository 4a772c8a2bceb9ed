//! Community meme listing shown next to the editor.

use std::fmt;

use image::RgbaImage;
use serde::Deserialize;
use thiserror::Error;

use crate::net::{Fetch, FetchError};

pub const DEFAULT_SUBREDDIT: &str = "programmingmemes";
const LISTING_LIMIT: usize = 12;
/// Longest edge of a gallery preview, in pixels.
pub const THUMBNAIL_MAX_SIDE: u32 = 160;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GalleryFilter {
    #[default]
    Trending,
    Latest,
    TopWeekly,
    BestOfAllTime,
}

impl GalleryFilter {
    pub const ALL: [GalleryFilter; 4] = [
        Self::Trending,
        Self::Latest,
        Self::TopWeekly,
        Self::BestOfAllTime,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Trending => "Trending",
            Self::Latest => "Latest",
            Self::TopWeekly => "Top Weekly",
            Self::BestOfAllTime => "Best Of All Time",
        }
    }

    const fn listing(self) -> (&'static str, Option<&'static str>) {
        match self {
            Self::Trending => ("hot", None),
            Self::Latest => ("new", None),
            Self::TopWeekly => ("top", Some("week")),
            // The listing only offers a month window for this filter.
            Self::BestOfAllTime => ("top", Some("month")),
        }
    }

    pub fn listing_url(self, subreddit: &str) -> String {
        let (sort, window) = self.listing();
        let mut url =
            format!("https://www.reddit.com/r/{subreddit}/{sort}.json?limit={LISTING_LIMIT}");
        if let Some(window) = window {
            url.push_str("&t=");
            url.push_str(window);
        }
        url
    }
}

impl fmt::Display for GalleryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GalleryPost {
    pub id: String,
    pub title: String,
    pub url: String,
    pub permalink: String,
    /// Listing thumbnail; may also hold markers such as `"self"` or `"nsfw"`.
    #[serde(default)]
    pub thumbnail: Option<String>,
}

impl GalleryPost {
    pub fn discussion_url(&self) -> String {
        format!("https://www.reddit.com{}", self.permalink)
    }

    /// Image to fetch for the row preview: the listing thumbnail when it is a
    /// real link, else the post image itself.
    pub fn preview_url(&self) -> &str {
        self.thumbnail
            .as_deref()
            .filter(|thumbnail| {
                thumbnail.starts_with("https://") || thumbnail.starts_with("http://")
            })
            .unwrap_or(&self.url)
    }
}

#[derive(Debug, Error)]
pub enum GalleryError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("gallery listing is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to decode gallery image {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: image::ImageError,
    },
}

/// Decodes a post image and shrinks it so neither edge exceeds `max_side`.
pub fn decode_thumbnail(
    url: &str,
    bytes: &[u8],
    max_side: u32,
) -> Result<RgbaImage, GalleryError> {
    let decoded = image::load_from_memory(bytes).map_err(|source| GalleryError::Decode {
        url: url.to_string(),
        source,
    })?;
    let max_side = max_side.max(1);
    if decoded.width() <= max_side && decoded.height() <= max_side {
        return Ok(decoded.to_rgba8());
    }
    Ok(decoded.thumbnail(max_side, max_side).to_rgba8())
}

#[derive(Debug, Deserialize)]
struct Listing {
    #[serde(default)]
    data: Option<ListingData>,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<ListingChild>,
}

#[derive(Debug, Deserialize)]
struct ListingChild {
    data: GalleryPost,
}

/// A listing with no `data.children` is an empty gallery, not an error.
pub fn parse_listing(body: &[u8]) -> Result<Vec<GalleryPost>, GalleryError> {
    let listing: Listing = serde_json::from_slice(body)?;
    Ok(listing
        .data
        .map(|data| data.children.into_iter().map(|child| child.data).collect())
        .unwrap_or_default())
}

pub struct Gallery<F> {
    fetch: F,
    subreddit: String,
}

impl<F: Fetch> Gallery<F> {
    pub fn new(fetch: F, subreddit: impl Into<String>) -> Self {
        Self {
            fetch,
            subreddit: subreddit.into(),
        }
    }

    pub fn fetch_posts(&self, filter: GalleryFilter) -> Result<Vec<GalleryPost>, GalleryError> {
        let body = self.fetch.get(&filter.listing_url(&self.subreddit))?;
        let posts = parse_listing(&body)?;
        tracing::info!(filter = %filter, count = posts.len(), "loaded gallery posts");
        Ok(posts)
    }

    pub fn fetch_thumbnail(&self, post: &GalleryPost) -> Result<RgbaImage, GalleryError> {
        let url = post.preview_url();
        let body = self.fetch.get(url)?;
        decode_thumbnail(url, &body, THUMBNAIL_MAX_SIDE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::encode_png;
    use crate::net::testing::CannedFetch;
    use image::Rgba;

    const LISTING: &str = r#"{
        "kind": "Listing",
        "data": {
            "children": [
                {"kind": "t3", "data": {"id": "p1", "title": "It works on my machine", "url": "https://i.test/p1.png", "permalink": "/r/programmingmemes/comments/p1/", "thumbnail": "https://thumbs.test/p1.jpg", "score": 10}},
                {"kind": "t3", "data": {"id": "p2", "title": "Off by one", "url": "https://i.test/p2.jpg", "permalink": "/r/programmingmemes/comments/p2/", "thumbnail": "default"}}
            ]
        }
    }"#;

    #[test]
    fn filters_map_to_listing_urls() {
        assert_eq!(
            GalleryFilter::Trending.listing_url("programmingmemes"),
            "https://www.reddit.com/r/programmingmemes/hot.json?limit=12"
        );
        assert_eq!(
            GalleryFilter::Latest.listing_url("programmingmemes"),
            "https://www.reddit.com/r/programmingmemes/new.json?limit=12"
        );
        assert_eq!(
            GalleryFilter::TopWeekly.listing_url("programmingmemes"),
            "https://www.reddit.com/r/programmingmemes/top.json?limit=12&t=week"
        );
        assert_eq!(
            GalleryFilter::BestOfAllTime.listing_url("programmingmemes"),
            "https://www.reddit.com/r/programmingmemes/top.json?limit=12&t=month"
        );
    }

    #[test]
    fn parse_listing_extracts_posts_and_tolerates_missing_data() {
        let posts = parse_listing(LISTING.as_bytes()).expect("listing should parse");
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].title, "It works on my machine");
        assert_eq!(
            posts[1].discussion_url(),
            "https://www.reddit.com/r/programmingmemes/comments/p2/"
        );

        assert!(parse_listing(br#"{"error": 429}"#).unwrap().is_empty());
        assert!(parse_listing(b"oops").is_err());
    }

    #[test]
    fn gallery_requests_filter_url() {
        let url = GalleryFilter::TopWeekly.listing_url(DEFAULT_SUBREDDIT);
        let gallery = Gallery::new(CannedFetch::default().with(&url, LISTING), DEFAULT_SUBREDDIT);

        let posts = gallery
            .fetch_posts(GalleryFilter::TopWeekly)
            .expect("listing should load");
        assert_eq!(posts.len(), 2);
        assert!(gallery.fetch_posts(GalleryFilter::Latest).is_err());
        assert_eq!(gallery.fetch.requested().len(), 2);
    }

    #[test]
    fn preview_prefers_linked_thumbnail_over_markers() {
        let posts = parse_listing(LISTING.as_bytes()).expect("listing should parse");
        assert_eq!(posts[0].preview_url(), "https://thumbs.test/p1.jpg");
        assert_eq!(posts[1].thumbnail.as_deref(), Some("default"));
        assert_eq!(posts[1].preview_url(), "https://i.test/p2.jpg");
    }

    #[test]
    fn thumbnail_is_fetched_and_shrunk_to_fit() {
        let posts = parse_listing(LISTING.as_bytes()).expect("listing should parse");
        let png = encode_png(&RgbaImage::from_pixel(640, 320, Rgba([200, 10, 10, 255]))).unwrap();
        let gallery = Gallery::new(
            CannedFetch::default().with("https://thumbs.test/p1.jpg", png),
            DEFAULT_SUBREDDIT,
        );

        let thumbnail = gallery.fetch_thumbnail(&posts[0]).expect("thumbnail should load");
        assert_eq!(thumbnail.dimensions(), (THUMBNAIL_MAX_SIDE, THUMBNAIL_MAX_SIDE / 2));
        assert_eq!(*thumbnail.get_pixel(10, 10), Rgba([200, 10, 10, 255]));
        assert!(gallery.fetch_thumbnail(&posts[1]).is_err());
    }

    #[test]
    fn small_images_are_kept_and_garbage_is_a_decode_error() {
        let png = encode_png(&RgbaImage::from_pixel(40, 30, Rgba([1, 2, 3, 255]))).unwrap();
        let kept = decode_thumbnail("https://i.test/small.png", &png, THUMBNAIL_MAX_SIDE).unwrap();
        assert_eq!(kept.dimensions(), (40, 30));

        let err = decode_thumbnail("https://i.test/bad.png", b"not an image", THUMBNAIL_MAX_SIDE)
            .expect_err("garbage must not decode");
        assert!(matches!(err, GalleryError::Decode { ref url, .. } if url.ends_with("bad.png")));
    }
}
