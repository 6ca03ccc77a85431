//! URL helper functions

use indexmap::IndexMap;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::collections::HashSet;

use crate::config::SiteConfig;
use crate::content::TagCount;

/// Characters left alone in query values besides alphanumerics
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

/// Site-relative path of a post
pub fn post_path(slug: &str) -> String {
    format!("/posts/{}/", slug)
}

/// Site-relative path of a tag listing page, from the tag's slug alone.
///
/// Tags that slugify alike share this path; [`TagPaths`] tells them apart.
pub fn tag_path(tag: &str) -> String {
    format!("/tags/{}/", tag_slug(tag))
}

fn tag_slug(tag: &str) -> String {
    let slug = slug::slugify(tag);
    if slug.is_empty() {
        "tag".to_string()
    } else {
        slug
    }
}

/// Listing path of every known tag, unique per distinct tag.
///
/// Tags are assigned in the order given. When a slug is already taken
/// (`rust` and `Rust`, `C` and `C++`) the later tag gets `-2`, `-3`, ...
#[derive(Debug, Clone, Default)]
pub struct TagPaths {
    by_tag: IndexMap<String, String>,
}

impl TagPaths {
    pub fn new<'a, I: IntoIterator<Item = &'a str>>(tags: I) -> Self {
        let mut by_tag = IndexMap::new();
        let mut taken = HashSet::new();

        for tag in tags {
            if by_tag.contains_key(tag) {
                continue;
            }
            let base = tag_slug(tag);
            let mut slug = base.clone();
            let mut n = 2;
            while !taken.insert(slug.clone()) {
                slug = format!("{}-{}", base, n);
                n += 1;
            }
            by_tag.insert(tag.to_string(), format!("/tags/{}/", slug));
        }

        Self { by_tag }
    }

    /// Paths for aggregated tags; the most used tag keeps the plain slug
    pub fn from_counts(tags: &[TagCount]) -> Self {
        Self::new(tags.iter().map(|t| t.tag.as_str()))
    }

    /// Path of `tag`, falling back to [`tag_path`] for unknown tags
    pub fn path(&self, tag: &str) -> String {
        self.by_tag
            .get(tag)
            .cloned()
            .unwrap_or_else(|| tag_path(tag))
    }

    /// The tag listed at `path`, e.g. `/tags/rust-2/`
    pub fn tag_for(&self, path: &str) -> Option<&str> {
        self.by_tag
            .iter()
            .find(|(_, p)| p.as_str() == path)
            .map(|(tag, _)| tag.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.by_tag.iter().map(|(t, p)| (t.as_str(), p.as_str()))
    }
}

/// Site-relative path of a numbered listing page under `base`
///
/// # Examples
/// ```ignore
/// page_path("/", 1) // -> "/"
/// page_path("/tags/rust/", 3) // -> "/tags/rust/page/3/"
/// ```
pub fn page_path(base: &str, page: usize) -> String {
    if page <= 1 {
        base.to_string()
    } else {
        format!("{}page/{}/", base, page)
    }
}

/// Generate a full URL including the domain
///
/// # Examples
/// ```ignore
/// full_url_for(&config, "/posts/hello/") // -> "https://example.com/posts/hello/"
/// ```
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    format!(
        "{}/{}",
        config.url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Build a `?key=value&...` query string, skipping empty values
pub fn query_string(pairs: &[(&str, &str)]) -> String {
    let encoded: Vec<String> = pairs
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| format!("{}={}", key, encode_query_value(value)))
        .collect();

    if encoded.is_empty() {
        String::new()
    } else {
        format!("?{}", encoded.join("&"))
    }
}

/// Encode a single query value
pub fn encode_query_value(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE).to_string()
}
