//! Post models

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::FrontMatter;
use crate::helpers;

/// Listing metadata of a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostMeta {
    /// File name without the `.md` extension
    pub slug: String,

    /// Post title (falls back to the slug)
    pub title: String,

    /// Raw front-matter date, compared as a string
    pub date: String,

    /// Short summary shown in listings and feeds
    pub excerpt: String,

    /// Post tags, in front-matter order. Duplicates are kept.
    pub tags: Vec<String>,
}

impl PostMeta {
    /// Build metadata from parsed front-matter, applying defaults
    pub fn from_front_matter(slug: &str, fm: FrontMatter) -> Self {
        Self {
            slug: slug.to_string(),
            title: fm
                .title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| slug.to_string()),
            date: fm.date.unwrap_or_default(),
            excerpt: fm.excerpt.unwrap_or_default(),
            tags: fm.tags,
        }
    }

    /// Site-relative URL path
    pub fn path(&self) -> String {
        helpers::post_path(&self.slug)
    }

    /// Exact tag membership
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// The next older post in a date-sorted list
    pub fn older<'a>(&self, posts: &'a [PostMeta]) -> Option<&'a PostMeta> {
        let pos = posts.iter().position(|p| p.slug == self.slug)?;
        posts.get(pos + 1)
    }

    /// The next newer post in a date-sorted list
    pub fn newer<'a>(&self, posts: &'a [PostMeta]) -> Option<&'a PostMeta> {
        let pos = posts.iter().position(|p| p.slug == self.slug)?;
        if pos > 0 {
            posts.get(pos - 1)
        } else {
            None
        }
    }
}

/// A full post: metadata plus the raw markdown body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    #[serde(flatten)]
    pub meta: PostMeta,

    /// Markdown body with the front-matter stripped
    pub content: String,
}

impl std::ops::Deref for Post {
    type Target = PostMeta;

    fn deref(&self) -> &PostMeta {
        &self.meta
    }
}

/// Number of posts carrying a tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// Count tag occurrences across posts.
///
/// Sorted by count descending; equal counts keep first-seen order. A tag
/// listed twice on one post counts twice.
pub fn count_tags(posts: &[PostMeta]) -> Vec<TagCount> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for tag in posts.iter().flat_map(|p| p.tags.iter()) {
        *counts.entry(tag.as_str()).or_insert(0) += 1;
    }

    let mut tags: Vec<TagCount> = counts
        .into_iter()
        .map(|(tag, count)| TagCount {
            tag: tag.to_string(),
            count,
        })
        .collect();
    tags.sort_by(|a, b| b.count.cmp(&a.count));
    tags
}
