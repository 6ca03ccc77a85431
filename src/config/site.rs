//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,

    // URL
    /// Absolute base URL, used for feed links
    pub url: String,
    /// Path of the RSS feed relative to the site root
    pub feed_path: String,

    // Directory
    pub posts_dir: String,
    pub public_dir: String,
    /// Copied verbatim into the public directory
    pub static_dir: String,

    // Listing
    pub per_page: usize,

    #[serde(default)]
    pub highlight: HighlightConfig,

    #[serde(default)]
    pub about: AboutConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Blog".to_string(),
            description: "Thoughts on technology, design, and life.".to_string(),
            author: "John Doe".to_string(),
            language: "en".to_string(),

            url: "http://example.com".to_string(),
            feed_path: "feed.xml".to_string(),

            posts_dir: "posts".to_string(),
            public_dir: "public".to_string(),
            static_dir: "static".to_string(),

            per_page: crate::listing::POSTS_PER_PAGE,

            highlight: HighlightConfig::default(),
            about: AboutConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let mut config: SiteConfig = serde_yaml::from_str(&content)?;
        if config.per_page == 0 {
            tracing::warn!(
                "per_page must be at least 1, falling back to {}",
                crate::listing::POSTS_PER_PAGE
            );
            config.per_page = crate::listing::POSTS_PER_PAGE;
        }
        Ok(config)
    }

    /// Absolute URL of the feed
    pub fn feed_url(&self) -> String {
        format!(
            "{}/{}",
            self.url.trim_end_matches('/'),
            self.feed_path.trim_start_matches('/')
        )
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Name of a syntect default theme
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
            line_number: false,
        }
    }
}

/// Content of the about page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AboutConfig {
    pub name: String,
    pub avatar: Option<String>,
    pub email: Option<String>,
    /// One paragraph per entry
    pub bio: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.posts_dir, "posts");
        assert_eq!(config.public_dir, "public");
        assert_eq!(config.per_page, 6);
        assert_eq!(config.feed_path, "feed.xml");
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: Mavis Liu
url: https://mavisliu689.github.io/mavis_blog/
per_page: 10
about:
  name: Mavis Liu
  bio:
    - First paragraph.
    - Second paragraph.
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "Mavis Liu");
        assert_eq!(config.per_page, 10);
        assert_eq!(config.posts_dir, "posts");
        assert_eq!(config.about.bio.len(), 2);
        assert_eq!(
            config.feed_url(),
            "https://mavisliu689.github.io/mavis_blog/feed.xml"
        );
    }

    #[test]
    fn test_load_rejects_zero_per_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_config.yml");
        fs::write(&path, "per_page: 0\n").unwrap();
        let config = SiteConfig::load(&path).unwrap();
        assert_eq!(config.per_page, 6);
    }
}
