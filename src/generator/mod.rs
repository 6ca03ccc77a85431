//! Generator module - writes the static site using the built-in templates

use anyhow::{Context as _, Result};
use std::fs;
use walkdir::WalkDir;

use crate::content::{count_tags, MarkdownRenderer, PostMeta, TagCount};
use crate::feed;
use crate::helpers::{page_path, resolve, TagPaths};
use crate::listing::ListingState;
use crate::templates::{LinkMode, ListingView, PostView, TemplateRenderer, SEARCH_INDEX_PATH};
use crate::Blog;

/// Static site generator
pub struct Generator {
    blog: Blog,
    renderer: TemplateRenderer,
    markdown: MarkdownRenderer,
}

impl Generator {
    /// Create a new generator
    pub fn new(blog: &Blog) -> Result<Self> {
        Ok(Self {
            blog: blog.clone(),
            renderer: TemplateRenderer::new()?,
            markdown: MarkdownRenderer::with_options(&blog.config.highlight),
        })
    }

    /// Generate the entire site from the current posts directory.
    ///
    /// Posts are loaded before anything is written, so a read failure
    /// leaves the public directory untouched.
    pub fn generate(&self) -> Result<()> {
        let repository = self.blog.repository();
        let posts = repository.list_all_posts()?;
        let slugs = repository.list_all_slugs()?;
        let tags = count_tags(&posts);
        let paths = TagPaths::from_counts(&tags);

        tracing::info!("Loaded {} posts and {} tags", posts.len(), tags.len());

        if self.blog.public_dir.exists() {
            fs::remove_dir_all(&self.blog.public_dir)?;
        }
        fs::create_dir_all(&self.blog.public_dir)?;

        self.copy_static_assets()?;

        self.generate_listing_pages(&posts, &tags, &paths, &ListingState::new())?;
        for tag in &tags {
            let mut state = ListingState::new();
            state.toggle_tag(&tag.tag);
            self.generate_listing_pages(&posts, &tags, &paths, &state)?;
        }

        self.generate_post_pages(&slugs, &posts, &paths)?;
        self.generate_about_page()?;
        self.generate_not_found_page()?;
        self.generate_feed(&posts)?;
        self.generate_search_index(&posts)?;

        Ok(())
    }

    /// Generate every page of one listing (the home page or a tag page)
    fn generate_listing_pages(
        &self,
        posts: &[PostMeta],
        tags: &[TagCount],
        paths: &TagPaths,
        state: &ListingState,
    ) -> Result<()> {
        let per_page = self.blog.config.per_page;
        let base = state
            .active_tag()
            .map(|tag| paths.path(tag))
            .unwrap_or_else(|| "/".to_string());

        let mut state = state.clone();
        loop {
            let listing = state.apply(posts, per_page);
            let view = ListingView::new(&state, &listing, tags, LinkMode::Paths, paths);
            let html = self.renderer.render_listing(&self.blog.config, &view)?;
            self.write_page(&page_path(&base, state.page()), &html)?;

            if !listing.has_next() {
                break;
            }
            state.next_page(listing.total_pages);
        }

        Ok(())
    }

    /// Generate individual post pages
    fn generate_post_pages(
        &self,
        slugs: &[String],
        posts: &[PostMeta],
        paths: &TagPaths,
    ) -> Result<()> {
        let repository = self.blog.repository();

        for slug in slugs {
            let Some(post) = repository.get_post_by_slug(slug)? else {
                tracing::warn!("Post {} disappeared during generation", slug);
                continue;
            };

            let content = self.markdown.render(&post.content);
            let view = PostView::new(&post, content, posts, paths);
            let html = self.renderer.render_post(&self.blog.config, &view)?;
            self.write_page(&post.path(), &html)?;
        }

        tracing::info!("Generated {} post pages", slugs.len());
        Ok(())
    }

    fn generate_about_page(&self) -> Result<()> {
        let html = self.renderer.render_about(&self.blog.config)?;
        self.write_page("/about/", &html)
    }

    fn generate_not_found_page(&self) -> Result<()> {
        let html = self.renderer.render_not_found(&self.blog.config)?;
        self.write_file("404.html", &html)
    }

    /// Generate the RSS feed
    fn generate_feed(&self, posts: &[PostMeta]) -> Result<()> {
        let xml = feed::build_rss(&self.blog.config, posts);
        self.write_file(&self.blog.config.feed_path, &xml)?;
        tracing::info!("Generated {}", self.blog.config.feed_path);
        Ok(())
    }

    /// Generate the search index read by the static search box
    fn generate_search_index(&self, posts: &[PostMeta]) -> Result<()> {
        let search_data: Vec<serde_json::Value> = posts
            .iter()
            .map(|p| {
                serde_json::json!({
                    "slug": p.slug,
                    "title": p.title,
                    "date": p.date,
                    "excerpt": p.excerpt,
                    "tags": p.tags,
                    "tag_styles": p
                        .tags
                        .iter()
                        .map(|t| resolve(t).css_vars())
                        .collect::<Vec<_>>(),
                    "url": p.path(),
                })
            })
            .collect();

        let json = serde_json::to_string_pretty(&search_data)?;
        self.write_file(SEARCH_INDEX_PATH, &json)?;
        tracing::info!("Generated {}", SEARCH_INDEX_PATH);
        Ok(())
    }

    /// Copy the static directory (images, css, ...) into the output
    fn copy_static_assets(&self) -> Result<()> {
        let static_dir = &self.blog.static_dir;
        if !static_dir.exists() {
            return Ok(());
        }

        for entry in WalkDir::new(static_dir).follow_links(true) {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(static_dir)?;
            let dest = self.blog.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)
                .with_context(|| format!("Failed to copy {:?} to {:?}", path, dest))?;
            tracing::debug!("Copied: {:?}", relative);
        }

        Ok(())
    }

    /// Write `html` as the index.html of a site path like `/posts/foo/`
    fn write_page(&self, site_path: &str, html: &str) -> Result<()> {
        let dir = site_path.trim_matches('/');
        let file = if dir.is_empty() {
            "index.html".to_string()
        } else {
            format!("{}/index.html", dir)
        };
        self.write_file(&file, html)
    }

    /// Write a file relative to the public directory
    fn write_file(&self, relative: &str, contents: &str) -> Result<()> {
        let output_path = self.blog.public_dir.join(relative.trim_start_matches('/'));
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create dir {:?}", parent))?;
        }
        fs::write(&output_path, contents)
            .with_context(|| format!("Failed to write {:?}", output_path))?;
        tracing::debug!("Generated: {:?}", output_path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use std::path::Path;

    fn write_post(dir: &Path, slug: &str, date: &str, tags: &str) {
        let content = format!(
            "---\ntitle: Title {slug}\ndate: {date}\nexcerpt: About {slug}\ntags: {tags}\n---\n# {slug}\n\n```rust\nfn main() {{}}\n```\n"
        );
        fs::write(dir.join(format!("{}.md", slug)), content).unwrap();
    }

    fn site() -> (tempfile::TempDir, Blog) {
        let dir = tempfile::tempdir().unwrap();
        let posts_dir = dir.path().join("posts");
        fs::create_dir(&posts_dir).unwrap();
        for i in 0..8 {
            let tags = if i % 2 == 0 { "[go, Data Analytics]" } else { "[rust]" };
            write_post(&posts_dir, &format!("post-{}", i), &format!("2024-01-{:02}", i + 1), tags);
        }
        fs::create_dir_all(dir.path().join("static/images")).unwrap();
        fs::write(dir.path().join("static/images/avatar.jpg"), b"jpg").unwrap();

        let config = SiteConfig {
            url: "https://example.com".to_string(),
            ..SiteConfig::default()
        };
        let blog = Blog::with_config(dir.path(), config);
        (dir, blog)
    }

    #[test]
    fn test_generate_site() {
        let (_dir, blog) = site();
        Generator::new(&blog).unwrap().generate().unwrap();
        let public = &blog.public_dir;

        assert!(public.join("index.html").exists());
        assert!(public.join("page/2/index.html").exists());
        assert!(!public.join("page/3/index.html").exists());
        assert!(public.join("tags/go/index.html").exists());
        assert!(public.join("tags/data-analytics/index.html").exists());
        assert!(!public.join("tags/go/page/2/index.html").exists());
        assert!(public.join("posts/post-3/index.html").exists());
        assert!(public.join("about/index.html").exists());
        assert!(public.join("404.html").exists());
        assert!(public.join("images/avatar.jpg").exists());

        let index = fs::read_to_string(public.join("index.html")).unwrap();
        // Newest first
        assert!(index.find("Title post-7").unwrap() < index.find("Title post-2").unwrap());
        assert!(!index.contains("Title post-1"));

        let post = fs::read_to_string(public.join("posts/post-3/index.html")).unwrap();
        assert!(post.contains("highlight rust"));

        let feed = fs::read_to_string(public.join("feed.xml")).unwrap();
        assert_eq!(feed.matches("<item>").count(), 8);

        let search: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(public.join("search.json")).unwrap())
                .unwrap();
        assert_eq!(search.as_array().unwrap().len(), 8);
        assert_eq!(search[0]["slug"], "post-7");
        assert_eq!(search[0]["tags"][0], "rust");
        assert_eq!(search[0]["tag_styles"][0], resolve("rust").css_vars());
        assert!(index.contains(r#"id="static-search" data-index="/search.json""#));

        let tag_page = fs::read_to_string(public.join("tags/go/index.html")).unwrap();
        assert!(tag_page.contains(r#"data-tag="go""#));
    }

    #[test]
    fn test_generate_removes_stale_output() {
        let (_dir, blog) = site();
        fs::create_dir_all(blog.public_dir.join("posts/deleted")).unwrap();
        fs::write(blog.public_dir.join("posts/deleted/index.html"), "old").unwrap();

        Generator::new(&blog).unwrap().generate().unwrap();
        assert!(!blog.public_dir.join("posts/deleted").exists());
        assert!(blog.public_dir.join("posts/post-0/index.html").exists());
    }

    #[test]
    fn test_tags_differing_in_case_get_separate_pages() {
        let dir = tempfile::tempdir().unwrap();
        let posts_dir = dir.path().join("posts");
        fs::create_dir(&posts_dir).unwrap();
        let posts = [("a", "Alpha", "rust"), ("b", "Beta", "rust"), ("c", "Gamma", "Rust")];
        for (slug, title, tag) in posts {
            fs::write(
                posts_dir.join(format!("{}.md", slug)),
                format!("---\ntitle: {title}\ndate: 2024-01-01\ntags: [{tag}]\n---\nBody\n"),
            )
            .unwrap();
        }
        let blog = Blog::with_config(dir.path(), SiteConfig::default());
        Generator::new(&blog).unwrap().generate().unwrap();

        let lower = fs::read_to_string(blog.public_dir.join("tags/rust/index.html")).unwrap();
        assert!(lower.contains("Alpha"));
        assert!(lower.contains("Beta"));
        assert!(!lower.contains("Gamma"));

        let upper = fs::read_to_string(blog.public_dir.join("tags/rust-2/index.html")).unwrap();
        assert!(upper.contains("Gamma"));
        assert!(!upper.contains("Alpha"));

        let post = fs::read_to_string(blog.public_dir.join("posts/c/index.html")).unwrap();
        assert!(post.contains("/tags/rust-2/"));
    }

    #[test]
    fn test_generate_fails_without_posts_dir() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::with_config(dir.path(), SiteConfig::default());
        assert!(Generator::new(&blog).unwrap().generate().is_err());
        assert!(!blog.public_dir.exists());
    }
}
