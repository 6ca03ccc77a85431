//! Post repository - reads posts from the posts directory
//!
//! Every call goes back to the file system; nothing is cached between calls.

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{count_tags, ContentError, FrontMatter, Post, PostMeta, TagCount};

type Result<T> = std::result::Result<T, ContentError>;

/// Read-only access to a directory of `<slug>.md` files
#[derive(Debug, Clone)]
pub struct PostRepository {
    posts_dir: PathBuf,
}

impl PostRepository {
    /// Create a repository over a posts directory
    pub fn new<P: Into<PathBuf>>(posts_dir: P) -> Self {
        Self {
            posts_dir: posts_dir.into(),
        }
    }

    /// The directory posts are read from
    pub fn posts_dir(&self) -> &Path {
        &self.posts_dir
    }

    /// Load metadata for every post, newest first.
    ///
    /// Dates are compared as strings. Posts sharing a date come out in
    /// reverse file-name order.
    pub fn list_all_posts(&self) -> Result<Vec<PostMeta>> {
        let mut posts = Vec::new();

        for (slug, path) in self.markdown_files()? {
            let content = read_source(&path)?;
            let (fm, _) = FrontMatter::parse(&content);
            posts.push(PostMeta::from_front_matter(&slug, fm));
        }

        posts.reverse();
        posts.sort_by(|a, b| b.date.cmp(&a.date));

        tracing::debug!("Loaded {} posts from {:?}", posts.len(), self.posts_dir);
        Ok(posts)
    }

    /// Load a single post with its markdown body.
    ///
    /// Returns `Ok(None)` when no `<slug>.md` exists, including for slugs
    /// that are not a plain file name.
    pub fn get_post_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        if !is_valid_slug(slug) {
            tracing::debug!("Rejected slug {:?}", slug);
            return Ok(None);
        }

        let path = self.posts_dir.join(format!("{}.md", slug));
        if !path.is_file() {
            return Ok(None);
        }

        let source = read_source(&path)?;
        let (fm, body) = FrontMatter::parse(&source);
        Ok(Some(Post {
            meta: PostMeta::from_front_matter(slug, fm),
            content: body.to_string(),
        }))
    }

    /// Every slug, in file-name order
    pub fn list_all_slugs(&self) -> Result<Vec<String>> {
        Ok(self
            .markdown_files()?
            .into_iter()
            .map(|(slug, _)| slug)
            .collect())
    }

    /// Tag usage across all posts, most used first
    pub fn aggregate_tags(&self) -> Result<Vec<TagCount>> {
        Ok(count_tags(&self.list_all_posts()?))
    }

    /// Markdown files directly inside the posts directory, sorted by name
    fn markdown_files(&self) -> Result<Vec<(String, PathBuf)>> {
        if !self.posts_dir.is_dir() {
            return Err(ContentError::MissingDirectory(self.posts_dir.clone()));
        }

        let mut files = Vec::new();

        for entry in WalkDir::new(&self.posts_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|source| ContentError::ReadDir {
                path: self.posts_dir.clone(),
                source,
            })?;
            let path = entry.path();
            if !path.is_file() || !is_markdown_file(path) {
                continue;
            }

            match path.file_stem().and_then(|s| s.to_str()) {
                Some(slug) => files.push((slug.to_string(), path.to_path_buf())),
                None => tracing::warn!("Skipping post with non UTF-8 name: {:?}", path),
            }
        }

        Ok(files)
    }
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| ContentError::ReadFile {
        path: path.to_path_buf(),
        source,
    })
}

/// Check if a file is a markdown post
fn is_markdown_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("md")
}

/// A slug must name a file inside the posts directory
fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug != "."
        && slug != ".."
        && !slug.contains(['/', '\\', '\0'])
}
