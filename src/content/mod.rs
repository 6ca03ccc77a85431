//! Content module - post model, front-matter parsing, the post repository
//! and markdown rendering

mod frontmatter;
mod markdown;
mod post;
mod repository;

use std::path::PathBuf;
use thiserror::Error;

pub use frontmatter::FrontMatter;
pub use markdown::MarkdownRenderer;
pub use post::{count_tags, Post, PostMeta, TagCount};
pub use repository::PostRepository;

/// Errors raised while reading posts from disk
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Posts directory not found: {0:?}")]
    MissingDirectory(PathBuf),

    #[error("Failed to read posts directory {path:?}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to read {path:?}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
