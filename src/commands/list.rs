//! List site content

use anyhow::Result;
use std::io::Write;

use crate::Blog;

/// List site content by type
pub fn run(blog: &Blog, content_type: &str) -> Result<()> {
    let stdout = std::io::stdout();
    write_list(blog, content_type, &mut stdout.lock())
}

fn write_list<W: Write>(blog: &Blog, content_type: &str, out: &mut W) -> Result<()> {
    let repository = blog.repository();

    match content_type {
        "post" | "posts" => {
            let posts = repository.list_all_posts()?;
            writeln!(out, "Posts ({}):", posts.len())?;
            for post in posts {
                writeln!(out, "  {} - {} [{}]", post.date, post.title, post.slug)?;
            }
        }
        "tag" | "tags" => {
            let tags = repository.aggregate_tags()?;
            writeln!(out, "Tags ({}):", tags.len())?;
            for tag in tags {
                writeln!(out, "  {} ({})", tag.tag, tag.count)?;
            }
        }
        "slug" | "slugs" => {
            let slugs = repository.list_all_slugs()?;
            writeln!(out, "Slugs ({}):", slugs.len())?;
            for slug in slugs {
                writeln!(out, "  {}", slug)?;
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, tag, slug",
                content_type
            );
        }
    }

    Ok(())
}
