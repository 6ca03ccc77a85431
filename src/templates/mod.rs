//! Built-in site templates using the Tera template engine
//!
//! Templates are embedded in the binary. The view models below are what the
//! templates see; they are built from posts, tag counts and a listing state.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::{Post, PostMeta, TagCount};
use crate::helpers::{self, date_xml, page_path, query_string, TagPaths};
use crate::listing::{Listing, ListingState};

/// Site path of the JSON index the static search box reads
pub const SEARCH_INDEX_PATH: &str = "/search.json";

/// Template renderer with the embedded site templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("index.html", include_str!("site/index.html")),
            ("post.html", include_str!("site/post.html")),
            ("about.html", include_str!("site/about.html")),
            ("404.html", include_str!("site/404.html")),
            (
                "partials/post_card.html",
                include_str!("site/partials/post_card.html"),
            ),
            (
                "partials/tag_chip.html",
                include_str!("site/partials/tag_chip.html"),
            ),
        ])?;

        tera.register_filter("truncate_chars", truncate_chars_filter);
        tera.set_escape_fn(helpers::escape_html);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }

    /// Render a listing page
    pub fn render_listing(&self, config: &SiteConfig, view: &ListingView) -> Result<String> {
        let mut context = base_context(config);
        let page_title = match &view.active_tag {
            Some(tag) => format!("#{} | {}", tag, config.title),
            None => config.title.clone(),
        };
        context.insert("page_title", &page_title);
        context.insert("current_path", "/");
        context.insert("listing", view);
        self.render("index.html", &context)
    }

    /// Render a single post
    pub fn render_post(&self, config: &SiteConfig, view: &PostView) -> Result<String> {
        let mut context = base_context(config);
        context.insert("page_title", &format!("{} | {}", view.title, config.title));
        context.insert("page_description", &view.excerpt);
        context.insert("current_path", &view.path);
        context.insert("post", view);
        self.render("post.html", &context)
    }

    /// Render the about page
    pub fn render_about(&self, config: &SiteConfig) -> Result<String> {
        let mut context = base_context(config);
        context.insert("page_title", &format!("About | {}", config.title));
        context.insert("current_path", "/about/");
        self.render("about.html", &context)
    }

    /// Render the not-found page
    pub fn render_not_found(&self, config: &SiteConfig) -> Result<String> {
        let mut context = base_context(config);
        context.insert("page_title", &format!("Page not found | {}", config.title));
        context.insert("current_path", "");
        self.render("404.html", &context)
    }
}

fn base_context(config: &SiteConfig) -> Context {
    let mut context = Context::new();
    context.insert("site", config);
    context.insert("page_description", &config.description);
    context.insert("feed_href", &format!("/{}", config.feed_path.trim_start_matches('/')));
    context.insert("search_index_href", SEARCH_INDEX_PATH);
    context.insert("current_year", &chrono::Utc::now().format("%Y").to_string());
    context
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 160,
    };

    if s.chars().count() <= length {
        Ok(tera::Value::String(s))
    } else {
        let truncated: String = s.chars().take(length).collect();
        Ok(tera::Value::String(format!("{}…", truncated.trim_end())))
    }
}

/// How listing links are written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkMode {
    /// Pre-rendered pages: `/page/2/`, `/tags/rust/`
    Paths,
    /// Dynamic pages: `/?q=go&tag=rust&page=2`
    Query,
}

impl LinkMode {
    fn all_href(self, state: &ListingState) -> String {
        match self {
            LinkMode::Paths => "/".to_string(),
            LinkMode::Query => format!("/{}", query_string(&[("q", state.search())])),
        }
    }

    /// Link that toggles `tag`, keeping the search text
    fn tag_href(self, state: &ListingState, tag: &str, paths: &TagPaths) -> String {
        let mut next = state.clone();
        next.toggle_tag(tag);
        match (self, next.active_tag()) {
            (LinkMode::Paths, Some(tag)) => paths.path(tag),
            (LinkMode::Paths, None) => "/".to_string(),
            (LinkMode::Query, tag) => format!(
                "/{}",
                query_string(&[("q", next.search()), ("tag", tag.unwrap_or_default())])
            ),
        }
    }

    fn page_href(self, state: &ListingState, page: usize, paths: &TagPaths) -> String {
        match self {
            LinkMode::Paths => {
                let base = state
                    .active_tag()
                    .map(|tag| paths.path(tag))
                    .unwrap_or_else(|| "/".to_string());
                page_path(&base, page)
            }
            LinkMode::Query => {
                let page = if page > 1 { page.to_string() } else { String::new() };
                format!(
                    "/{}",
                    query_string(&[
                        ("q", state.search()),
                        ("tag", state.active_tag().unwrap_or_default()),
                        ("page", &page),
                    ])
                )
            }
        }
    }
}

/// A colored tag chip
#[derive(Debug, Clone, Serialize)]
pub struct TagChip {
    pub name: String,
    pub count: Option<usize>,
    pub style: String,
    pub href: String,
    pub active: bool,
}

impl TagChip {
    /// A plain chip, linking to the tag's listing
    pub fn new(name: &str, paths: &TagPaths) -> Self {
        Self {
            name: name.to_string(),
            count: None,
            style: helpers::resolve(name).css_vars(),
            href: paths.path(name),
            active: false,
        }
    }
}

/// A post in a listing
#[derive(Debug, Clone, Serialize)]
pub struct PostCard {
    pub title: String,
    pub date: String,
    pub excerpt: String,
    pub path: String,
    pub tags: Vec<TagChip>,
}

impl PostCard {
    pub fn new(post: &PostMeta, paths: &TagPaths) -> Self {
        Self {
            title: post.title.clone(),
            date: post.date.clone(),
            excerpt: post.excerpt.clone(),
            path: post.path(),
            tags: post.tags.iter().map(|t| TagChip::new(t, paths)).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PageLink {
    pub number: usize,
    pub href: String,
    pub current: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginationData {
    pub current: usize,
    pub total: usize,
    /// Empty on the first page
    pub prev_link: String,
    /// Empty on the last page
    pub next_link: String,
    pub pages: Vec<PageLink>,
}

/// Everything the listing template needs
#[derive(Debug, Clone, Serialize)]
pub struct ListingView {
    pub posts: Vec<PostCard>,
    pub tags: Vec<TagChip>,
    pub all_active: bool,
    pub all_href: String,
    pub search: String,
    pub search_enabled: bool,
    pub active_tag: Option<String>,
    pub empty_notice: Option<String>,
    pub pagination: Option<PaginationData>,
}

impl ListingView {
    /// Build the view of one listing page
    pub fn new(
        state: &ListingState,
        listing: &Listing<'_>,
        tags: &[TagCount],
        mode: LinkMode,
        paths: &TagPaths,
    ) -> Self {
        let tags = tags
            .iter()
            .map(|t| TagChip {
                count: Some(t.count),
                href: mode.tag_href(state, &t.tag, paths),
                active: state.active_tag() == Some(t.tag.as_str()),
                ..TagChip::new(&t.tag, paths)
            })
            .collect();

        let pagination = listing.show_pagination().then(|| PaginationData {
            current: listing.page,
            total: listing.total_pages,
            prev_link: if listing.has_previous() {
                mode.page_href(state, listing.page - 1, paths)
            } else {
                String::new()
            },
            next_link: if listing.has_next() {
                mode.page_href(state, listing.page + 1, paths)
            } else {
                String::new()
            },
            pages: listing
                .page_numbers()
                .into_iter()
                .map(|number| PageLink {
                    number,
                    href: mode.page_href(state, number, paths),
                    current: number == listing.page,
                })
                .collect(),
        });

        Self {
            posts: listing.posts.iter().map(|p| PostCard::new(p, paths)).collect(),
            tags,
            all_active: state.active_tag().is_none(),
            all_href: mode.all_href(state),
            search: state.search().to_string(),
            search_enabled: mode == LinkMode::Query,
            active_tag: state.active_tag().map(str::to_string),
            empty_notice: listing.is_empty().then(|| state.empty_notice()),
            pagination,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NavPost {
    pub title: String,
    pub path: String,
}

impl From<&PostMeta> for NavPost {
    fn from(post: &PostMeta) -> Self {
        Self {
            title: post.title.clone(),
            path: post.path(),
        }
    }
}

/// Everything the post template needs
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub title: String,
    pub date: String,
    /// RFC 3339 form of `date`, when it parses
    pub date_xml: Option<String>,
    pub excerpt: String,
    pub path: String,
    pub tags: Vec<TagChip>,
    pub content: String,
    pub older: Option<NavPost>,
    pub newer: Option<NavPost>,
}

impl PostView {
    /// `content` is the rendered HTML body; `all_posts` is the date-sorted
    /// listing used for older/newer links.
    pub fn new(post: &Post, content: String, all_posts: &[PostMeta], paths: &TagPaths) -> Self {
        Self {
            title: post.title.clone(),
            date: post.date.clone(),
            date_xml: date_xml(&post.date),
            excerpt: post.excerpt.clone(),
            path: post.path(),
            tags: post.tags.iter().map(|t| TagChip::new(t, paths)).collect(),
            content,
            older: post.older(all_posts).map(NavPost::from),
            newer: post.newer(all_posts).map(NavPost::from),
        }
    }
}
