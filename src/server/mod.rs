//! Local server rendering pages on each request

use anyhow::Result;
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::content::{count_tags, MarkdownRenderer, PostMeta};
use crate::feed;
use crate::helpers::TagPaths;
use crate::listing::ListingState;
use crate::templates::{LinkMode, ListingView, PostView, TemplateRenderer};
use crate::Blog;

/// Server state
struct ServerState {
    blog: Blog,
    renderer: TemplateRenderer,
    markdown: MarkdownRenderer,
}

/// Listing query parameters: `/?q=go&tag=rust&page=2`
#[derive(Debug, Default, Deserialize)]
struct ListingQuery {
    q: Option<String>,
    tag: Option<String>,
    page: Option<String>,
}

impl ListingQuery {
    fn into_state(self) -> ListingState {
        // An unparsable page falls back to the first one
        let page = self.page.and_then(|p| p.trim().parse().ok());
        ListingState::from_parts(self.q.as_deref(), self.tag.as_deref(), page)
    }
}

/// Build the application router.
///
/// Pages are rendered from the posts directory on every request; anything
/// else is served from the static directory.
pub fn router(blog: &Blog) -> Result<Router> {
    let state = Arc::new(ServerState {
        blog: blog.clone(),
        renderer: TemplateRenderer::new()?,
        markdown: MarkdownRenderer::with_options(&blog.config.highlight),
    });

    let feed_route = format!("/{}", blog.config.feed_path.trim_start_matches('/'));

    Ok(Router::new()
        .route("/", get(index_handler))
        .route("/tags/:tag", get(tag_handler))
        .route("/tags/:tag/", get(tag_handler))
        .route("/posts/:slug", get(post_handler))
        .route("/posts/:slug/", get(post_handler))
        .route("/about", get(about_handler))
        .route("/about/", get(about_handler))
        .route(&feed_route, get(feed_handler))
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Start the server
pub async fn start(blog: &Blog, ip: &str, port: u16, open: bool) -> Result<()> {
    let app = router(blog)?;

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Error surfaced as a 500 page
struct ServerError(anyhow::Error);

impl<E: Into<anyhow::Error>> From<E> for ServerError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        tracing::error!("Request failed: {:#}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
    }
}

type HandlerResult = std::result::Result<Response, ServerError>;

async fn index_handler(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<ListingQuery>,
) -> HandlerResult {
    let posts = state.blog.repository().list_all_posts()?;
    render_listing(&state, &posts, query.into_state())
}

/// `/tags/<tag-slug>/`, the listing with that tag selected
async fn tag_handler(
    State(state): State<Arc<ServerState>>,
    Path(tag_slug): Path<String>,
    Query(query): Query<ListingQuery>,
) -> HandlerResult {
    let posts = state.blog.repository().list_all_posts()?;
    let paths = TagPaths::from_counts(&count_tags(&posts));
    let Some(tag) = paths.tag_for(&format!("/tags/{}/", tag_slug)) else {
        return Ok(not_found(&state));
    };

    let query = ListingQuery {
        tag: Some(tag.to_string()),
        ..query
    };
    render_listing(&state, &posts, query.into_state())
}

fn render_listing(
    state: &ServerState,
    posts: &[PostMeta],
    listing_state: ListingState,
) -> HandlerResult {
    let tags = count_tags(posts);
    let paths = TagPaths::from_counts(&tags);
    let listing = listing_state.apply(posts, state.blog.config.per_page);
    let view = ListingView::new(&listing_state, &listing, &tags, LinkMode::Query, &paths);
    let html = state.renderer.render_listing(&state.blog.config, &view)?;

    Ok(Html(html).into_response())
}

async fn post_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
) -> HandlerResult {
    let repository = state.blog.repository();
    let Some(post) = repository.get_post_by_slug(&slug)? else {
        return Ok(not_found(&state));
    };

    let posts = repository.list_all_posts()?;
    let paths = TagPaths::from_counts(&count_tags(&posts));
    let content = state.markdown.render(&post.content);
    let view = PostView::new(&post, content, &posts, &paths);
    let html = state.renderer.render_post(&state.blog.config, &view)?;

    Ok(Html(html).into_response())
}

async fn about_handler(State(state): State<Arc<ServerState>>) -> HandlerResult {
    let html = state.renderer.render_about(&state.blog.config)?;
    Ok(Html(html).into_response())
}

async fn feed_handler(State(state): State<Arc<ServerState>>) -> HandlerResult {
    let posts = state.blog.repository().list_all_posts()?;
    let xml = feed::build_rss(&state.blog.config, &posts);
    Ok(([(header::CONTENT_TYPE, feed::CONTENT_TYPE)], xml).into_response())
}

/// Serve static assets, or the not-found page
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> Response {
    let mut service = ServeDir::new(&state.blog.static_dir);
    match service.try_call(request).await {
        Ok(response) if response.status() != StatusCode::NOT_FOUND => response.into_response(),
        Ok(_) => not_found(&state),
        Err(e) => ServerError::from(e).into_response(),
    }
}

fn not_found(state: &ServerState) -> Response {
    match state.renderer.render_not_found(&state.blog.config) {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render not-found page: {:#}", e);
            (StatusCode::NOT_FOUND, "Not found").into_response()
        }
    }
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
