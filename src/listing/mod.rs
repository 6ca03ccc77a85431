//! Listing view - search, tag filter and pagination over post metadata
//!
//! [`ListingState`] holds what the reader picked; [`ListingState::apply`]
//! derives the visible page from the full post list. Nothing here touches
//! the file system.

use serde::Serialize;

use crate::content::PostMeta;

/// Default number of posts per listing page
pub const POSTS_PER_PAGE: usize = 6;

/// Search text, selected tag and page number of a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingState {
    search: String,
    active_tag: Option<String>,
    page: usize,
}

impl Default for ListingState {
    fn default() -> Self {
        Self {
            search: String::new(),
            active_tag: None,
            page: 1,
        }
    }
}

impl ListingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a state from request parameters, e.g. `?q=..&tag=..&page=..`.
    ///
    /// An empty tag means "All"; a missing or zero page means page 1.
    pub fn from_parts(search: Option<&str>, tag: Option<&str>, page: Option<usize>) -> Self {
        Self {
            search: search.unwrap_or_default().to_string(),
            active_tag: tag.filter(|t| !t.is_empty()).map(str::to_string),
            page: page.unwrap_or(1).max(1),
        }
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn active_tag(&self) -> Option<&str> {
        self.active_tag.as_deref()
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// Replace the search text and go back to the first page
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page = 1;
    }

    /// Select a tag, or clear it if it is already the active one
    pub fn toggle_tag(&mut self, tag: &str) {
        if self.active_tag.as_deref() == Some(tag) {
            self.active_tag = None;
        } else {
            self.active_tag = Some(tag.to_string());
        }
        self.page = 1;
    }

    /// The "All" chip: drop the tag filter
    pub fn clear_tag(&mut self) {
        self.active_tag = None;
        self.page = 1;
    }

    /// Jump to a page. Pages start at 1; there is no upper bound here.
    pub fn go_to_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    pub fn previous_page(&mut self) {
        self.page = self.page.saturating_sub(1).max(1);
    }

    /// Advance one page, stopping at `total_pages`
    pub fn next_page(&mut self, total_pages: usize) {
        if self.page < total_pages {
            self.page += 1;
        }
    }

    /// Whether a post passes the search text and the tag filter.
    ///
    /// Search is a case-insensitive substring match on the title, the
    /// excerpt or any tag. The tag filter is an exact match.
    pub fn matches(&self, post: &PostMeta) -> bool {
        self.passes(post, &self.search.to_lowercase())
    }

    fn passes(&self, post: &PostMeta, needle: &str) -> bool {
        let matches_tag = match &self.active_tag {
            Some(tag) => post.has_tag(tag),
            None => true,
        };
        matches_tag && matches_search(post, needle)
    }

    /// Filter and paginate `posts`, keeping their order
    pub fn apply<'a>(&self, posts: &'a [PostMeta], per_page: usize) -> Listing<'a> {
        let per_page = per_page.max(1);
        let needle = self.search.to_lowercase();

        let filtered: Vec<&PostMeta> = posts
            .iter()
            .filter(|post| self.passes(post, &needle))
            .collect();

        let total_matches = filtered.len();
        let total_pages = total_matches.div_ceil(per_page);
        let posts = filtered
            .into_iter()
            .skip(self.page.saturating_sub(1).saturating_mul(per_page))
            .take(per_page)
            .collect();

        Listing {
            posts,
            page: self.page,
            per_page,
            total_matches,
            total_pages,
        }
    }

    /// Message shown when nothing matches
    pub fn empty_notice(&self) -> String {
        let mut notice = String::from("No posts found");
        if !self.search.is_empty() {
            notice.push_str(&format!(" for \"{}\"", self.search));
        }
        if let Some(tag) = &self.active_tag {
            notice.push_str(&format!(" with tag \"{}\"", tag));
        }
        notice
    }
}

fn matches_search(post: &PostMeta, needle: &str) -> bool {
    needle.is_empty()
        || post.title.to_lowercase().contains(needle)
        || post.excerpt.to_lowercase().contains(needle)
        || post.tags.iter().any(|t| t.to_lowercase().contains(needle))
}

/// One derived page of a listing
#[derive(Debug, Clone, Serialize)]
pub struct Listing<'a> {
    /// Posts on the current page
    pub posts: Vec<&'a PostMeta>,
    pub page: usize,
    pub per_page: usize,
    /// Number of posts passing the filter, across all pages
    pub total_matches: usize,
    pub total_pages: usize,
}

impl Listing<'_> {
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Page controls are only shown when there is more than one page
    pub fn show_pagination(&self) -> bool {
        self.total_pages > 1
    }

    /// Page numbers for the pager, `1..=total_pages`
    pub fn page_numbers(&self) -> Vec<usize> {
        (1..=self.total_pages).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(title: &str, excerpt: &str, tags: &[&str]) -> PostMeta {
        PostMeta {
            slug: title.to_lowercase().replace(' ', "-"),
            title: title.to_string(),
            date: String::new(),
            excerpt: excerpt.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn two_posts() -> Vec<PostMeta> {
        vec![
            post("Go basics", "", &["go"]),
            post("Rust intro", "", &["rust"]),
        ]
    }

    fn many_posts(n: usize) -> Vec<PostMeta> {
        (0..n)
            .map(|i| post(&format!("Post {}", i), "", &[]))
            .collect()
    }

    fn titles<'a>(listing: &Listing<'a>) -> Vec<&'a str> {
        listing.posts.iter().map(|p| p.title.as_str()).collect()
    }

    #[test]
    fn test_search_filters_by_title() {
        let posts = two_posts();
        let mut state = ListingState::new();
        state.set_search("go");
        assert_eq!(titles(&state.apply(&posts, 6)), vec!["Go basics"]);
    }

    #[test]
    fn test_search_is_case_insensitive_on_excerpt_and_tags() {
        let posts = vec![
            post("One", "All about WebAssembly", &[]),
            post("Two", "", &["Kubernetes"]),
            post("Three", "", &[]),
        ];
        let mut state = ListingState::new();
        state.set_search("webassembly");
        assert_eq!(titles(&state.apply(&posts, 6)), vec!["One"]);
        state.set_search("KUBER");
        assert_eq!(titles(&state.apply(&posts, 6)), vec!["Two"]);
    }

    #[test]
    fn test_tag_filter_is_exact() {
        let posts = vec![
            post("Go basics", "", &["go"]),
            post("Rust intro", "", &["rust"]),
            post("Rusty", "", &["rusty"]),
        ];
        let mut state = ListingState::new();
        state.toggle_tag("rust");
        assert_eq!(titles(&state.apply(&posts, 6)), vec!["Rust intro"]);
    }

    #[test]
    fn test_search_and_tag_combine() {
        let posts = vec![
            post("Go basics", "", &["go", "intro"]),
            post("Go advanced", "", &["go"]),
            post("Rust intro", "", &["rust", "intro"]),
        ];
        let mut state = ListingState::new();
        state.toggle_tag("intro");
        state.set_search("go");
        assert_eq!(titles(&state.apply(&posts, 6)), vec!["Go basics"]);
    }

    #[test]
    fn test_no_match_shows_notice() {
        let posts = two_posts();
        let mut state = ListingState::new();
        state.set_search("x");
        let listing = state.apply(&posts, 6);
        assert!(listing.is_empty());
        assert_eq!(listing.total_pages, 0);
        assert!(!listing.show_pagination());
        assert_eq!(state.empty_notice(), "No posts found for \"x\"");

        state.toggle_tag("go");
        assert_eq!(
            state.empty_notice(),
            "No posts found for \"x\" with tag \"go\""
        );
    }

    #[test]
    fn test_matches_agrees_with_apply() {
        let posts = two_posts();
        let mut state = ListingState::new();
        state.toggle_tag("rust");
        assert!(!state.matches(&posts[0]));
        assert!(state.matches(&posts[1]));
    }

    #[test]
    fn test_pagination() {
        let posts = many_posts(13);
        let mut state = ListingState::new();

        let listing = state.apply(&posts, POSTS_PER_PAGE);
        assert_eq!(listing.total_pages, 3);
        assert_eq!(listing.posts.len(), 6);
        assert_eq!(listing.page_numbers(), vec![1, 2, 3]);
        assert!(listing.has_next());
        assert!(!listing.has_previous());

        state.go_to_page(3);
        let listing = state.apply(&posts, POSTS_PER_PAGE);
        assert_eq!(titles(&listing), vec!["Post 12"]);
        assert!(!listing.has_next());

        state.go_to_page(4);
        let listing = state.apply(&posts, POSTS_PER_PAGE);
        assert!(listing.is_empty());
        assert_eq!(listing.total_matches, 13);
    }

    #[test]
    fn test_filter_change_resets_page() {
        let posts = many_posts(13);
        let mut state = ListingState::new();
        state.go_to_page(3);
        state.set_search("post");
        assert_eq!(state.page(), 1);

        state.go_to_page(3);
        state.toggle_tag("go");
        assert_eq!(state.page(), 1);

        state.go_to_page(2);
        state.clear_tag();
        assert_eq!(state.page(), 1);
        assert_eq!(state.apply(&posts, 6).posts.len(), 6);
    }

    #[test]
    fn test_toggle_tag_twice_deselects() {
        let mut state = ListingState::new();
        state.toggle_tag("rust");
        assert_eq!(state.active_tag(), Some("rust"));
        state.toggle_tag("go");
        assert_eq!(state.active_tag(), Some("go"));
        state.toggle_tag("go");
        assert_eq!(state.active_tag(), None);
    }

    #[test]
    fn test_previous_and_next_clamp() {
        let mut state = ListingState::new();
        state.previous_page();
        assert_eq!(state.page(), 1);
        state.next_page(2);
        state.next_page(2);
        assert_eq!(state.page(), 2);
        state.previous_page();
        assert_eq!(state.page(), 1);
        state.go_to_page(0);
        assert_eq!(state.page(), 1);
    }

    #[test]
    fn test_page_zero_is_first_page() {
        let posts = many_posts(8);
        let state = ListingState {
            page: 0,
            ..ListingState::default()
        };
        let listing = state.apply(&posts, 6);
        assert_eq!(titles(&listing)[0], "Post 0");
        assert_eq!(listing.posts.len(), 6);
    }

    #[test]
    fn test_from_parts() {
        let state = ListingState::from_parts(Some("Go"), Some(""), Some(0));
        assert_eq!(state.search(), "Go");
        assert_eq!(state.active_tag(), None);
        assert_eq!(state.page(), 1);

        let state = ListingState::from_parts(None, Some("rust"), Some(2));
        assert_eq!(state.active_tag(), Some("rust"));
        assert_eq!(state.page(), 2);
    }
}
