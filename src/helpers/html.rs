//! HTML helper functions

/// Escape text for HTML content and quoted attributes.
///
/// `/` is left alone so site paths stay readable in `href`s.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
