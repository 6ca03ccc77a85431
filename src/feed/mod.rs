//! RSS 2.0 feed

use crate::config::SiteConfig;
use crate::content::PostMeta;
use crate::helpers::{cdata, escape_xml, full_url_for, parse_date_string, rfc1123};

/// Content type the feed is served with
pub const CONTENT_TYPE: &str = "application/xml";

/// Build the RSS document for `posts`, one `<item>` per post in the given
/// order.
///
/// A post whose date cannot be parsed gets no `<pubDate>`.
pub fn build_rss(config: &SiteConfig, posts: &[PostMeta]) -> String {
    let site_url = config.url.trim_end_matches('/');
    let mut feed = String::new();

    feed.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    feed.push('\n');
    feed.push_str(r#"<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom">"#);
    feed.push('\n');
    feed.push_str("  <channel>\n");
    feed.push_str(&format!(
        "    <title>{}</title>\n",
        escape_xml(&channel_title(config))
    ));
    feed.push_str(&format!("    <link>{}</link>\n", escape_xml(site_url)));
    feed.push_str(&format!(
        "    <description>{}</description>\n",
        escape_xml(&config.description)
    ));
    feed.push_str(&format!(
        "    <language>{}</language>\n",
        escape_xml(&config.language)
    ));
    feed.push_str(&format!(
        "    <atom:link href=\"{}\" rel=\"self\" type=\"application/rss+xml\"/>\n",
        escape_xml(&config.feed_url())
    ));

    for post in posts {
        let link = escape_xml(&full_url_for(config, &post.path()));
        feed.push_str("    <item>\n");
        feed.push_str(&format!("      <title>{}</title>\n", cdata(&post.title)));
        feed.push_str(&format!("      <link>{}</link>\n", link));
        feed.push_str(&format!("      <guid>{}</guid>\n", link));
        match parse_date_string(&post.date) {
            Some(date) => {
                feed.push_str(&format!("      <pubDate>{}</pubDate>\n", rfc1123(&date)))
            }
            None => tracing::debug!("No pubDate for {}: date {:?}", post.slug, post.date),
        }
        feed.push_str(&format!(
            "      <description>{}</description>\n",
            cdata(&post.excerpt)
        ));
        feed.push_str("    </item>\n");
    }

    feed.push_str("  </channel>\n");
    feed.push_str("</rss>\n");
    feed
}

/// Author and site title, or just the title when no author is set
fn channel_title(config: &SiteConfig) -> String {
    if config.author.is_empty() || config.author == config.title {
        config.title.clone()
    } else {
        format!("{} — {}", config.author, config.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SiteConfig {
        SiteConfig {
            title: "Blog".to_string(),
            author: "Mavis Liu".to_string(),
            description: "Notes & thoughts".to_string(),
            url: "https://example.com/blog/".to_string(),
            ..SiteConfig::default()
        }
    }

    fn post(slug: &str, date: &str) -> PostMeta {
        PostMeta {
            slug: slug.to_string(),
            title: format!("About {}", slug),
            date: date.to_string(),
            excerpt: "An <em>excerpt</em>".to_string(),
            tags: vec![],
        }
    }

    #[test]
    fn test_channel() {
        let xml = build_rss(&config(), &[]);
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains("<title>Mavis Liu — Blog</title>"));
        assert!(xml.contains("<link>https://example.com/blog</link>"));
        assert!(xml.contains("<description>Notes &amp; thoughts</description>"));
        assert!(xml.contains(
            r#"<atom:link href="https://example.com/blog/feed.xml" rel="self" type="application/rss+xml"/>"#
        ));
        assert!(!xml.contains("<item>"));
    }

    #[test]
    fn test_items() {
        let posts = vec![post("newer", "2024-02-01"), post("older", "2024-01-15")];
        let xml = build_rss(&config(), &posts);

        assert_eq!(xml.matches("<item>").count(), 2);
        assert!(xml.contains("<title><![CDATA[About newer]]></title>"));
        assert!(xml.contains("<link>https://example.com/blog/posts/older/</link>"));
        assert!(xml.contains("<guid>https://example.com/blog/posts/older/</guid>"));
        assert!(xml.contains("<pubDate>Mon, 15 Jan 2024 00:00:00 GMT</pubDate>"));
        assert!(xml.contains("<description><![CDATA[An <em>excerpt</em>]]></description>"));
        assert!(xml.find("newer").unwrap() < xml.find("older").unwrap());
    }

    #[test]
    fn test_item_without_date() {
        let xml = build_rss(&config(), &[post("undated", "")]);
        assert!(xml.contains("<item>"));
        assert!(!xml.contains("<pubDate>"));
    }
}
