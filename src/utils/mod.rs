// src/utils/mod.rs

//! Utility functions and helpers.

pub mod http;
pub mod price;

use url::Url;

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Strip the query string and fragment from a URL, keeping the path.
///
/// Deals pages decorate product links with tracking parameters; the
/// canonical URL (and anything derived from it, like product ids) must not
/// change between runs because of them.
pub fn strip_query(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut u) => {
            u.set_query(None);
            u.set_fragment(None);
            u.to_string()
        }
        Err(_) => url.split(['?', '#']).next().unwrap_or(url).to_string(),
    }
}

/// Last non-empty path segment of a URL, if any.
pub fn last_path_segment(url: &str) -> Option<String> {
    let u = Url::parse(url).ok()?;
    u.path_segments()?
        .filter(|s| !s.is_empty())
        .next_back()
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_url() {
        let base = Url::parse("https://example.com/path/").unwrap();
        assert_eq!(
            resolve_url(&base, "page.html"),
            "https://example.com/path/page.html"
        );
        assert_eq!(
            resolve_url(&base, "/root.html"),
            "https://example.com/root.html"
        );
        assert_eq!(
            resolve_url(&base, "https://other.com/x"),
            "https://other.com/x"
        );
    }

    #[test]
    fn test_strip_query() {
        assert_eq!(
            strip_query("https://www.amazon.es/dp/B0ABCDEF12?tag=promo&ref=x"),
            "https://www.amazon.es/dp/B0ABCDEF12"
        );
        assert_eq!(
            strip_query("https://example.com/p#section"),
            "https://example.com/p"
        );
        assert_eq!(strip_query("relative/path?q=1"), "relative/path");
    }

    #[test]
    fn test_last_path_segment() {
        assert_eq!(
            last_path_segment("https://www.pccomponentes.com/ssd-kingston-nv3-1tb"),
            Some("ssd-kingston-nv3-1tb".to_string())
        );
        assert_eq!(
            last_path_segment("https://example.com/a/b/"),
            Some("b".to_string())
        );
        assert_eq!(last_path_segment("https://example.com/"), None);
    }
}
