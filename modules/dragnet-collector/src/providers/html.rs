// Title and link scraping for the link crawler.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href\s*=\s*["']([^"']+)["']"#).expect("valid regex"));

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("valid regex"));

/// Contents of `<title>`, whitespace collapsed. Empty when absent.
pub fn page_title(html: &str) -> String {
    TITLE_RE
        .captures(html)
        .map(|c| c[1].split_whitespace().collect::<Vec<_>>().join(" "))
        .unwrap_or_default()
}

/// Absolute http(s) links from `href` attributes on the same host as
/// `base_url`, fragments stripped, first occurrence order.
pub fn same_host_links(html: &str, base_url: &str) -> Vec<String> {
    let Ok(base) = url::Url::parse(base_url) else {
        return Vec::new();
    };
    let mut seen = HashSet::new();

    HREF_RE
        .captures_iter(html)
        .filter_map(|cap| base.join(&cap[1]).ok())
        .filter(|u| matches!(u.scheme(), "http" | "https") && u.host_str() == base.host_str())
        .filter_map(|mut u| {
            u.set_fragment(None);
            let s = u.to_string();
            seen.insert(s.clone()).then_some(s)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_trimmed_and_collapsed() {
        let html = "<html><head><TITLE>\n  Market   Report 2024 \n</TITLE></head></html>";
        assert_eq!(page_title(html), "Market Report 2024");
        assert_eq!(page_title("<p>none</p>"), "");
    }

    #[test]
    fn only_same_host_links_are_followed() {
        let html = r#"
            <a href="/pricing">Pricing</a>
            <a href="https://example.com/blog#top">Blog</a>
            <a href="https://other.org/page">Elsewhere</a>
            <a href="mailto:team@example.com">Mail</a>
        "#;
        let links = same_host_links(html, "https://example.com/");
        assert_eq!(
            links,
            vec!["https://example.com/pricing", "https://example.com/blog"]
        );
    }

    #[test]
    fn repeated_links_collapse() {
        let html = r#"<a href="/a#one">1</a><a href="/a#two">2</a><a href='/a'>3</a>"#;
        assert_eq!(same_host_links(html, "https://example.com"), vec!["https://example.com/a"]);
    }

    #[test]
    fn bad_base_yields_nothing() {
        assert!(same_host_links(r#"<a href="/x">x</a>"#, "not a url").is_empty());
    }
}
