//! Turn the three collectors' output into one flat list of extraction tasks.
//!
//! URLs are deduplicated per run on a normalized key (host without `www.`,
//! path without trailing slash, query minus tracking parameters). The first
//! occurrence wins, so web hits take precedence over social items, which
//! take precedence over deep-navigation pages.

use std::collections::HashSet;

use dragnet_common::{DeepNavigation, ExtractionTask, DEEP_NAVIGATOR_SOURCE};

use crate::search::WebSearchOutcome;
use crate::social::SocialOutcome;

/// Social snippets are cut to this many characters.
const SOCIAL_SNIPPET_CHARS: usize = 200;

const TRACKING_PARAMS: &[&str] = &[
    "_dt", "fbclid", "gclid", "utm_source", "utm_medium", "utm_campaign", "utm_term",
    "utm_content", "modal", "ref", "mc_cid", "mc_eid",
];

#[derive(Debug, Default)]
pub struct Harvest {
    pub tasks: Vec<ExtractionTask>,
    pub duplicates_skipped: usize,
}

#[derive(Default)]
struct Harvester {
    seen: HashSet<String>,
    harvest: Harvest,
}

impl Harvester {
    fn push(&mut self, url: &str, title: &str, source: &str, snippet: String) {
        let url = url.trim();
        if url.is_empty() {
            return;
        }
        if !self.seen.insert(dedup_key(url)) {
            self.harvest.duplicates_skipped += 1;
            return;
        }
        self.harvest.tasks.push(ExtractionTask {
            url: url.to_string(),
            title: title.to_string(),
            source: source.to_string(),
            snippet,
        });
    }
}

pub fn harvest_urls(web: &WebSearchOutcome, social: &SocialOutcome, deep: &DeepNavigation) -> Harvest {
    let mut harvester = Harvester::default();

    for hits in web.by_provider.values() {
        for hit in hits {
            harvester.push(&hit.url, &hit.title, &hit.source, hit.snippet.clone());
        }
    }

    for (platform, items) in &social.by_platform {
        for item in items {
            let title = item.title.as_deref().unwrap_or_default();
            let snippet = item.text.chars().take(SOCIAL_SNIPPET_CHARS).collect();
            harvester.push(&item.url, title, platform.as_str(), snippet);
        }
    }

    for page in &deep.pages {
        harvester.push(&page.url, &page.title, DEEP_NAVIGATOR_SOURCE, String::new());
    }

    harvester.harvest
}

/// Normalized identity of a URL for dedup. Unparseable input falls back to
/// the trimmed string itself.
pub fn dedup_key(raw: &str) -> String {
    let Ok(parsed) = url::Url::parse(raw.trim()) else {
        return raw.trim().to_string();
    };
    let Some(host) = parsed.host_str() else {
        return raw.trim().to_string();
    };

    let host = host.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    let path = parsed.path().trim_end_matches('/');

    let mut pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| !TRACKING_PARAMS.contains(&key.as_ref()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    pairs.sort();

    if pairs.is_empty() {
        return format!("{host}{path}");
    }
    let query = pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    format!("{host}{path}?{query}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use dragnet_common::{DeepPage, SocialPlatform};

    #[test]
    fn scheme_www_slash_and_tracking_params_are_ignored() {
        let a = dedup_key("https://www.Example.com/report/?utm_source=x");
        let b = dedup_key("http://example.com/report");
        assert_eq!(a, b);
    }

    #[test]
    fn meaningful_query_params_are_kept() {
        assert_ne!(
            dedup_key("https://example.com/item?id=1"),
            dedup_key("https://example.com/item?id=2")
        );
        assert_eq!(
            dedup_key("https://example.com/s?b=2&a=1"),
            dedup_key("https://example.com/s?a=1&b=2&fbclid=zz")
        );
    }

    #[test]
    fn unparseable_urls_compare_verbatim() {
        assert_eq!(dedup_key("  not a url "), "not a url");
    }

    #[test]
    fn merges_all_sources_and_skips_duplicates() {
        let mut web = WebSearchOutcome::default();
        web.by_provider.insert(
            "serper".into(),
            vec![hit("serper", "https://a.com/1"), hit("serper", "https://a.com/2")],
        );
        web.by_provider
            .insert("exa".into(), vec![hit("exa", "https://www.a.com/1/")]);

        let mut social = SocialOutcome::default();
        social.by_platform.insert(
            SocialPlatform::Twitter,
            vec![social_item(SocialPlatform::Twitter, "https://x.com/p/9", &"t".repeat(500))],
        );

        let deep = DeepNavigation {
            pages: vec![
                DeepPage { url: "https://deep.org/a".into(), title: "A".into() },
                DeepPage { url: String::new(), title: "no url".into() },
            ],
            ..Default::default()
        };

        let harvest = harvest_urls(&web, &social, &deep);

        assert_eq!(harvest.tasks.len(), 4);
        assert_eq!(harvest.duplicates_skipped, 1);

        let tweet = harvest.tasks.iter().find(|t| t.source == "twitter").unwrap();
        assert_eq!(tweet.snippet.chars().count(), SOCIAL_SNIPPET_CHARS);

        let deep_task = harvest.tasks.last().unwrap();
        assert_eq!(deep_task.source, DEEP_NAVIGATOR_SOURCE);
        assert!(deep_task.snippet.is_empty());
    }

    #[test]
    fn empty_inputs_harvest_nothing() {
        let harvest = harvest_urls(
            &WebSearchOutcome::default(),
            &SocialOutcome::default(),
            &DeepNavigation::default(),
        );
        assert!(harvest.tasks.is_empty());
        assert_eq!(harvest.duplicates_skipped, 0);
    }
}
