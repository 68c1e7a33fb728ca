// Breadth-first same-site crawler used as the deep navigator.
//
// Seeds come from a web searcher; each level fetches its frontier
// concurrently and queues same-host links for the next level until the
// page or depth cap is hit.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tracing::{debug, info};

use dragnet_common::{DeepNavigation, DeepPage, Query};

use super::html::{page_title, same_host_links};
use crate::harvest::dedup_key;
use crate::traits::{DeepNavigator, WebSearcher};

const FETCH_CONCURRENCY: usize = 8;
const MAX_SEEDS: usize = 10;

/// Visited set plus page budget for one crawl.
struct Frontier {
    visited: HashSet<String>,
    max_pages: usize,
    admitted: usize,
}

impl Frontier {
    fn new(max_pages: usize) -> Self {
        Self {
            visited: HashSet::new(),
            max_pages,
            admitted: 0,
        }
    }

    fn is_full(&self) -> bool {
        self.admitted >= self.max_pages
    }

    /// Reserve a page slot for `url` unless it was seen or the budget is spent.
    fn admit(&mut self, url: &str) -> bool {
        if self.is_full() || !self.visited.insert(dedup_key(url)) {
            return false;
        }
        self.admitted += 1;
        true
    }
}

pub struct LinkCrawler {
    seeder: Arc<dyn WebSearcher>,
    client: reqwest::Client,
}

impl LinkCrawler {
    pub fn new(seeder: Arc<dyn WebSearcher>, page_timeout: Duration) -> Result<Self> {
        Ok(Self {
            seeder,
            client: super::http_client(page_timeout)?,
        })
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        self.client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {url} failed"))?
            .error_for_status()?
            .text()
            .await
            .context("Failed to read page body")
    }
}

#[async_trait]
impl DeepNavigator for LinkCrawler {
    async fn navigate(&self, query: &Query, max_pages: u32, depth: u32) -> Result<DeepNavigation> {
        if !self.seeder.is_available() {
            info!(seeder = self.seeder.id(), "Crawl seeder unavailable, nothing to navigate");
            return Ok(DeepNavigation::default());
        }

        let seeds = self.seeder.search(query).await.context("Seeding crawl failed")?;
        let mut frontier = Frontier::new(max_pages as usize);
        let mut level: Vec<String> = seeds
            .into_iter()
            .take(MAX_SEEDS)
            .map(|hit| hit.url)
            .filter(|url| frontier.admit(url))
            .collect();

        let mut pages = Vec::new();
        let mut hosts = BTreeSet::new();

        for current_depth in 1..=depth.max(1) {
            if level.is_empty() {
                break;
            }
            debug!(depth = current_depth, frontier = level.len(), "Crawling level");

            let fetched: Vec<(String, Result<String>)> = stream::iter(level.drain(..))
                .map(|url| async move {
                    let body = self.fetch(&url).await;
                    (url, body)
                })
                .buffer_unordered(FETCH_CONCURRENCY)
                .collect()
                .await;

            let mut next = Vec::new();
            for (url, body) in fetched {
                let html = match body {
                    Ok(html) => html,
                    Err(e) => {
                        debug!(url = url.as_str(), error = %e, "Crawl fetch failed");
                        continue;
                    }
                };
                if current_depth < depth {
                    for link in same_host_links(&html, &url) {
                        if frontier.admit(&link) {
                            next.push(link);
                        }
                    }
                }
                if let Some(host) = url::Url::parse(&url).ok().and_then(|u| u.host_str().map(str::to_string)) {
                    hosts.insert(host);
                }
                pages.push(DeepPage {
                    title: page_title(&html),
                    url,
                });
            }
            level = next;
        }

        info!(pages = pages.len(), sites = hosts.len(), "Crawl complete");

        Ok(DeepNavigation {
            pages,
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockSearcher;

    #[test]
    fn frontier_respects_budget_and_dedup() {
        let mut frontier = Frontier::new(2);
        assert!(frontier.admit("https://a.com/x"));
        assert!(!frontier.admit("https://www.a.com/x/"));
        assert!(frontier.admit("https://a.com/y"));
        assert!(frontier.is_full());
        assert!(!frontier.admit("https://a.com/z"));
    }

    #[tokio::test]
    async fn unavailable_seeder_yields_empty_navigation() {
        let seeder = Arc::new(MockSearcher::returning("serper", Vec::new()).unavailable());
        let crawler = LinkCrawler::new(seeder.clone(), Duration::from_secs(1)).unwrap();

        let nav = crawler
            .navigate(&crate::testing::test_query(), 50, 3)
            .await
            .unwrap();

        assert!(nav.is_empty());
        assert_eq!(seeder.calls(), 0);
    }

    #[tokio::test]
    async fn seeding_failure_is_an_error() {
        let crawler =
            LinkCrawler::new(Arc::new(MockSearcher::failing("serper")), Duration::from_secs(1)).unwrap();
        assert!(crawler.navigate(&crate::testing::test_query(), 50, 3).await.is_err());
    }
}
