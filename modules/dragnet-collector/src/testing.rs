// Test mocks for the collection pipeline.
//
// One mock per trait boundary:
// - MockSearcher (WebSearcher): fixed hits, failure, hang, panic, or unavailable
// - MockSocial (SocialSearcher): N generated items, failure, or hang
// - MockNavigator (DeepNavigator): generated pages, failure, hang, or panic
// - MockExtractor (ContentExtractor): HashMap-based URL -> content
// - MemoryStore / FailingStore (SnapshotStore)
//
// Plus helpers for building queries, hits, social items and dense text.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;

use dragnet_common::{
    DeepNavigation, DeepPage, ExtractionTask, MassiveSnapshot, Query, QueryContext, SearchHit,
    SocialItem, SocialPlatform,
};

use crate::harvest::Harvest;
use crate::traits::{ContentExtractor, DeepNavigator, SnapshotStore, SocialSearcher, WebSearcher};

/// Long enough that any test timeout fires first.
const HANG: Duration = Duration::from_secs(30);

#[derive(Clone)]
enum Behavior<T> {
    Return(T),
    Fail,
    Hang,
    Panic,
}

impl<T: Clone> Behavior<T> {
    async fn resolve(&self, what: &str) -> Result<T> {
        match self {
            Behavior::Return(v) => Ok(v.clone()),
            Behavior::Fail => bail!("{what} unavailable (mock)"),
            Behavior::Hang => {
                tokio::time::sleep(HANG).await;
                bail!("{what} hung (mock)")
            }
            Behavior::Panic => panic!("{what} panicked (mock)"),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn test_query() -> Query {
    let mut context = QueryContext::new();
    context.insert("segment".into(), "online education".into());
    Query::new("online course market", context)
}

pub fn hit(source: &str, url: &str) -> SearchHit {
    SearchHit {
        title: format!("Result from {source}"),
        url: url.to_string(),
        snippet: "snippet".to_string(),
        source: source.to_string(),
        score: None,
        published_date: None,
    }
}

/// `n` hits with URLs unique per source.
pub fn hits(source: &str, n: usize) -> Vec<SearchHit> {
    (0..n)
        .map(|i| hit(source, &format!("https://{source}.example.com/result/{i}")))
        .collect()
}

pub fn social_item(platform: SocialPlatform, url: &str, text: &str) -> SocialItem {
    SocialItem {
        platform,
        url: url.to_string(),
        text: text.to_string(),
        title: None,
        metadata: serde_json::json!({ "author": "tester" }),
    }
}

pub fn task(url: &str, source: &str) -> ExtractionTask {
    ExtractionTask {
        url: url.to_string(),
        title: String::new(),
        source: source.to_string(),
        snippet: String::new(),
    }
}

pub fn harvest_of(urls: &[String], source: &str) -> Harvest {
    Harvest {
        tasks: urls.iter().map(|u| task(u, source)).collect(),
        duplicates_skipped: 0,
    }
}

/// Exactly `chars` characters of number- and currency-heavy prose.
pub fn dense_text(chars: usize) -> String {
    "Market grew 12% to R$ 450 in 2024. "
        .chars()
        .cycle()
        .take(chars)
        .collect()
}

// ---------------------------------------------------------------------------
// MockSearcher
// ---------------------------------------------------------------------------

pub struct MockSearcher {
    id: String,
    behavior: Behavior<Vec<SearchHit>>,
    available: bool,
    calls: AtomicUsize,
}

impl MockSearcher {
    fn with(id: &str, behavior: Behavior<Vec<SearchHit>>) -> Self {
        Self {
            id: id.to_string(),
            behavior,
            available: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn returning(id: &str, hits: Vec<SearchHit>) -> Self {
        Self::with(id, Behavior::Return(hits))
    }

    pub fn failing(id: &str) -> Self {
        Self::with(id, Behavior::Fail)
    }

    pub fn hanging(id: &str) -> Self {
        Self::with(id, Behavior::Hang)
    }

    pub fn panicking(id: &str) -> Self {
        Self::with(id, Behavior::Panic)
    }

    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WebSearcher for MockSearcher {
    fn id(&self) -> &str {
        &self.id
    }

    fn is_available(&self) -> bool {
        self.available
    }

    async fn search(&self, _query: &Query) -> Result<Vec<SearchHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.behavior.resolve(&self.id).await
    }
}

// ---------------------------------------------------------------------------
// MockSocial
// ---------------------------------------------------------------------------

pub struct MockSocial {
    platform: SocialPlatform,
    behavior: Behavior<Vec<SocialItem>>,
}

impl MockSocial {
    /// `n` generated items on distinct URLs.
    pub fn returning(platform: SocialPlatform, n: usize) -> Self {
        let items = (0..n)
            .map(|i| {
                social_item(
                    platform,
                    &format!("https://{platform}.example.com/post/{i}"),
                    &format!("{platform} post {i} about the market"),
                )
            })
            .collect();
        Self {
            platform,
            behavior: Behavior::Return(items),
        }
    }

    pub fn failing(platform: SocialPlatform) -> Self {
        Self {
            platform,
            behavior: Behavior::Fail,
        }
    }

    pub fn hanging(platform: SocialPlatform) -> Self {
        Self {
            platform,
            behavior: Behavior::Hang,
        }
    }
}

#[async_trait]
impl SocialSearcher for MockSocial {
    fn platform(&self) -> SocialPlatform {
        self.platform
    }

    async fn search(&self, _query: &Query, limit: u32) -> Result<Vec<SocialItem>> {
        let mut items = self.behavior.resolve(self.platform.as_str()).await?;
        items.truncate(limit as usize);
        Ok(items)
    }
}

// ---------------------------------------------------------------------------
// MockNavigator
// ---------------------------------------------------------------------------

pub struct MockNavigator {
    behavior: Behavior<DeepNavigation>,
    last_caps: Mutex<Option<(u32, u32)>>,
}

impl MockNavigator {
    fn with(behavior: Behavior<DeepNavigation>) -> Self {
        Self {
            behavior,
            last_caps: Mutex::new(None),
        }
    }

    /// Ignores the page cap so callers can check that overflow is trimmed.
    pub fn with_pages(n: usize) -> Self {
        let pages = (0..n)
            .map(|i| DeepPage {
                url: format!("https://deep.example.com/page/{i}"),
                title: format!("Deep page {i}"),
            })
            .collect();
        Self::with(Behavior::Return(DeepNavigation {
            pages,
            insights: vec!["mock insight".to_string()],
            ..Default::default()
        }))
    }

    pub fn failing() -> Self {
        Self::with(Behavior::Fail)
    }

    pub fn hanging() -> Self {
        Self::with(Behavior::Hang)
    }

    pub fn panicking() -> Self {
        Self::with(Behavior::Panic)
    }

    /// `(max_pages, depth)` from the most recent call.
    pub fn last_caps(&self) -> Option<(u32, u32)> {
        *self.last_caps.lock().unwrap()
    }
}

#[async_trait]
impl DeepNavigator for MockNavigator {
    async fn navigate(&self, _query: &Query, max_pages: u32, depth: u32) -> Result<DeepNavigation> {
        *self.last_caps.lock().unwrap() = Some((max_pages, depth));
        self.behavior.resolve("navigator").await
    }
}

// ---------------------------------------------------------------------------
// MockExtractor
// ---------------------------------------------------------------------------

/// HashMap-based extractor. Unregistered URLs return `Err`.
/// Builder pattern: `.on()`, `.empty_on()`, `.fail_on()`, `.hang_on()`.
pub struct MockExtractor {
    pages: HashMap<String, Behavior<Option<String>>>,
}

impl MockExtractor {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
        }
    }

    pub fn on(mut self, url: &str, content: &str) -> Self {
        self.pages
            .insert(url.to_string(), Behavior::Return(Some(content.to_string())));
        self
    }

    pub fn empty_on(mut self, url: &str) -> Self {
        self.pages.insert(url.to_string(), Behavior::Return(None));
        self
    }

    pub fn fail_on(mut self, url: &str) -> Self {
        self.pages.insert(url.to_string(), Behavior::Fail);
        self
    }

    pub fn hang_on(mut self, url: &str) -> Self {
        self.pages.insert(url.to_string(), Behavior::Hang);
        self
    }

    /// Same content for every URL.
    pub fn on_all(self, urls: &[String], content: &str) -> Self {
        urls.iter().fold(self, |m, url| m.on(url, content))
    }
}

impl Default for MockExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentExtractor for MockExtractor {
    async fn extract(&self, url: &str) -> Result<Option<String>> {
        match self.pages.get(url) {
            Some(behavior) => behavior.resolve(url).await,
            None => bail!("MockExtractor: no content registered for {url}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Stores
// ---------------------------------------------------------------------------

/// Keeps every saved snapshot in memory.
#[derive(Default)]
pub struct MemoryStore {
    saved: Mutex<Vec<MassiveSnapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saved(&self) -> Vec<MassiveSnapshot> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn save(&self, snapshot: &MassiveSnapshot, run_id: &str) -> Result<String> {
        self.saved.lock().unwrap().push(snapshot.clone());
        Ok(format!("memory://{run_id}"))
    }
}

pub struct FailingStore;

#[async_trait]
impl SnapshotStore for FailingStore {
    async fn save(&self, _snapshot: &MassiveSnapshot, _run_id: &str) -> Result<String> {
        bail!("disk full")
    }
}
