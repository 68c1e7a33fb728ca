// Trait boundaries for every external collaborator the collector talks to.
//
// Providers, the content extractor and the snapshot store all sit behind
// these so the pipeline can be driven by the mocks in `testing` with no
// network and no disk.

use anyhow::Result;
use async_trait::async_trait;

use dragnet_common::{DeepNavigation, MassiveSnapshot, Query, SearchHit, SocialItem, SocialPlatform};

// ---------------------------------------------------------------------------
// WebSearcher
// ---------------------------------------------------------------------------

#[async_trait]
pub trait WebSearcher: Send + Sync {
    /// Stable provider id, used as the source tag on hits (e.g. `"serper"`).
    fn id(&self) -> &str;

    /// Whether the provider can run. Unavailable providers are skipped, not called.
    fn is_available(&self) -> bool {
        true
    }

    /// Return hits for the query. "No results" is `Ok(vec![])`, not an error.
    async fn search(&self, query: &Query) -> Result<Vec<SearchHit>>;
}

// ---------------------------------------------------------------------------
// SocialSearcher
// ---------------------------------------------------------------------------

#[async_trait]
pub trait SocialSearcher: Send + Sync {
    fn platform(&self) -> SocialPlatform;

    fn is_available(&self) -> bool {
        true
    }

    /// Return posts/videos for the query. Adapters without credentials must
    /// return `Ok(vec![])` rather than fail.
    async fn search(&self, query: &Query, limit: u32) -> Result<Vec<SocialItem>>;
}

// ---------------------------------------------------------------------------
// DeepNavigator
// ---------------------------------------------------------------------------

#[async_trait]
pub trait DeepNavigator: Send + Sync {
    async fn navigate(&self, query: &Query, max_pages: u32, depth: u32) -> Result<DeepNavigation>;
}

// ---------------------------------------------------------------------------
// ContentExtractor
// ---------------------------------------------------------------------------

#[async_trait]
pub trait ContentExtractor: Send + Sync {
    /// Fetch a URL and return its readable text. `None` when the page had
    /// nothing worth keeping.
    async fn extract(&self, url: &str) -> Result<Option<String>>;
}

// ---------------------------------------------------------------------------
// SnapshotStore
// ---------------------------------------------------------------------------

#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Durably store the snapshot and return where it went.
    async fn save(&self, snapshot: &MassiveSnapshot, run_id: &str) -> Result<String>;
}
