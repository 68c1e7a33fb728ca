use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use dragnet_common::{CollectionStats, Query, SearchHit};

use crate::fanout::{fan_out, ProviderFailure, Settled};
use crate::traits::WebSearcher;

/// Web search results for one run, keyed by provider id.
#[derive(Debug, Default)]
pub struct WebSearchOutcome {
    pub by_provider: BTreeMap<String, Vec<SearchHit>>,
    pub failures: Vec<ProviderFailure>,
    /// Providers that reported themselves unavailable; never called.
    pub unavailable: Vec<String>,
}

impl WebSearchOutcome {
    pub fn total(&self) -> usize {
        self.by_provider.values().map(Vec::len).sum()
    }

    /// Merge per-provider counts into the run's stats.
    pub fn record(&self, stats: &mut CollectionStats) {
        for (provider, hits) in &self.by_provider {
            stats.record_web_provider(provider, hits.len());
        }
    }
}

/// Runs every web search provider concurrently. A provider that errors or
/// outlives `timeout` contributes nothing; the phase itself never fails.
pub struct SearchFanOut {
    searchers: Vec<Arc<dyn WebSearcher>>,
    timeout: Duration,
}

impl SearchFanOut {
    pub fn new(searchers: Vec<Arc<dyn WebSearcher>>, timeout: Duration) -> Self {
        Self { searchers, timeout }
    }

    pub async fn run(&self, query: &Query) -> WebSearchOutcome {
        let mut outcome = WebSearchOutcome::default();
        let mut tasks = Vec::with_capacity(self.searchers.len());

        for searcher in &self.searchers {
            let provider = searcher.id().to_string();
            if !searcher.is_available() {
                info!(provider = provider.as_str(), "Search provider unavailable, skipping");
                outcome.by_provider.entry(provider.clone()).or_default();
                outcome.unavailable.push(provider);
                continue;
            }
            let searcher = searcher.clone();
            tasks.push((provider, async move { searcher.search(query).await }));
        }

        info!(
            query = query.text.as_str(),
            providers = tasks.len(),
            timeout_secs = self.timeout.as_secs(),
            "Starting web search fan-out"
        );

        let pool_size = tasks.len();
        for (provider, settled) in fan_out(tasks, pool_size, self.timeout).await {
            let hits = match settled {
                Settled::Ok(hits) => {
                    info!(provider = provider.as_str(), count = hits.len(), "Web search complete");
                    hits
                }
                failed => {
                    let reason = failed.failure().unwrap_or_default();
                    warn!(provider = provider.as_str(), error = reason.as_str(), "Web search failed");
                    outcome.failures.push(ProviderFailure {
                        provider: provider.clone(),
                        reason,
                    });
                    Vec::new()
                }
            };
            outcome.by_provider.entry(provider).or_default().extend(hits);
        }

        info!(
            total = outcome.total(),
            failed = outcome.failures.len(),
            "Web search fan-out settled"
        );
        outcome
    }
}
