//! The end-to-end collection run.
//!
//! Phases run in a fixed order: web search, social search, deep navigation,
//! harvest + extraction, consolidation, persistence, validation. Each phase
//! returns its contribution as a value and the run merges it into its own
//! [`CollectionStats`]; nothing is shared between concurrent tasks.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};
use typed_builder::TypedBuilder;

use dragnet_common::{
    CollectionStats, CollectorError, CollectorLimits, MassiveSnapshot, Query, QueryContext,
    ReadinessPolicy, ValidationReport, ValidationThresholds,
};

use crate::consolidate::{Consolidator, PhaseOutputs};
use crate::deep::DeepNavigationCollector;
use crate::extraction::ExtractionPool;
use crate::harvest::harvest_urls;
use crate::search::SearchFanOut;
use crate::social::SocialFanOut;
use crate::traits::{ContentExtractor, DeepNavigator, SnapshotStore, SocialSearcher, WebSearcher};
use crate::validate::validate;

/// Progress checkpoints reported to the caller's callback.
pub mod checkpoint {
    pub const START: u32 = 1;
    pub const WEB_SEARCH: u32 = 2;
    pub const SOCIAL_SEARCH: u32 = 4;
    pub const DEEP_NAVIGATION: u32 = 6;
    pub const EXTRACTION: u32 = 8;
    pub const CONSOLIDATION: u32 = 10;
    pub const PERSISTENCE: u32 = 11;
    pub const VALIDATION: u32 = 12;
}

/// Synchronous progress callback: `(step, message)`.
pub type Progress<'a> = Option<&'a (dyn Fn(u32, &str) + Send + Sync)>;

#[derive(Debug, Clone, Serialize)]
pub struct CollectionResult {
    /// The run completed and its snapshot was persisted. Whether the data is
    /// good enough is in `validation`.
    pub success: bool,
    pub run_id: String,
    pub query: String,
    pub context: QueryContext,
    pub snapshot_location: String,
    pub snapshot: Arc<MassiveSnapshot>,
    pub stats: CollectionStats,
    pub validation: ValidationReport,
    pub timestamp: DateTime<Utc>,
}

/// Dependency container for a collector. Long-lived; one instance can serve
/// any number of sequential or concurrent runs.
#[derive(Clone, TypedBuilder)]
pub struct MassiveCollector {
    #[builder(default)]
    web_searchers: Vec<Arc<dyn WebSearcher>>,
    #[builder(default)]
    social_searchers: Vec<Arc<dyn SocialSearcher>>,
    #[builder(default)]
    navigator: Option<Arc<dyn DeepNavigator>>,
    extractor: Arc<dyn ContentExtractor>,
    store: Arc<dyn SnapshotStore>,
    #[builder(default)]
    limits: CollectorLimits,
    #[builder(default)]
    thresholds: ValidationThresholds,
    #[builder(default)]
    readiness: ReadinessPolicy,
}

impl MassiveCollector {
    pub async fn collect(
        &self,
        query: &str,
        context: QueryContext,
        run_id: &str,
        progress: Progress<'_>,
    ) -> dragnet_common::Result<CollectionResult> {
        let report = |step: u32, message: &str| {
            if let Some(cb) = progress {
                cb(step, message);
            }
        };
        let started = Instant::now();
        let query = Query::new(query, context);
        let mut stats = CollectionStats::new();

        info!(run_id, query = query.text.as_str(), "Starting collection run");
        report(checkpoint::START, "Starting collection");

        report(checkpoint::WEB_SEARCH, "Searching the web");
        let web = SearchFanOut::new(self.web_searchers.clone(), self.limits.web_timeout)
            .run(&query)
            .await;
        web.record(&mut stats);

        report(checkpoint::SOCIAL_SEARCH, "Searching social platforms");
        let social = SocialFanOut::new(self.social_searchers.clone(), self.limits.social_timeout)
            .run(&query)
            .await;
        social.record(&mut stats);

        report(checkpoint::DEEP_NAVIGATION, "Navigating deep sources");
        let deep = DeepNavigationCollector::new(
            self.navigator.clone(),
            self.limits.deep_max_pages,
            self.limits.deep_depth,
            self.limits.deep_timeout,
        )
        .run(&query)
        .await;

        report(checkpoint::EXTRACTION, "Extracting content");
        let harvest = harvest_urls(&web, &social, &deep);
        let extraction = ExtractionPool::new(self.extractor.clone(), &self.limits)
            .run(harvest)
            .await;
        extraction.record(&mut stats);

        stats.collection_time_ms = started.elapsed().as_millis() as u64;

        report(checkpoint::CONSOLIDATION, "Consolidating snapshot");
        let snapshot = Consolidator::new(self.readiness).consolidate(
            run_id,
            &query,
            &stats,
            PhaseOutputs {
                web,
                social,
                deep,
                extraction,
            },
        );

        report(checkpoint::PERSISTENCE, "Saving snapshot");
        let snapshot_location = match self.store.save(&snapshot, run_id).await {
            Ok(location) => location,
            Err(e) => {
                error!(run_id, error = %e, "Snapshot persistence failed");
                return Err(CollectorError::run_failed(run_id, &query.text, e));
            }
        };
        let snapshot = Arc::new(snapshot);

        report(checkpoint::VALIDATION, "Validating snapshot");
        let validation = validate(&snapshot, &self.thresholds);

        info!(
            run_id,
            sources = stats.total_sources(),
            documents = snapshot.documents.len(),
            total_chars = stats.total_content_chars,
            sufficient_volume = validation.sufficient_volume,
            quality_approved = validation.quality_approved,
            elapsed_ms = stats.collection_time_ms,
            "Collection run complete"
        );

        Ok(CollectionResult {
            success: true,
            run_id: run_id.to_string(),
            query: query.text,
            context: query.context,
            snapshot_location,
            snapshot,
            stats,
            validation,
            timestamp: Utc::now(),
        })
    }
}
