//! Fold every phase's output into one [`MassiveSnapshot`].

use std::collections::BTreeMap;

use chrono::Utc;
use tracing::info;

use dragnet_common::{
    CollectionStats, DeepNavigation, DownstreamModule, MassiveSnapshot, Query, ReadinessPolicy,
    SnapshotMetadata,
};

use crate::extraction::ExtractionOutcome;
use crate::search::WebSearchOutcome;
use crate::social::SocialOutcome;

pub const COLLECTION_KIND: &str = "massive_complete";

/// Characters per printed page in the volume insight.
const CHARS_PER_PAGE: u64 = 2_000;

const SUFFICIENT_MIN_DOCUMENTS: usize = 10;
const SUFFICIENT_MIN_CHARS: u64 = 30_000;
const SUFFICIENT_MIN_QUALITY: f64 = 60.0;

pub fn system_version() -> String {
    format!("dragnet {}", env!("CARGO_PKG_VERSION"))
}

/// Everything the pipeline gathered for one run.
pub struct PhaseOutputs {
    pub web: WebSearchOutcome,
    pub social: SocialOutcome,
    pub deep: DeepNavigation,
    pub extraction: ExtractionOutcome,
}

pub struct Consolidator {
    readiness: ReadinessPolicy,
}

impl Consolidator {
    pub fn new(readiness: ReadinessPolicy) -> Self {
        Self { readiness }
    }

    pub fn consolidate(
        &self,
        run_id: &str,
        query: &Query,
        stats: &CollectionStats,
        phases: PhaseOutputs,
    ) -> MassiveSnapshot {
        let PhaseOutputs {
            web,
            social,
            deep,
            extraction,
        } = phases;

        let readiness = match self.readiness {
            ReadinessPolicy::Static => static_readiness(),
            ReadinessPolicy::Measured => measured_readiness(stats, &deep, extraction.documents.len()),
        };
        let ready = readiness.values().filter(|r| **r).count();
        info!(policy = ?self.readiness, ready, "Readiness computed");

        let insights = insights(stats, extraction.summary.duplicates_skipped);
        let analysis_quality_sufficient = analysis_quality_sufficient(stats, extraction.documents.len());

        let snapshot = MassiveSnapshot {
            metadata: SnapshotMetadata {
                run_id: run_id.to_string(),
                query: query.text.clone(),
                context: query.context.clone(),
                collected_at: Utc::now(),
                system_version: system_version(),
                collection_kind: COLLECTION_KIND.to_string(),
            },
            stats: stats.clone(),
            extraction_success_rate: extraction.summary.success_rate,
            average_quality: stats.average_quality(),
            total_web_results: web.total(),
            web: web.by_provider,
            total_social_items: social.total(),
            social: social.by_platform,
            deep,
            documents: extraction.documents,
            extraction: extraction.summary,
            insights,
            readiness,
            analysis_quality_sufficient,
        };

        info!(
            run_id,
            documents = snapshot.documents.len(),
            total_chars = snapshot.total_chars(),
            insights = snapshot.insights.len(),
            "Snapshot consolidated"
        );
        snapshot
    }
}

/// Human-readable observations derived only from the run's numbers.
pub fn insights(stats: &CollectionStats, duplicates_skipped: usize) -> Vec<String> {
    let mut out = vec![format!("Collected data from {} sources", stats.total_sources())];

    if !stats.quality_scores.is_empty() {
        out.push(format!("Average content quality: {:.1}/100", stats.average_quality()));
    }

    if stats.total_content_chars > 0 {
        out.push(format!(
            "{} characters of extracted content",
            stats.total_content_chars
        ));
        out.push(format!(
            "≈ {} printed pages",
            stats.total_content_chars / CHARS_PER_PAGE
        ));
    }

    if let Some((provider, count)) = stats.best_provider().filter(|(_, n)| *n > 0) {
        out.push(format!("Best provider: {provider} with {count} results"));
    }

    if duplicates_skipped > 0 {
        out.push(format!(
            "Skipped {duplicates_skipped} duplicate URLs during harvesting"
        ));
    }
    out
}

pub fn analysis_quality_sufficient(stats: &CollectionStats, documents: usize) -> bool {
    documents >= SUFFICIENT_MIN_DOCUMENTS
        && stats.total_content_chars >= SUFFICIENT_MIN_CHARS
        && stats.average_quality() >= SUFFICIENT_MIN_QUALITY
}

fn static_readiness() -> BTreeMap<DownstreamModule, bool> {
    DownstreamModule::ALL.iter().map(|m| (*m, true)).collect()
}

/// Each module needs evidence from the categories it actually reads.
fn measured_readiness(
    stats: &CollectionStats,
    deep: &DeepNavigation,
    documents: usize,
) -> BTreeMap<DownstreamModule, bool> {
    let has_web = stats.web_sources > 0;
    let has_social = stats.social_sources > 0;
    let has_video = stats.video_sources > 0;
    let has_docs = documents > 0;
    let has_trends = !deep.trends.is_empty() || !deep.opportunities.is_empty();

    DownstreamModule::ALL
        .iter()
        .map(|module| {
            let ready = match module {
                DownstreamModule::Avatar => has_social,
                DownstreamModule::MentalDrivers => has_social || has_video,
                DownstreamModule::VisualProofs => has_video,
                DownstreamModule::AntiObjection => has_docs,
                DownstreamModule::PrePitch => has_web && has_docs,
                DownstreamModule::FuturePredictions => has_trends || has_docs,
                DownstreamModule::Competition => has_web,
                DownstreamModule::Positioning => has_web && has_docs,
            };
            (*module, ready)
        })
        .collect()
}
