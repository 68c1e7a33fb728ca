use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Free-form key/value context passed alongside every query.
pub type QueryContext = serde_json::Map<String, serde_json::Value>;

/// The text being researched plus the caller's context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub text: String,
    #[serde(default)]
    pub context: QueryContext,
}

impl Query {
    pub fn new(text: impl Into<String>, context: QueryContext) -> Self {
        Self {
            text: text.into(),
            context,
        }
    }
}

// ---------------------------------------------------------------------------
// Provider output
// ---------------------------------------------------------------------------

/// A single web search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
    /// Id of the provider that returned this hit (e.g. `"serper"`).
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
}

/// Which bucket of `CollectionStats` a source contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceCategory {
    Web,
    Social,
    Video,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialPlatform {
    YouTube,
    Twitter,
    LinkedIn,
    Instagram,
    TikTok,
    Facebook,
}

impl SocialPlatform {
    pub const ALL: [SocialPlatform; 6] = [
        SocialPlatform::YouTube,
        SocialPlatform::Twitter,
        SocialPlatform::LinkedIn,
        SocialPlatform::Instagram,
        SocialPlatform::TikTok,
        SocialPlatform::Facebook,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SocialPlatform::YouTube => "youtube",
            SocialPlatform::Twitter => "twitter",
            SocialPlatform::LinkedIn => "linkedin",
            SocialPlatform::Instagram => "instagram",
            SocialPlatform::TikTok => "tiktok",
            SocialPlatform::Facebook => "facebook",
        }
    }

    pub fn category(&self) -> SourceCategory {
        match self {
            SocialPlatform::YouTube => SourceCategory::Video,
            _ => SourceCategory::Social,
        }
    }

    /// Result cap requested from each platform adapter.
    pub fn default_limit(&self) -> u32 {
        match self {
            SocialPlatform::YouTube | SocialPlatform::Twitter => 25,
            _ => 20,
        }
    }
}

impl fmt::Display for SocialPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A post, video or update returned by a social platform adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialItem {
    pub platform: SocialPlatform,
    pub url: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Author, engagement counts, etc. Opaque to the pipeline.
    #[serde(default)]
    pub metadata: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeepPage {
    pub url: String,
    pub title: String,
}

/// Output of the deep navigator. `Default` is the empty result used when
/// navigation fails.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeepNavigation {
    pub pages: Vec<DeepPage>,
    #[serde(default)]
    pub insights: Vec<String>,
    #[serde(default)]
    pub trends: Vec<String>,
    #[serde(default)]
    pub opportunities: Vec<String>,
}

impl DeepNavigation {
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
            && self.insights.is_empty()
            && self.trends.is_empty()
            && self.opportunities.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Source tag for URLs discovered by the deep navigator.
pub const DEEP_NAVIGATOR_SOURCE: &str = "deep_navigator";

/// One URL queued for content extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionTask {
    pub url: String,
    pub title: String,
    pub source: String,
    pub snippet: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    pub url: String,
    pub title: String,
    pub source: String,
    pub snippet: String,
    pub content: String,
    /// Length of `content` in characters, not bytes.
    pub content_length: usize,
    pub word_count: usize,
    /// Always within `[0, 100]`.
    pub quality_score: f64,
    /// Position of the task in the submitted list.
    pub extraction_index: usize,
    pub extracted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionSummary {
    /// URLs harvested from all collectors, after dedup and before the cap.
    pub total_urls_found: usize,
    pub total_tasks_submitted: usize,
    pub total_content_extracted: usize,
    /// `extracted / found * 100`, or 0 when nothing was found.
    pub success_rate: f64,
    pub total_chars: u64,
    pub avg_content_length: f64,
    pub sources_by_type: BTreeMap<String, usize>,
    pub duplicates_skipped: usize,
}

// ---------------------------------------------------------------------------
// Snapshot + validation
// ---------------------------------------------------------------------------

/// Analysis modules that consume the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownstreamModule {
    Avatar,
    MentalDrivers,
    VisualProofs,
    AntiObjection,
    PrePitch,
    FuturePredictions,
    Competition,
    Positioning,
}

impl DownstreamModule {
    pub const ALL: [DownstreamModule; 8] = [
        DownstreamModule::Avatar,
        DownstreamModule::MentalDrivers,
        DownstreamModule::VisualProofs,
        DownstreamModule::AntiObjection,
        DownstreamModule::PrePitch,
        DownstreamModule::FuturePredictions,
        DownstreamModule::Competition,
        DownstreamModule::Positioning,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DownstreamModule::Avatar => "avatar",
            DownstreamModule::MentalDrivers => "mental_drivers",
            DownstreamModule::VisualProofs => "visual_proofs",
            DownstreamModule::AntiObjection => "anti_objection",
            DownstreamModule::PrePitch => "pre_pitch",
            DownstreamModule::FuturePredictions => "future_predictions",
            DownstreamModule::Competition => "competition",
            DownstreamModule::Positioning => "positioning",
        }
    }
}

impl fmt::Display for DownstreamModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub run_id: String,
    pub query: String,
    pub context: QueryContext,
    pub collected_at: DateTime<Utc>,
    pub system_version: String,
    pub collection_kind: String,
}

/// The consolidated output of one collection run. Built once by the
/// consolidator; everything downstream only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MassiveSnapshot {
    pub metadata: SnapshotMetadata,
    pub stats: crate::stats::CollectionStats,
    pub extraction_success_rate: f64,
    pub average_quality: f64,
    pub web: BTreeMap<String, Vec<SearchHit>>,
    pub total_web_results: usize,
    pub social: BTreeMap<SocialPlatform, Vec<SocialItem>>,
    pub total_social_items: usize,
    pub deep: DeepNavigation,
    pub documents: Vec<ExtractedDocument>,
    pub extraction: ExtractionSummary,
    pub insights: Vec<String>,
    pub readiness: BTreeMap<DownstreamModule, bool>,
    pub analysis_quality_sufficient: bool,
}

impl MassiveSnapshot {
    pub fn total_chars(&self) -> u64 {
        self.stats.total_content_chars
    }

    pub fn is_ready(&self, module: DownstreamModule) -> bool {
        self.readiness.get(&module).copied().unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub sufficient_volume: bool,
    pub quality_approved: bool,
    pub feasible_modules: Vec<DownstreamModule>,
    pub problems: Vec<String>,
    pub recommendations: Vec<String>,
}
