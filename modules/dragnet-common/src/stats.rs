use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{SocialPlatform, SourceCategory};

/// Stats from a collection run.
///
/// Owned by the run that creates it. Category totals are only touched by the
/// `record_*` methods so they always equal the sum of the per-provider and
/// per-platform maps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionStats {
    pub web_sources: u64,
    pub social_sources: u64,
    pub video_sources: u64,
    pub total_content_chars: u64,
    pub sources_by_provider: BTreeMap<String, u64>,
    pub sources_by_platform: BTreeMap<SocialPlatform, u64>,
    pub quality_scores: Vec<f64>,
    pub collection_time_ms: u64,
}

impl CollectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one web provider's result count. A failed provider is recorded
    /// with zero so it still shows up in the per-provider map.
    pub fn record_web_provider(&mut self, provider: &str, count: usize) {
        let count = count as u64;
        *self
            .sources_by_provider
            .entry(provider.to_string())
            .or_insert(0) += count;
        self.web_sources += count;
    }

    pub fn record_social_platform(&mut self, platform: SocialPlatform, count: usize) {
        let count = count as u64;
        *self.sources_by_platform.entry(platform).or_insert(0) += count;
        match platform.category() {
            SourceCategory::Video => self.video_sources += count,
            _ => self.social_sources += count,
        }
    }

    pub fn record_document(&mut self, chars: usize, quality: f64) {
        self.total_content_chars += chars as u64;
        self.quality_scores.push(quality);
    }

    pub fn total_sources(&self) -> u64 {
        self.web_sources + self.social_sources + self.video_sources
    }

    pub fn average_quality(&self) -> f64 {
        if self.quality_scores.is_empty() {
            return 0.0;
        }
        self.quality_scores.iter().sum::<f64>() / self.quality_scores.len() as f64
    }

    /// Web provider with the most results. Ties go to the lexically first id.
    pub fn best_provider(&self) -> Option<(&str, u64)> {
        self.sources_by_provider
            .iter()
            .fold(None, |best: Option<(&str, u64)>, (id, &count)| match best {
                Some((_, top)) if top >= count => best,
                _ => Some((id.as_str(), count)),
            })
    }

    /// Category totals match the per-provider and per-platform maps.
    pub fn is_consistent(&self) -> bool {
        let web: u64 = self.sources_by_provider.values().sum();
        let (mut social, mut video) = (0u64, 0u64);
        for (platform, count) in &self.sources_by_platform {
            match platform.category() {
                SourceCategory::Video => video += count,
                _ => social += count,
            }
        }
        web == self.web_sources && social == self.social_sources && video == self.video_sources
    }
}

impl std::fmt::Display for CollectionStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Collection Run Complete ===")?;
        writeln!(f, "Web sources:        {}", self.web_sources)?;
        writeln!(f, "Social sources:     {}", self.social_sources)?;
        writeln!(f, "Video sources:      {}", self.video_sources)?;
        writeln!(f, "Documents scored:   {}", self.quality_scores.len())?;
        writeln!(f, "Content chars:      {}", self.total_content_chars)?;
        writeln!(f, "Average quality:    {:.1}", self.average_quality())?;
        writeln!(
            f,
            "Elapsed:            {}m {}s",
            self.collection_time_ms / 60_000,
            (self.collection_time_ms / 1000) % 60
        )?;
        if !self.sources_by_provider.is_empty() {
            writeln!(f, "\nBy provider:")?;
            for (provider, count) in &self.sources_by_provider {
                writeln!(f, "  {provider}: {count}")?;
            }
        }
        if !self.sources_by_platform.is_empty() {
            writeln!(f, "\nBy platform:")?;
            for (platform, count) in &self.sources_by_platform {
                writeln!(f, "  {platform}: {count}")?;
            }
        }
        Ok(())
    }
}
