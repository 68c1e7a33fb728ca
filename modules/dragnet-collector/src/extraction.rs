use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use dragnet_common::{
    score_content, CollectionStats, CollectorLimits, ExtractedDocument, ExtractionSummary,
    ExtractionTask,
};

use crate::fanout::{fan_out, Settled};
use crate::harvest::Harvest;
use crate::traits::ContentExtractor;

#[derive(Debug, Default)]
pub struct ExtractionOutcome {
    /// Ordered by `extraction_index`.
    pub documents: Vec<ExtractedDocument>,
    pub summary: ExtractionSummary,
    /// Tasks that errored or timed out (short content is not a failure).
    pub failed: usize,
}

impl ExtractionOutcome {
    pub fn record(&self, stats: &mut CollectionStats) {
        for doc in &self.documents {
            stats.record_document(doc.content_length, doc.quality_score);
        }
    }
}

/// Bounded worker pool that fetches and scores the text behind each URL.
pub struct ExtractionPool {
    extractor: Arc<dyn ContentExtractor>,
    concurrency: usize,
    max_tasks: usize,
    timeout: Duration,
    min_content_chars: usize,
}

impl ExtractionPool {
    pub fn new(extractor: Arc<dyn ContentExtractor>, limits: &CollectorLimits) -> Self {
        Self {
            extractor,
            concurrency: limits.extract_concurrency,
            max_tasks: limits.max_extraction_urls,
            timeout: limits.extract_timeout,
            min_content_chars: limits.min_content_chars,
        }
    }

    pub async fn run(&self, harvest: Harvest) -> ExtractionOutcome {
        let found = harvest.tasks.len();
        let tasks: Vec<_> = harvest
            .tasks
            .into_iter()
            .take(self.max_tasks)
            .enumerate()
            .map(|(index, task)| {
                let extractor = self.extractor.clone();
                let label = (index, task.url.clone());
                (label, async move {
                    let content = extractor.extract(&task.url).await?;
                    Ok::<_, anyhow::Error>((task, content))
                })
            })
            .collect();
        let submitted = tasks.len();

        info!(
            found,
            submitted,
            concurrency = self.concurrency,
            "Starting content extraction"
        );

        let mut documents = Vec::new();
        let mut failed = 0usize;
        for ((index, url), settled) in fan_out(tasks, self.concurrency, self.timeout).await {
            match settled {
                Settled::Ok((task, Some(content))) => {
                    match build_document(index, task, content, self.min_content_chars) {
                        Some(doc) => documents.push(doc),
                        None => debug!(url = url.as_str(), "Content too short, dropping"),
                    }
                }
                Settled::Ok((_, None)) => debug!(url = url.as_str(), "No content extracted"),
                failed_task => {
                    failed += 1;
                    let reason = failed_task.failure().unwrap_or_default();
                    warn!(url = url.as_str(), error = reason.as_str(), "Extraction failed");
                }
            }
        }
        documents.sort_by_key(|d| d.extraction_index);

        let summary = summarize(&documents, found, submitted, harvest.duplicates_skipped);
        info!(
            extracted = summary.total_content_extracted,
            failed,
            success_rate = summary.success_rate,
            total_chars = summary.total_chars,
            "Content extraction complete"
        );

        ExtractionOutcome {
            documents,
            summary,
            failed,
        }
    }
}

/// Score extracted text into a document. `None` when the text is shorter
/// than `min_chars` characters.
pub fn build_document(
    index: usize,
    task: ExtractionTask,
    content: String,
    min_chars: usize,
) -> Option<ExtractedDocument> {
    let content_length = content.chars().count();
    if content_length < min_chars {
        return None;
    }
    let quality_score = score_content(&content, &task.source);
    let word_count = content.split_whitespace().count();

    Some(ExtractedDocument {
        url: task.url,
        title: task.title,
        source: task.source,
        snippet: task.snippet,
        content,
        content_length,
        word_count,
        quality_score,
        extraction_index: index,
        extracted_at: Utc::now(),
    })
}

/// `found == 0` gives a success rate of 0 rather than a division fault.
pub fn success_rate(extracted: usize, found: usize) -> f64 {
    if found == 0 {
        return 0.0;
    }
    extracted as f64 / found as f64 * 100.0
}

fn summarize(
    documents: &[ExtractedDocument],
    found: usize,
    submitted: usize,
    duplicates_skipped: usize,
) -> ExtractionSummary {
    let total_chars: u64 = documents.iter().map(|d| d.content_length as u64).sum();
    let avg_content_length = if documents.is_empty() {
        0.0
    } else {
        total_chars as f64 / documents.len() as f64
    };

    let mut sources_by_type = BTreeMap::new();
    for doc in documents {
        *sources_by_type.entry(doc.source.clone()).or_insert(0) += 1;
    }

    ExtractionSummary {
        total_urls_found: found,
        total_tasks_submitted: submitted,
        total_content_extracted: documents.len(),
        success_rate: success_rate(documents.len(), found),
        total_chars,
        avg_content_length,
        sources_by_type,
        duplicates_skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    fn limits(max_urls: usize, timeout: Duration) -> CollectorLimits {
        CollectorLimits {
            max_extraction_urls: max_urls,
            extract_timeout: timeout,
            extract_concurrency: 4,
            ..CollectorLimits::default()
        }
    }

    #[test]
    fn success_rate_handles_zero_found() {
        assert_eq!(success_rate(0, 0), 0.0);
        assert_eq!(success_rate(7, 10), 70.0);
    }

    #[test]
    fn short_content_is_dropped_at_the_boundary() {
        let task = task("https://a.com", "serper");
        assert!(build_document(0, task.clone(), "x".repeat(199), 200).is_none());
        let doc = build_document(0, task, "x".repeat(200), 200).unwrap();
        assert_eq!(doc.content_length, 200);
    }

    #[tokio::test]
    async fn timeouts_and_errors_are_isolated_per_url() {
        let urls: Vec<String> = (0..10).map(|i| format!("https://site{i}.com/")).collect();
        let mut extractor = MockExtractor::new();
        for (i, url) in urls.iter().enumerate() {
            extractor = match i {
                0..=2 => extractor.hang_on(url),
                3 => extractor.fail_on(url),
                _ => extractor.on(url, &dense_text(2_500)),
            };
        }
        let pool = ExtractionPool::new(Arc::new(extractor), &limits(100, Duration::from_millis(100)));

        let outcome = pool.run(harvest_of(&urls, "serper")).await;

        assert_eq!(outcome.documents.len(), 6);
        assert_eq!(outcome.failed, 4);
        assert_eq!(outcome.summary.total_urls_found, 10);
        assert_eq!(outcome.summary.success_rate, 60.0);
    }

    #[tokio::test]
    async fn task_list_is_capped_but_found_count_is_not() {
        let urls: Vec<String> = (0..30).map(|i| format!("https://n{i}.org/")).collect();
        let mut extractor = MockExtractor::new();
        for url in &urls {
            extractor = extractor.on(url, &dense_text(1_200));
        }
        let pool = ExtractionPool::new(Arc::new(extractor), &limits(10, Duration::from_secs(5)));

        let outcome = pool.run(harvest_of(&urls, "exa")).await;

        assert_eq!(outcome.summary.total_tasks_submitted, 10);
        assert_eq!(outcome.summary.total_urls_found, 30);
        assert_eq!(outcome.documents.len(), 10);
        let indexes: Vec<_> = outcome.documents.iter().map(|d| d.extraction_index).collect();
        assert_eq!(indexes, (0..10).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn summary_groups_by_source_and_averages_length() {
        let mut extractor = MockExtractor::new()
            .on("https://a.com/", &"a ".repeat(500))
            .on("https://b.com/", &"b ".repeat(1_000));
        extractor = extractor.empty_on("https://c.com/");
        let mut harvest = harvest_of(&["https://a.com/".to_string(), "https://b.com/".to_string()], "exa");
        harvest.tasks.push(task("https://c.com/", "youtube"));
        harvest.duplicates_skipped = 2;

        let pool = ExtractionPool::new(Arc::new(extractor), &limits(100, Duration::from_secs(5)));
        let outcome = pool.run(harvest).await;

        assert_eq!(outcome.documents.len(), 2);
        assert_eq!(outcome.failed, 0);
        assert_eq!(outcome.summary.sources_by_type["exa"], 2);
        assert_eq!(outcome.summary.total_chars, 3_000);
        assert_eq!(outcome.summary.avg_content_length, 1_500.0);
        assert_eq!(outcome.summary.duplicates_skipped, 2);

        let mut stats = CollectionStats::new();
        outcome.record(&mut stats);
        assert_eq!(stats.total_content_chars, 3_000);
        assert_eq!(stats.quality_scores.len(), 2);
    }
}
