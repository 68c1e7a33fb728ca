// Exa neural search.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use dragnet_common::{Query, SearchHit};

use crate::traits::WebSearcher;

const EXA_URL: &str = "https://api.exa.ai/search";
const SNIPPET_CHARS: usize = 300;

#[derive(Debug, Deserialize)]
struct ExaResponse {
    #[serde(default)]
    results: Vec<ExaResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExaResult {
    #[serde(default)]
    url: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    published_date: Option<String>,
}

impl ExaResult {
    fn into_hit(self) -> SearchHit {
        let snippet = self
            .text
            .as_deref()
            .map(|t| t.chars().take(SNIPPET_CHARS).collect())
            .unwrap_or_default();
        SearchHit {
            title: self.title.unwrap_or_default(),
            url: self.url,
            snippet,
            source: "exa".to_string(),
            score: self.score,
            published_date: self.published_date,
        }
    }
}

pub struct ExaSearcher {
    api_key: String,
    num_results: usize,
    client: reqwest::Client,
}

impl ExaSearcher {
    pub fn new(api_key: &str, num_results: usize) -> Result<Self> {
        Ok(Self {
            api_key: api_key.to_string(),
            num_results,
            client: super::http_client(Duration::from_secs(60))?,
        })
    }
}

#[async_trait]
impl WebSearcher for ExaSearcher {
    fn id(&self) -> &str {
        "exa"
    }

    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn search(&self, query: &Query) -> Result<Vec<SearchHit>> {
        info!(query = query.text.as_str(), num_results = self.num_results, "Exa search");

        let body = serde_json::json!({
            "query": query.text,
            "numResults": self.num_results,
            "type": "neural",
            "useAutoprompt": true,
            "contents": { "text": { "maxCharacters": SNIPPET_CHARS } },
        });

        let data: ExaResponse = self
            .client
            .post(EXA_URL)
            .header("x-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("Exa API request failed")?
            .error_for_status()
            .context("Exa API returned an error status")?
            .json()
            .await
            .context("Failed to parse Exa response")?;

        Ok(data
            .results
            .into_iter()
            .filter(|r| !r.url.is_empty())
            .map(ExaResult::into_hit)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_maps_to_hits() {
        let raw = r#"{"results":[
            {"url":"https://a.com/r","title":"Report","text":"Growth of 12% in 2024","score":0.82,"publishedDate":"2024-03-01"},
            {"url":"","title":"dropped"},
            {"url":"https://b.com"}
        ]}"#;
        let data: ExaResponse = serde_json::from_str(raw).unwrap();
        let hits: Vec<_> = data
            .results
            .into_iter()
            .filter(|r| !r.url.is_empty())
            .map(ExaResult::into_hit)
            .collect();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].score, Some(0.82));
        assert_eq!(hits[0].published_date.as_deref(), Some("2024-03-01"));
        assert_eq!(hits[0].snippet, "Growth of 12% in 2024");
        assert_eq!(hits[1].title, "");
        assert!(hits.iter().all(|h| h.source == "exa"));
    }
}
