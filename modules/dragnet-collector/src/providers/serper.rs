// Serper (Google Search) web searcher.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;

use dragnet_common::{Query, SearchHit};

use crate::traits::WebSearcher;

const SERPER_URL: &str = "https://google.serper.dev/search";

#[derive(Debug, serde::Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<SerperResult>,
}

#[derive(Debug, serde::Deserialize)]
struct SerperResult {
    #[serde(default)]
    link: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    date: Option<String>,
}

pub struct SerperSearcher {
    api_key: String,
    max_results: usize,
    client: reqwest::Client,
}

impl SerperSearcher {
    pub fn new(api_key: &str, max_results: usize) -> Result<Self> {
        Ok(Self {
            api_key: api_key.to_string(),
            max_results,
            client: super::http_client(Duration::from_secs(30))?,
        })
    }
}

/// Request body for a query. `country` and `language` context keys map to
/// Serper's `gl` / `hl` locale parameters.
fn request_body(query: &Query, max_results: usize) -> serde_json::Value {
    let mut body = serde_json::json!({
        "q": query.text,
        "num": max_results,
    });
    for (context_key, param) in [("country", "gl"), ("language", "hl")] {
        if let Some(value) = query.context.get(context_key).and_then(|v| v.as_str()) {
            body[param] = serde_json::Value::String(value.to_ascii_lowercase());
        }
    }
    body
}

#[async_trait]
impl WebSearcher for SerperSearcher {
    fn id(&self) -> &str {
        "serper"
    }

    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn search(&self, query: &Query) -> Result<Vec<SearchHit>> {
        info!(query = query.text.as_str(), max_results = self.max_results, "Serper search");

        let resp = self
            .client
            .post(SERPER_URL)
            .header("X-API-KEY", &self.api_key)
            .json(&request_body(query, self.max_results))
            .send()
            .await
            .context("Serper API request failed")?
            .error_for_status()
            .context("Serper API returned an error status")?;

        let data: SerperResponse = resp
            .json()
            .await
            .context("Failed to parse Serper response")?;

        let hits: Vec<SearchHit> = data
            .organic
            .into_iter()
            .filter(|r| !r.link.is_empty())
            .map(|r| SearchHit {
                title: r.title,
                url: r.link,
                snippet: r.snippet,
                source: self.id().to_string(),
                score: None,
                published_date: r.date,
            })
            .collect();

        Ok(hits)
    }
}
