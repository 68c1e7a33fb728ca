// Plain HTTP page extractor: GET the URL, reduce HTML to readable markdown.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use spider_transformations::transformation::content::{
    transform_content_input, ReturnFormat, TransformConfig, TransformInput,
};
use tracing::debug;
use url::Url;

use crate::traits::ContentExtractor;

/// Bodies larger than this are not worth reducing.
const MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Html,
    Text,
    Unsupported,
}

fn body_kind(content_type: Option<&str>) -> BodyKind {
    let Some(ct) = content_type else {
        return BodyKind::Html;
    };
    let mime = ct.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    match mime.as_str() {
        "text/html" | "application/xhtml+xml" => BodyKind::Html,
        "text/plain" | "text/markdown" => BodyKind::Text,
        _ => BodyKind::Unsupported,
    }
}

/// Main content of an HTML page as markdown, images and inline SVG dropped.
fn readable_markdown(html: &[u8], page: &Url) -> String {
    let config = TransformConfig {
        readability: true,
        main_content: true,
        return_format: ReturnFormat::Markdown,
        filter_images: true,
        filter_svg: true,
        clean_html: true,
    };
    transform_content_input(
        TransformInput {
            url: Some(page),
            content: html,
            screenshot_bytes: None,
            encoding: None,
            selector_config: None,
            ignore_tags: None,
        },
        &config,
    )
}

pub struct HttpContentExtractor {
    client: reqwest::Client,
}

impl HttpContentExtractor {
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: super::http_client(timeout)?,
        })
    }
}

#[async_trait]
impl ContentExtractor for HttpContentExtractor {
    async fn extract(&self, url: &str) -> Result<Option<String>> {
        let parsed = Url::parse(url).context("Invalid URL")?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!("Only http/https URLs allowed, got: {}", parsed.scheme());
        }

        let resp = self
            .client
            .get(parsed.clone())
            .send()
            .await
            .with_context(|| format!("GET {url} failed"))?
            .error_for_status()?;

        let kind = body_kind(
            resp.headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
        );
        if kind == BodyKind::Unsupported {
            debug!(url, "Unsupported content type, skipping");
            return Ok(None);
        }

        let bytes = resp.bytes().await.context("Failed to read response body")?;
        if bytes.len() > MAX_BODY_BYTES {
            debug!(url, bytes = bytes.len(), "Body too large, skipping");
            return Ok(None);
        }

        let text = match kind {
            BodyKind::Html => readable_markdown(&bytes, &parsed),
            _ => String::from_utf8_lossy(&bytes).into_owned(),
        };
        let text = text.trim();
        Ok((!text.is_empty()).then(|| text.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_classification() {
        assert_eq!(body_kind(Some("text/html; charset=utf-8")), BodyKind::Html);
        assert_eq!(body_kind(Some("TEXT/PLAIN")), BodyKind::Text);
        assert_eq!(body_kind(Some("application/pdf")), BodyKind::Unsupported);
        assert_eq!(body_kind(None), BodyKind::Html);
    }

    #[test]
    fn html_is_reduced_to_article_text() {
        let paragraph = "Enrollment in online courses grew steadily across every region we surveyed this year. ";
        let html = format!(
            "<html><head><title>Report</title></head><body><article><h1>Market report</h1><p>{}</p><p>{}</p></article></body></html>",
            paragraph.repeat(5),
            paragraph.repeat(5),
        );
        let page = Url::parse("https://example.com/report").unwrap();

        let text = readable_markdown(html.as_bytes(), &page);

        assert!(text.contains("Enrollment in online courses"));
        assert!(!text.contains("<article>"));
    }

    #[tokio::test]
    async fn non_http_scheme_is_rejected() {
        let extractor = HttpContentExtractor::new(Duration::from_secs(1)).unwrap();
        assert!(extractor.extract("ftp://example.com/file").await.is_err());
    }
}
