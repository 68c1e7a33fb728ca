use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::{info, warn};

use crate::error::CollectorError;

/// Per-phase budgets for a collection run.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectorLimits {
    pub web_timeout: Duration,
    pub social_timeout: Duration,
    pub deep_timeout: Duration,
    pub extract_timeout: Duration,
    pub extract_concurrency: usize,
    /// Only the first N harvested URLs are submitted for extraction.
    pub max_extraction_urls: usize,
    /// Content shorter than this (in chars) yields no document.
    pub min_content_chars: usize,
    pub deep_max_pages: u32,
    pub deep_depth: u32,
    pub web_results_per_provider: usize,
}

impl Default for CollectorLimits {
    fn default() -> Self {
        Self {
            web_timeout: Duration::from_secs(120),
            social_timeout: Duration::from_secs(90),
            deep_timeout: Duration::from_secs(300),
            extract_timeout: Duration::from_secs(60),
            extract_concurrency: 10,
            max_extraction_urls: 100,
            min_content_chars: 200,
            deep_max_pages: 50,
            deep_depth: 3,
            web_results_per_provider: 30,
        }
    }
}

/// Acceptance gate applied to a finished snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationThresholds {
    pub min_total_chars: u64,
    pub min_average_quality: f64,
    /// Fewer feasible modules than this triggers a source-diversity recommendation.
    pub min_feasible_modules: usize,
}

impl Default for ValidationThresholds {
    fn default() -> Self {
        Self {
            min_total_chars: 50_000,
            min_average_quality: 60.0,
            min_feasible_modules: 6,
        }
    }
}

/// How the consolidator fills the per-module readiness map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadinessPolicy {
    /// Every module marked ready; the validator's thresholds are the only gate.
    #[default]
    Static,
    /// Readiness derived from measured volume per source category.
    Measured,
}

impl FromStr for ReadinessPolicy {
    type Err = CollectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "static" => Ok(ReadinessPolicy::Static),
            "measured" => Ok(ReadinessPolicy::Measured),
            other => Err(CollectorError::Config(format!(
                "unknown readiness policy {other:?} (expected \"static\" or \"measured\")"
            ))),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Providers
    pub serper_api_key: String,
    pub exa_api_key: String,

    // Output
    pub data_dir: PathBuf,

    pub limits: CollectorLimits,
    pub thresholds: ValidationThresholds,
    pub readiness: ReadinessPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            serper_api_key: String::new(),
            exa_api_key: String::new(),
            data_dir: PathBuf::from("data"),
            limits: CollectorLimits::default(),
            thresholds: ValidationThresholds::default(),
            readiness: ReadinessPolicy::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables. Every key is optional;
    /// malformed values fall back to the default with a warning.
    pub fn from_env() -> Self {
        let defaults = CollectorLimits::default();
        let limits = CollectorLimits {
            web_timeout: secs_env("DRAGNET_WEB_TIMEOUT_SECS", defaults.web_timeout),
            social_timeout: secs_env("DRAGNET_SOCIAL_TIMEOUT_SECS", defaults.social_timeout),
            deep_timeout: secs_env("DRAGNET_DEEP_TIMEOUT_SECS", defaults.deep_timeout),
            extract_timeout: secs_env("DRAGNET_EXTRACT_TIMEOUT_SECS", defaults.extract_timeout),
            extract_concurrency: parsed_env(
                "DRAGNET_EXTRACT_CONCURRENCY",
                defaults.extract_concurrency,
            )
            .max(1),
            max_extraction_urls: parsed_env("DRAGNET_MAX_URLS", defaults.max_extraction_urls),
            min_content_chars: parsed_env("DRAGNET_MIN_CONTENT_CHARS", defaults.min_content_chars),
            deep_max_pages: parsed_env("DRAGNET_DEEP_MAX_PAGES", defaults.deep_max_pages),
            deep_depth: parsed_env("DRAGNET_DEEP_DEPTH", defaults.deep_depth),
            web_results_per_provider: parsed_env(
                "DRAGNET_WEB_RESULTS",
                defaults.web_results_per_provider,
            ),
        };

        let default_thresholds = ValidationThresholds::default();
        let thresholds = ValidationThresholds {
            min_total_chars: parsed_env("DRAGNET_MIN_CHARS", default_thresholds.min_total_chars),
            min_average_quality: parsed_env(
                "DRAGNET_MIN_QUALITY",
                default_thresholds.min_average_quality,
            ),
            min_feasible_modules: default_thresholds.min_feasible_modules,
        };

        Self {
            serper_api_key: env::var("SERPER_API_KEY").unwrap_or_default(),
            exa_api_key: env::var("EXA_API_KEY").unwrap_or_default(),
            data_dir: PathBuf::from(env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string())),
            limits,
            thresholds,
            readiness: parsed_env("DRAGNET_READINESS", ReadinessPolicy::default()),
        }
    }

    /// Log the effective configuration with secrets reduced to set/unset.
    pub fn log_redacted(&self) {
        info!(
            serper = redact(&self.serper_api_key),
            exa = redact(&self.exa_api_key),
            data_dir = %self.data_dir.display(),
            readiness = ?self.readiness,
            "Provider config"
        );
        info!(
            web_timeout_secs = self.limits.web_timeout.as_secs(),
            social_timeout_secs = self.limits.social_timeout.as_secs(),
            deep_timeout_secs = self.limits.deep_timeout.as_secs(),
            extract_timeout_secs = self.limits.extract_timeout.as_secs(),
            extract_concurrency = self.limits.extract_concurrency,
            max_urls = self.limits.max_extraction_urls,
            min_chars = self.thresholds.min_total_chars,
            min_quality = self.thresholds.min_average_quality,
            "Collector limits"
        );
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "unset"
    } else {
        "set"
    }
}

fn parsed_env<T>(key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Debug,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = raw.as_str(), ?default, "Unparseable env value, using default");
            default
        }),
        Err(_) => default,
    }
}

fn secs_env(key: &str, default: Duration) -> Duration {
    Duration::from_secs(parsed_env(key, default.as_secs()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_budgets() {
        let limits = CollectorLimits::default();
        assert_eq!(limits.web_timeout, Duration::from_secs(120));
        assert_eq!(limits.social_timeout, Duration::from_secs(90));
        assert_eq!(limits.extract_timeout, Duration::from_secs(60));
        assert_eq!(limits.extract_concurrency, 10);
        assert_eq!(limits.max_extraction_urls, 100);
        assert_eq!(limits.min_content_chars, 200);
        assert_eq!((limits.deep_max_pages, limits.deep_depth), (50, 3));

        let thresholds = ValidationThresholds::default();
        assert_eq!(thresholds.min_total_chars, 50_000);
        assert_eq!(thresholds.min_average_quality, 60.0);
    }

    #[test]
    fn readiness_policy_parses_case_insensitively() {
        assert_eq!("Measured".parse::<ReadinessPolicy>().unwrap(), ReadinessPolicy::Measured);
        assert_eq!(" static ".parse::<ReadinessPolicy>().unwrap(), ReadinessPolicy::Static);
        assert!("sometimes".parse::<ReadinessPolicy>().is_err());
    }

    #[test]
    fn unset_env_falls_back_to_default() {
        assert_eq!(parsed_env("DRAGNET_TEST_SURELY_UNSET_KEY", 17usize), 17);
    }
}
