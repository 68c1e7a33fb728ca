use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use dragnet_collector::providers::{
    ExaSearcher, HttpContentExtractor, LinkCrawler, SerperSearcher, UnconfiguredPlatform,
};
use dragnet_collector::store::JsonFileStore;
use dragnet_collector::traits::{DeepNavigator, SocialSearcher, WebSearcher};
use dragnet_collector::MassiveCollector;
use dragnet_common::{Config, QueryContext};

#[derive(Parser)]
#[command(name = "dragnet", about = "Collect and score evidence for a research query")]
struct Cli {
    /// What to research
    #[arg(long)]
    query: String,

    /// Extra context passed to providers, repeatable (e.g. `--context country=BR`)
    #[arg(long = "context", value_parser = parse_context_pair)]
    context: Vec<(String, String)>,

    /// Run id; a random UUID when omitted
    #[arg(long)]
    run_id: Option<String>,

    /// Where snapshots are written (overrides DATA_DIR)
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

fn parse_context_pair(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got {raw:?}"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in {raw:?}"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("dragnet=info".parse()?))
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    config.log_redacted();

    let serper: Arc<dyn WebSearcher> = Arc::new(SerperSearcher::new(
        &config.serper_api_key,
        config.limits.web_results_per_provider,
    )?);
    let exa: Arc<dyn WebSearcher> = Arc::new(ExaSearcher::new(
        &config.exa_api_key,
        config.limits.web_results_per_provider,
    )?);
    let social: Vec<Arc<dyn SocialSearcher>> = UnconfiguredPlatform::all()
        .into_iter()
        .map(|p| Arc::new(p) as Arc<dyn SocialSearcher>)
        .collect();

    let navigator: Option<Arc<dyn DeepNavigator>> = if serper.is_available() {
        Some(Arc::new(LinkCrawler::new(
            serper.clone(),
            config.limits.extract_timeout,
        )?))
    } else {
        warn!("SERPER_API_KEY not set, deep navigation disabled");
        None
    };

    let collector = MassiveCollector::builder()
        .web_searchers(vec![serper, exa])
        .social_searchers(social)
        .navigator(navigator)
        .extractor(Arc::new(HttpContentExtractor::new(config.limits.extract_timeout)?))
        .store(Arc::new(JsonFileStore::new(&config.data_dir)))
        .limits(config.limits.clone())
        .thresholds(config.thresholds.clone())
        .readiness(config.readiness)
        .build();

    let context: QueryContext = cli
        .context
        .into_iter()
        .map(|(k, v)| (k, serde_json::Value::String(v)))
        .collect();
    let run_id = cli
        .run_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let progress = |step: u32, message: &str| info!(step, "{message}");
    let result = collector
        .collect(&cli.query, context, &run_id, Some(&progress))
        .await
        .with_context(|| format!("run {run_id} did not complete"))?;

    info!("{}", result.stats);
    info!(location = result.snapshot_location.as_str(), "Snapshot written");

    let validation = &result.validation;
    info!(
        sufficient_volume = validation.sufficient_volume,
        quality_approved = validation.quality_approved,
        feasible_modules = validation.feasible_modules.len(),
        "Validation verdict"
    );
    for problem in &validation.problems {
        warn!("{problem}");
    }
    for recommendation in &validation.recommendations {
        info!("Recommendation: {recommendation}");
    }
    for insight in &result.snapshot.insights {
        info!("Insight: {insight}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_pairs_split_on_first_equals() {
        assert_eq!(
            parse_context_pair("note=a=b").unwrap(),
            ("note".to_string(), "a=b".to_string())
        );
        assert!(parse_context_pair("novalue").is_err());
        assert!(parse_context_pair("=x").is_err());
    }

    #[test]
    fn cli_accepts_repeated_context() {
        let cli = Cli::try_parse_from([
            "dragnet",
            "--query",
            "online courses",
            "--context",
            "country=BR",
            "--context",
            "segment=fitness",
        ])
        .unwrap();
        assert_eq!(cli.context.len(), 2);
        assert!(cli.run_id.is_none());
    }
}
