use thiserror::Error;

/// Result type alias for collector operations.
pub type Result<T> = std::result::Result<T, CollectorError>;

#[derive(Error, Debug)]
pub enum CollectorError {
    /// Consolidation or persistence failed; the run produced nothing usable.
    #[error("Collection run {run_id} failed for query {query:?}: {source}")]
    RunFailed {
        run_id: String,
        query: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CollectorError {
    pub fn run_failed(run_id: &str, query: &str, source: anyhow::Error) -> Self {
        CollectorError::RunFailed {
            run_id: run_id.to_string(),
            query: query.to_string(),
            source,
        }
    }

    /// Run id of a failed run, if this error came from one.
    pub fn run_id(&self) -> Option<&str> {
        match self {
            CollectorError::RunFailed { run_id, .. } => Some(run_id),
            CollectorError::Config(_) => None,
        }
    }
}
