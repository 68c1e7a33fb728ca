pub mod config;
pub mod error;
pub mod quality;
pub mod stats;
pub mod types;

pub use config::{CollectorLimits, Config, ReadinessPolicy, ValidationThresholds};
pub use error::{CollectorError, Result};
pub use quality::score_content;
pub use stats::CollectionStats;
pub use types::*;
