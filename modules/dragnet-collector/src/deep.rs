use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tracing::{info, warn};

use dragnet_common::{DeepNavigation, Query};

use crate::traits::DeepNavigator;

/// Best-effort deep crawl. Any failure or timeout yields an empty
/// [`DeepNavigation`] and the run carries on.
pub struct DeepNavigationCollector {
    navigator: Option<Arc<dyn DeepNavigator>>,
    max_pages: u32,
    depth: u32,
    timeout: Duration,
}

impl DeepNavigationCollector {
    pub fn new(
        navigator: Option<Arc<dyn DeepNavigator>>,
        max_pages: u32,
        depth: u32,
        timeout: Duration,
    ) -> Self {
        Self {
            navigator,
            max_pages,
            depth,
            timeout,
        }
    }

    pub async fn run(&self, query: &Query) -> DeepNavigation {
        let Some(navigator) = &self.navigator else {
            info!("No deep navigator configured, skipping");
            return DeepNavigation::default();
        };

        info!(
            max_pages = self.max_pages,
            depth = self.depth,
            timeout_secs = self.timeout.as_secs(),
            "Starting deep navigation"
        );

        let call = AssertUnwindSafe(navigator.navigate(query, self.max_pages, self.depth)).catch_unwind();
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(Ok(mut nav))) => {
                nav.pages.truncate(self.max_pages as usize);
                info!(pages = nav.pages.len(), insights = nav.insights.len(), "Deep navigation complete");
                nav
            }
            Ok(Ok(Err(e))) => {
                warn!(error = %e, "Deep navigation failed, continuing without it");
                DeepNavigation::default()
            }
            Ok(Err(_)) => {
                warn!("Deep navigator panicked, continuing without it");
                DeepNavigation::default()
            }
            Err(_) => {
                warn!(timeout_secs = self.timeout.as_secs(), "Deep navigation timed out");
                DeepNavigation::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    #[tokio::test]
    async fn failure_yields_empty_result() {
        let collector = DeepNavigationCollector::new(
            Some(Arc::new(MockNavigator::failing())),
            50,
            3,
            Duration::from_secs(1),
        );
        assert!(collector.run(&test_query()).await.is_empty());
    }

    #[tokio::test]
    async fn panic_yields_empty_result() {
        let collector = DeepNavigationCollector::new(
            Some(Arc::new(MockNavigator::panicking())),
            50,
            3,
            Duration::from_secs(1),
        );
        assert!(collector.run(&test_query()).await.is_empty());
    }

    #[tokio::test]
    async fn timeout_yields_empty_result() {
        let collector = DeepNavigationCollector::new(
            Some(Arc::new(MockNavigator::hanging())),
            50,
            3,
            Duration::from_millis(50),
        );
        assert!(collector.run(&test_query()).await.is_empty());
    }

    #[tokio::test]
    async fn passes_caps_and_trims_overflow() {
        let navigator = Arc::new(MockNavigator::with_pages(12));
        let collector =
            DeepNavigationCollector::new(Some(navigator.clone()), 5, 2, Duration::from_secs(1));

        let nav = collector.run(&test_query()).await;

        assert_eq!(nav.pages.len(), 5);
        assert_eq!(navigator.last_caps(), Some((5, 2)));
    }

    #[tokio::test]
    async fn absent_navigator_is_skipped() {
        let collector = DeepNavigationCollector::new(None, 50, 3, Duration::from_secs(1));
        assert!(collector.run(&test_query()).await.is_empty());
    }
}
