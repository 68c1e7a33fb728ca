//! Bounded, failure-isolated fan-out.
//!
//! Every phase that calls several unreliable collaborators at once goes
//! through [`fan_out`]: each task gets its own timeout, a failing or hanging
//! task settles as [`Settled::Failed`] / [`Settled::TimedOut`], and the caller
//! only sees results once every task has settled. A task that panics settles
//! as `Failed` too.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use futures::FutureExt;

/// How a single fan-out task ended.
#[derive(Debug)]
pub enum Settled<T> {
    Ok(T),
    Failed(String),
    TimedOut,
}

impl<T> Settled<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, Settled::Ok(_))
    }

    /// Human-readable failure reason, `None` on success.
    pub fn failure(&self) -> Option<String> {
        match self {
            Settled::Ok(_) => None,
            Settled::Failed(e) => Some(e.clone()),
            Settled::TimedOut => Some("timed out".to_string()),
        }
    }
}

/// A provider call that settled as anything but success.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ProviderFailure {
    pub provider: String,
    pub reason: String,
}

/// Run labelled futures with at most `concurrency` in flight, each bounded by
/// `timeout`. Completion order is arbitrary; every input yields exactly one
/// `(label, Settled)` in the output.
pub async fn fan_out<L, T, F>(
    tasks: Vec<(L, F)>,
    concurrency: usize,
    timeout: Duration,
) -> Vec<(L, Settled<T>)>
where
    F: Future<Output = anyhow::Result<T>>,
{
    stream::iter(tasks.into_iter().map(|(label, fut)| async move {
        let guarded = AssertUnwindSafe(fut).catch_unwind();
        let settled = match tokio::time::timeout(timeout, guarded).await {
            Ok(Ok(Ok(value))) => Settled::Ok(value),
            Ok(Ok(Err(e))) => Settled::Failed(format!("{e:#}")),
            Ok(Err(payload)) => Settled::Failed(format!("panicked: {}", panic_message(&*payload))),
            Err(_) => Settled::TimedOut,
        };
        (label, settled)
    }))
    .buffer_unordered(concurrency.max(1))
    .collect()
    .await
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::pin::Pin;

    type BoxFut = Pin<Box<dyn Future<Output = anyhow::Result<u32>> + Send>>;

    fn ready(v: u32) -> BoxFut {
        Box::pin(async move { Ok::<_, anyhow::Error>(v) })
    }

    fn failing(msg: &'static str) -> BoxFut {
        Box::pin(async move { Err::<u32, _>(anyhow::anyhow!(msg)) })
    }

    fn hanging() -> BoxFut {
        Box::pin(async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok::<_, anyhow::Error>(3)
        })
    }

    fn panicking() -> BoxFut {
        Box::pin(async {
            if true {
                panic!("adapter bug");
            }
            Ok::<_, anyhow::Error>(0)
        })
    }

    #[tokio::test]
    async fn panicking_task_settles_as_failure() {
        let tasks: Vec<(&str, BoxFut)> = vec![("bad", panicking()), ("good", ready(5))];

        let mut results = fan_out(tasks, 2, Duration::from_secs(1)).await;
        results.sort_by_key(|(label, _)| *label);

        assert_eq!(results.len(), 2);
        assert_eq!(
            results[0].1.failure().as_deref(),
            Some("panicked: adapter bug")
        );
        assert!(matches!(results[1], ("good", Settled::Ok(5))));
    }

    #[tokio::test]
    async fn every_task_settles_exactly_once() {
        let tasks: Vec<(&str, BoxFut)> = vec![
            ("ok", ready(1)),
            ("err", failing("boom")),
            ("slow", hanging()),
        ];

        let started = std::time::Instant::now();
        let mut results = fan_out(tasks, 3, Duration::from_millis(50)).await;
        assert!(started.elapsed() < Duration::from_secs(5));

        results.sort_by_key(|(label, _)| *label);
        assert_eq!(results.len(), 3);
        assert!(matches!(results[0], ("err", Settled::Failed(_))));
        assert!(matches!(results[1], ("ok", Settled::Ok(1))));
        assert!(matches!(results[2], ("slow", Settled::TimedOut)));
    }

    #[tokio::test]
    async fn empty_input_returns_empty_output() {
        let tasks: Vec<(&str, BoxFut)> = Vec::new();
        assert!(fan_out(tasks, 4, Duration::from_secs(1)).await.is_empty());
    }

    #[tokio::test]
    async fn zero_concurrency_still_makes_progress() {
        let tasks: Vec<(u8, BoxFut)> = vec![(1, ready(7))];
        let results = fan_out(tasks, 0, Duration::from_secs(1)).await;
        assert!(results[0].1.is_ok());
    }
}
