//! Concurrent processing for domain probes.
//!
//! `ProbePool` owns a fixed number of worker tasks. Workers pull domain
//! names from a shared work queue, classify them, and push results into a
//! shared results channel that the caller drains.
//!
//! Collection stops after exactly one result per submitted domain; the
//! results channel is never closed by the workers to signal completion.

use crate::aggregate::{Aggregator, ResultSet, Tally};
use crate::classifier::DomainClassifier;
use crate::error::DomainProbeError;
use crate::types::{ClassificationResult, DEFAULT_POOL_SIZE};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Slots in the results channel.
const RESULT_BUFFER: usize = 100;

type WorkQueue = Arc<Mutex<mpsc::Receiver<String>>>;

/// Fixed-size pool of workers running a classifier.
///
/// # Example
///
/// ```rust,no_run
/// use domain_probe_lib::{Classifier, ProbePool};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let pool = ProbePool::new(Classifier::new()?, 50);
///     let domains = vec!["example.com".to_string(), "example.org".to_string()];
///     let results = pool.run(domains).await?;
///     println!("{} of {} valid", results.valid_count(), results.len());
///     Ok(())
/// }
/// ```
pub struct ProbePool<C> {
    classifier: Arc<C>,
    pool_size: usize,
}

impl<C> ProbePool<C>
where
    C: DomainClassifier + 'static,
{
    /// Create a pool with exactly `pool_size` workers. Zero is raised to one.
    pub fn new(classifier: C, pool_size: usize) -> Self {
        Self {
            classifier: Arc::new(classifier),
            pool_size: pool_size.max(1),
        }
    }

    /// Create a pool with the default 200 workers.
    pub fn with_default_size(classifier: C) -> Self {
        Self::new(classifier, DEFAULT_POOL_SIZE)
    }

    /// Number of workers spawned per run.
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Classify every domain and return the complete result set.
    pub async fn run(&self, domains: Vec<String>) -> Result<ResultSet, DomainProbeError> {
        self.run_with_progress(domains, |_, _| {}).await
    }

    /// Classify every domain, calling `on_result` as each result arrives.
    ///
    /// The callback runs on the collecting task with the result and the
    /// running counts, which is enough to render live progress.
    ///
    /// # Errors
    ///
    /// Returns `DomainProbeError::Internal` only if workers disappear before
    /// every domain has produced a result (a worker panicked). Per-domain
    /// probe failures are ordinary results.
    pub async fn run_with_progress<F>(
        &self,
        domains: Vec<String>,
        mut on_result: F,
    ) -> Result<ResultSet, DomainProbeError>
    where
        F: FnMut(&ClassificationResult, &Tally),
    {
        let total = domains.len();
        info!(total, workers = self.pool_size, "starting probe run");

        // Sized to the input so submission never waits on a worker
        let (work_tx, work_rx) = mpsc::channel::<String>(total.max(1));
        let (result_tx, mut result_rx) = mpsc::channel::<ClassificationResult>(RESULT_BUFFER);
        let queue: WorkQueue = Arc::new(Mutex::new(work_rx));

        let workers: Vec<JoinHandle<()>> = (1..=self.pool_size)
            .map(|id| {
                tokio::spawn(worker(
                    id,
                    Arc::clone(&self.classifier),
                    Arc::clone(&queue),
                    result_tx.clone(),
                ))
            })
            .collect();
        drop(result_tx);

        for domain in domains {
            work_tx
                .send(domain)
                .await
                .map_err(|e| DomainProbeError::internal(format!("work queue closed: {}", e)))?;
        }
        drop(work_tx);

        let mut aggregator = Aggregator::with_capacity(total);
        for _ in 0..total {
            let Some(result) = result_rx.recv().await else {
                return Err(DomainProbeError::internal(format!(
                    "worker pool stopped after {} of {} results",
                    aggregator.tally().processed,
                    total
                )));
            };
            aggregator.push(result);
            if let Some(last) = aggregator.last() {
                on_result(last, aggregator.tally());
            }
        }

        for handle in workers {
            if let Err(e) = handle.await {
                warn!(error = %e, "probe worker ended abnormally");
            }
        }

        let results = aggregator.finish();
        info!(
            total = results.len(),
            valid = results.valid_count(),
            "probe run finished"
        );
        Ok(results)
    }
}

/// Pull domains until the queue is drained, sending one result per domain.
async fn worker<C>(
    id: usize,
    classifier: Arc<C>,
    queue: WorkQueue,
    results: mpsc::Sender<ClassificationResult>,
) where
    C: DomainClassifier + 'static,
{
    loop {
        let next = queue.lock().await.recv().await;
        let Some(domain) = next else {
            break;
        };

        let result = classifier.classify(&domain).await;
        if results.send(result).await.is_err() {
            debug!(worker = id, "results channel closed, stopping");
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Status;
    use std::collections::HashSet;
    use std::future::Future;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Marks names starting with "valid" as valid after a short, uneven delay.
    #[derive(Default)]
    struct FakeClassifier {
        calls: Arc<AtomicUsize>,
    }

    impl DomainClassifier for FakeClassifier {
        fn classify(&self, domain: &str) -> impl Future<Output = ClassificationResult> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let domain = domain.to_string();
            async move {
                tokio::time::sleep(Duration::from_millis((domain.len() % 4) as u64)).await;
                if domain == "boom.example" {
                    panic!("classifier blew up");
                }
                if domain.starts_with("valid") {
                    ClassificationResult::valid(domain)
                } else {
                    ClassificationResult::new(domain, Status::Parked, "parked")
                }
            }
        }
    }

    /// Records the highest number of classifications running at once.
    #[derive(Default)]
    struct GaugeClassifier {
        in_flight: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
    }

    impl DomainClassifier for GaugeClassifier {
        fn classify(&self, domain: &str) -> impl Future<Output = ClassificationResult> + Send {
            let in_flight = Arc::clone(&self.in_flight);
            let peak = Arc::clone(&self.peak);
            let domain = domain.to_string();
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(200)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                ClassificationResult::valid(domain)
            }
        }
    }

    fn domains(count: usize) -> Vec<String> {
        (0..count)
            .map(|i| {
                if i % 3 == 0 {
                    format!("valid{}.example", i)
                } else {
                    format!("site{}.example", i)
                }
            })
            .collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_every_domain_exactly_once() {
        for pool_size in [1, 3, 16, 200] {
            let input = domains(57);
            let calls = Arc::new(AtomicUsize::new(0));
            let pool = ProbePool::new(
                FakeClassifier {
                    calls: Arc::clone(&calls),
                },
                pool_size,
            );

            let results = pool.run(input.clone()).await.unwrap();

            assert_eq!(results.len(), input.len(), "pool size {}", pool_size);
            assert_eq!(calls.load(Ordering::SeqCst), input.len());

            let seen: HashSet<&str> = results.iter().map(|r| r.domain.as_str()).collect();
            let expected: HashSet<&str> = input.iter().map(String::as_str).collect();
            assert_eq!(seen, expected);
            assert_eq!(results.valid_count(), 19);
        }
    }

    #[tokio::test]
    async fn test_empty_input() {
        let pool = ProbePool::new(FakeClassifier::default(), 10);
        let results = pool.run(Vec::new()).await.unwrap();
        assert!(results.is_empty());
        assert_eq!(results.valid_count(), 0);
    }

    #[tokio::test]
    async fn test_more_workers_than_domains() {
        let pool = ProbePool::new(FakeClassifier::default(), 50);
        let results = pool.run(domains(2)).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_inputs_are_each_classified() {
        let pool = ProbePool::new(FakeClassifier::default(), 4);
        let input = vec!["same.example".to_string(); 5];
        let results = pool.run(input).await.unwrap();
        assert_eq!(results.len(), 5);
        assert!(results.iter().all(|r| r.domain == "same.example"));
    }

    #[tokio::test]
    async fn test_progress_callback_sees_every_result() {
        let pool = ProbePool::new(FakeClassifier::default(), 5);
        let mut processed = Vec::new();
        let mut last_valid = 0;

        let results = pool
            .run_with_progress(domains(12), |_, tally| {
                processed.push(tally.processed);
                last_valid = tally.valid;
            })
            .await
            .unwrap();

        assert_eq!(processed, (1..=12).collect::<Vec<_>>());
        assert_eq!(last_valid, results.valid_count());
        assert_eq!(last_valid, 4);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrency_matches_pool_size() {
        for pool_size in [1, 4, 1500] {
            let classifier = GaugeClassifier::default();
            let peak = Arc::clone(&classifier.peak);
            let pool = ProbePool::new(classifier, pool_size);

            let results = pool.run(domains(pool_size * 3)).await.unwrap();

            assert_eq!(results.len(), pool_size * 3);
            assert_eq!(peak.load(Ordering::SeqCst), pool_size, "pool size {}", pool_size);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrency_bounded_by_input() {
        let classifier = GaugeClassifier::default();
        let peak = Arc::clone(&classifier.peak);
        let pool = ProbePool::new(classifier, 16);

        let results = pool.run(domains(5)).await.unwrap();

        assert_eq!(results.len(), 5);
        let peak = peak.load(Ordering::SeqCst);
        assert!(peak >= 1 && peak <= 5, "peak {}", peak);
    }

    #[test]
    fn test_pool_size_is_kept() {
        assert_eq!(ProbePool::new(FakeClassifier::default(), 0).pool_size(), 1);
        assert_eq!(
            ProbePool::new(FakeClassifier::default(), 1500).pool_size(),
            1500
        );
        assert_eq!(
            ProbePool::with_default_size(FakeClassifier::default()).pool_size(),
            DEFAULT_POOL_SIZE
        );
    }

    #[tokio::test]
    async fn test_lost_worker_is_reported() {
        let pool = ProbePool::new(FakeClassifier::default(), 2);
        let mut input = domains(6);
        input.push("boom.example".to_string());

        let err = pool.run(input).await.unwrap_err();
        assert!(matches!(err, DomainProbeError::Internal { .. }));
        assert!(err.to_string().contains("6 of 7"));
    }
}
