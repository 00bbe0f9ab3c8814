//! Worker pool driving samples in parallel
use pingload_core::{Batch, LoadLevelResult, ProgressiveConfig, Sample};
use std::future::Future;
use std::time::Instant;
use tokio::task::JoinHandle;
#[allow(unused)]
use tracing::{debug, error, info, instrument, trace, warn, Instrument};

/// Run `workers` independent tasks, each awaiting `requests_per_worker` sequential probes.
///
/// Every task is joined before returning; the batch is never partial unless a worker
/// panicked, in which case its samples are lost and the rest are kept.
#[instrument(name = "batch", skip(probe))]
pub async fn run_batch<T, F>(workers: usize, requests_per_worker: usize, probe: T) -> Batch
where
    T: Fn() -> F + Send + Sync + 'static + Clone,
    F: Future<Output = Sample> + Send + 'static,
{
    let start = Instant::now();

    let handles: Vec<JoinHandle<Vec<Sample>>> = (0..workers)
        .map(|worker| {
            let probe = probe.clone();
            tokio::spawn(
                async move {
                    let mut samples = Vec::with_capacity(requests_per_worker);
                    for _ in 0..requests_per_worker {
                        samples.push(probe().await);
                    }
                    trace!("Worker {worker} finished.");
                    samples
                }
                .in_current_span(),
            )
        })
        .collect();

    // NOTE: Join barrier. Nothing is summarised until every worker is back.
    let mut samples = Vec::with_capacity(workers * requests_per_worker);
    for handle in handles {
        match handle.await {
            Ok(mut worker_samples) => samples.append(&mut worker_samples),
            Err(err) => error!("Worker did not complete: {err}"),
        }
    }

    let batch = Batch {
        samples,
        elapsed: start.elapsed(),
    };
    debug!(
        "Batch complete: {} samples ({} failed) in {}",
        batch.total(),
        batch.failure_count(),
        humantime::format_duration(batch.elapsed)
    );
    batch
}

/// Sequential probes on the current task, logging progress every `progress_every` requests.
pub async fn run_sequential<T, F>(requests: usize, progress_every: usize, probe: T) -> Batch
where
    T: Fn() -> F,
    F: Future<Output = Sample>,
{
    let start = Instant::now();
    let mut samples = Vec::with_capacity(requests);
    for i in 1..=requests {
        samples.push(probe().await);
        if progress_every > 0 && i % progress_every == 0 {
            info!("Processed {i} requests...");
        }
    }

    Batch {
        samples,
        elapsed: start.elapsed(),
    }
}

/// Step through increasing load levels, pausing `cool_down` between levels.
#[instrument(name = "progressive", skip_all, fields(levels = ?config.levels))]
pub async fn run_progressive<T, F>(config: &ProgressiveConfig, probe: T) -> Vec<LoadLevelResult>
where
    T: Fn() -> F + Send + Sync + 'static + Clone,
    F: Future<Output = Sample> + Send + 'static,
{
    let mut results = Vec::with_capacity(config.levels.len());

    for (idx, &workers) in config.levels.iter().enumerate() {
        info!("Testing with {workers} concurrent users...");
        let batch = run_batch(workers, config.requests_per_worker, probe.clone()).await;
        let result = LoadLevelResult::from_batch(workers, &batch);

        if result.total == 0 {
            error!("{workers} users: no samples collected");
        } else {
            info!("{result}");
        }
        results.push(result);

        if idx + 1 < config.levels.len() {
            tokio::time::sleep(config.cool_down).await;
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use pingload_core::{SampleError, Summary};
    use rand_distr::{Distribution, SkewNormal};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn jitter(mean: Duration, std: Duration) -> Duration {
        if std.is_zero() {
            return mean;
        }
        let normal = SkewNormal::new(mean.as_secs_f64(), std.as_secs_f64(), 20.).unwrap();
        Duration::from_secs_f64(normal.sample(&mut rand::thread_rng()).max(0.))
    }

    macro_rules! mock_probe {
        ($m:expr, $s:expr) => {
            || async {
                let start = std::time::Instant::now();
                tokio::time::sleep(jitter($m, $s)).await;
                Sample::success(start.elapsed(), Some("mock".to_string()))
            }
        };
    }

    #[tracing_test::traced_test]
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn batch_runs_in_parallel() {
        let start = Instant::now();
        let batch = run_batch(
            10,
            10,
            mock_probe!(Duration::from_millis(1), Duration::ZERO),
        )
        .await;

        assert_eq!(batch.total(), 100);
        assert_eq!(batch.success_count(), 100);
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[tracing_test::traced_test]
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn batch_is_not_serialised() {
        // 20 workers x 5 requests x 20ms would take 2s if run one after another.
        let batch = run_batch(
            20,
            5,
            mock_probe!(Duration::from_millis(20), Duration::ZERO),
        )
        .await;

        assert_eq!(batch.total(), 100);
        assert!(batch.elapsed < Duration::from_millis(1_000));
    }

    #[tracing_test::traced_test]
    #[tokio::test]
    async fn noisy_latencies_are_all_collected() {
        let batch = run_batch(
            8,
            25,
            mock_probe!(Duration::from_millis(2), Duration::from_millis(1)),
        )
        .await;

        assert_eq!(batch.total(), 200);
        let summary = Summary::from_samples(&batch.samples);
        let stats = summary.latency.unwrap();
        assert!(stats.p95 >= stats.p50);
        assert!(stats.p95 <= stats.max);
    }

    #[tracing_test::traced_test]
    #[tokio::test]
    async fn failures_do_not_stop_siblings() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let probe = move || {
            let n = counter.fetch_add(1, Ordering::Relaxed);
            async move {
                if n % 3 == 0 {
                    Sample::failure(Duration::from_millis(1), SampleError::HttpStatus(500))
                } else {
                    Sample::success(Duration::from_millis(1), None)
                }
            }
        };

        let batch = run_batch(6, 10, probe).await;
        assert_eq!(batch.total(), 60);
        assert_eq!(calls.load(Ordering::Relaxed), 60);
        assert_eq!(batch.failure_count(), 20);
        assert_eq!(batch.success_count() + batch.failure_count(), batch.total());
    }

    #[tracing_test::traced_test]
    #[tokio::test]
    async fn panicked_worker_is_dropped() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let probe = move || {
            let n = counter.fetch_add(1, Ordering::Relaxed);
            async move {
                if n == 0 {
                    panic!("worker blew up");
                }
                Sample::success(Duration::from_millis(1), None)
            }
        };

        let batch = run_batch(4, 5, probe).await;
        // The worker that drew call 0 panics on its first request and contributes nothing.
        assert_eq!(batch.total(), 15);
        assert!(logs_contain("Worker did not complete"));
    }

    #[tokio::test]
    async fn empty_batches() {
        let batch = run_batch(0, 10, mock_probe!(Duration::ZERO, Duration::ZERO)).await;
        assert_eq!(batch.total(), 0);

        let batch = run_batch(10, 0, mock_probe!(Duration::ZERO, Duration::ZERO)).await;
        assert_eq!(batch.total(), 0);
        assert_eq!(batch.throughput(), 0.);
    }

    #[tokio::test]
    async fn sequential_keeps_order() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let probe = move || {
            let n = counter.fetch_add(1, Ordering::Relaxed);
            async move { Sample::success(Duration::from_millis(1), Some(n.to_string())) }
        };

        let batch = run_sequential(5, 0, probe).await;
        let order: Vec<_> = batch.samples.iter().map(|s| s.instance().unwrap()).collect();
        assert_eq!(order, vec!["0", "1", "2", "3", "4"]);
    }

    #[tracing_test::traced_test]
    #[tokio::test]
    async fn sequential_progress_counts_completed_requests() {
        let batch = run_sequential(5, 2, mock_probe!(Duration::ZERO, Duration::ZERO)).await;
        assert_eq!(batch.total(), 5);

        assert!(!logs_contain("Processed 0 requests"));
        assert!(logs_contain("Processed 2 requests"));
        assert!(logs_contain("Processed 4 requests"));
        assert!(!logs_contain("Processed 5 requests"));
    }

    #[tracing_test::traced_test]
    #[tokio::test(start_paused = true)]
    async fn progressive_cools_down_between_levels() {
        let config = ProgressiveConfig {
            levels: vec![1, 2, 4],
            requests_per_worker: 3,
            timeout: Duration::from_secs(10),
            cool_down: Duration::from_secs(2),
        };

        let start = tokio::time::Instant::now();
        let results = run_progressive(&config, || async {
            Sample::success(Duration::from_millis(1), Some("a".to_string()))
        })
        .await;

        assert_eq!(
            results.iter().map(|r| r.workers).collect::<Vec<_>>(),
            vec![1, 2, 4]
        );
        assert_eq!(
            results.iter().map(|r| r.total).collect::<Vec<_>>(),
            vec![3, 6, 12]
        );
        assert!(results.iter().all(|r| r.success_rate() == 100.));
        // Two pauses: between 1->2 and 2->4, none after the last level.
        let waited = start.elapsed();
        assert!(waited >= Duration::from_secs(4));
        assert!(waited < Duration::from_secs(6));
    }
}
