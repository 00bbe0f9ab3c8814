use crate::driver::run_batch;
use crate::sampler::Sampler;
use pingload_core::{BatchConfig, HarnessConfig, Summary};
use std::fmt;
use std::time::Duration;
use tracing::{info, instrument};

#[derive(Debug)]
pub struct ConcurrencyReport {
    pub workers: usize,
    pub requests_per_worker: usize,
    pub elapsed: Duration,
    pub summary: Summary,
}

impl fmt::Display for ConcurrencyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = &self.summary;
        writeln!(f, "=== CONCURRENCY ===")?;
        writeln!(
            f,
            "{} workers x {} requests",
            self.workers, self.requests_per_worker
        )?;
        writeln!(f, "Total requests: {}", summary.total)?;
        writeln!(
            f,
            "Successes: {} ({:.1}%)",
            summary.successes,
            summary.success_rate()
        )?;
        writeln!(
            f,
            "Failures: {} ({:.1}%)",
            summary.failures,
            summary.failure_rate()
        )?;
        write!(f, "Total time: {:.2}s", self.elapsed.as_secs_f64())?;

        match &summary.latency {
            Some(latency) => {
                write!(f, "\nAverage response time: {:.2}ms", latency.mean)?;
                write!(f, "\nMin/Max: {:.2}ms / {:.2}ms", latency.min, latency.max)?;
                write!(f, "\nDistribution per instance:")?;
                for (instance, count) in summary.distribution.iter() {
                    write!(f, "\n  {instance}: {count}")?;
                }
            }
            None => write!(f, "\nLatency: no successful samples")?,
        }

        if !summary.errors.is_empty() {
            write!(f, "\nErrors:")?;
            for (error, count) in &summary.errors {
                write!(f, "\n  {error}: {count}")?;
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct StressReport {
    pub workers: usize,
    pub requests_per_worker: usize,
    pub elapsed: Duration,
    pub total: usize,
    pub successes: usize,
    pub failures: usize,
    /// Requests per second over the whole batch.
    pub rps: f64,
}

impl fmt::Display for StressReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== STRESS ===")?;
        writeln!(
            f,
            "{} workers x {} requests",
            self.workers, self.requests_per_worker
        )?;
        writeln!(f, "Total requests: {}", self.total)?;
        writeln!(
            f,
            "Successes: {} ({:.1}%)",
            self.successes,
            pingload_core::rate(self.successes, self.total)
        )?;
        writeln!(
            f,
            "Failures: {} ({:.1}%)",
            self.failures,
            pingload_core::rate(self.failures, self.total)
        )?;
        writeln!(f, "Total time: {:.2}s", self.elapsed.as_secs_f64())?;
        write!(f, "RPS (requests per second): {:.2}", self.rps)
    }
}

async fn ping_batch(config: &HarnessConfig, batch: &BatchConfig) -> pingload_core::Batch {
    let sampler = Sampler::with_timeout(batch.timeout);
    info!(
        "Running {} workers with {} requests each...",
        batch.workers, batch.requests_per_worker
    );
    run_batch(
        batch.workers,
        batch.requests_per_worker,
        sampler.target(config.target.endpoint("/ping")),
    )
    .await
}

/// Concurrent `/ping` workers with full latency, distribution and error reporting.
#[instrument(name = "concurrent_requests", skip_all)]
pub async fn concurrent_requests(config: &HarnessConfig) -> ConcurrencyReport {
    let batch = ping_batch(config, &config.concurrent).await;

    ConcurrencyReport {
        workers: config.concurrent.workers,
        requests_per_worker: config.concurrent.requests_per_worker,
        elapsed: batch.elapsed,
        summary: Summary::from_samples(&batch.samples),
    }
}

/// Concurrent `/ping` workers with a short timeout, counting outcomes and throughput.
#[instrument(name = "stress", skip_all)]
pub async fn stress(config: &HarnessConfig) -> StressReport {
    let batch = ping_batch(config, &config.stress).await;

    StressReport {
        workers: config.stress.workers,
        requests_per_worker: config.stress.requests_per_worker,
        elapsed: batch.elapsed,
        total: batch.total(),
        successes: batch.success_count(),
        failures: batch.failure_count(),
        rps: batch.throughput(),
    }
}
