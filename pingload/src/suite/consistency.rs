use crate::driver::run_sequential;
use crate::sampler::Sampler;
use pingload_core::{latency_by_instance, HarnessConfig, LatencyStats, Summary};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{info, instrument, warn};

const PROGRESS_EVERY: usize = 50;

#[derive(Debug)]
pub struct ConsistencyReport {
    pub summary: Summary,
    pub by_instance: BTreeMap<String, LatencyStats>,
}

impl fmt::Display for ConsistencyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== RESPONSE TIME CONSISTENCY ===")?;
        let Some(latency) = &self.summary.latency else {
            return write!(
                f,
                "No successful samples out of {} requests",
                self.summary.total
            );
        };

        writeln!(f, "Analysis of {} response times", latency.count)?;
        writeln!(f, "{latency}")?;
        write!(f, "Per instance:")?;
        for (instance, stats) in &self.by_instance {
            match stats.std_dev {
                Some(std_dev) => write!(f, "\n{instance}: {:.2}ms (±{std_dev:.2}ms)", stats.mean)?,
                None => write!(f, "\n{instance}: {:.2}ms (single sample)", stats.mean)?,
            }
        }
        Ok(())
    }
}

/// Sequential `/ping` samples summarised overall and per answering instance.
#[instrument(name = "response_time_consistency", skip_all)]
pub async fn response_time_consistency(config: &HarnessConfig) -> ConsistencyReport {
    let requests = config.consistency.requests;
    let sampler = Sampler::with_timeout(config.consistency.timeout);

    info!("Collecting {requests} response times...");
    let batch = run_sequential(
        requests,
        PROGRESS_EVERY,
        sampler.target(config.target.endpoint("/ping")),
    )
    .await;

    for (i, sample) in batch.samples.iter().enumerate() {
        if let Some(err) = sample.error() {
            warn!("Sample {i} failed: {err}");
        }
    }

    ConsistencyReport {
        summary: Summary::from_samples(&batch.samples),
        by_instance: latency_by_instance(&batch.samples),
    }
}
