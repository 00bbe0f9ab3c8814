use crate::driver::run_sequential;
use crate::sampler::Sampler;
use pingload_core::{HarnessConfig, Summary};
use std::fmt;
use tracing::{info, instrument, warn};

const PROGRESS_EVERY: usize = 20;

#[derive(Debug)]
pub struct BalancerReport {
    pub summary: Summary,
}

impl BalancerReport {
    pub fn balanced(&self) -> bool {
        self.summary.distribution.balanced()
    }
}

impl fmt::Display for BalancerReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== LOAD BALANCER ===")?;
        writeln!(
            f,
            "{} of {} requests answered",
            self.summary.successes, self.summary.total
        )?;
        writeln!(f, "{}", self.summary.distribution)?;
        if self.balanced() {
            write!(f, "Load balancer is distributing requests")
        } else {
            write!(f, "Load balancer is NOT distributing requests")
        }
    }
}

/// Sequential `/ping` requests through the balancer, tallied by answering instance.
#[instrument(name = "load_balancer", skip_all)]
pub async fn load_balancer(config: &HarnessConfig) -> BalancerReport {
    let requests = config.balancer.requests;
    let sampler = Sampler::with_timeout(config.balancer.timeout);

    info!("Sending {requests} requests to /ping via the balancer...");
    let batch = run_sequential(
        requests,
        PROGRESS_EVERY,
        sampler.target(config.target.endpoint("/ping")),
    )
    .await;

    for (i, sample) in batch.samples.iter().enumerate() {
        if let Some(err) = sample.error() {
            warn!("Request {i} failed: {err}");
        }
    }

    BalancerReport {
        summary: Summary::from_samples(&batch.samples),
    }
}
