use crate::driver::run_sequential;
use crate::sampler::Sampler;
use pingload_core::{HarnessConfig, InstanceDistribution};
use std::fmt;
use tracing::{info, instrument};

#[derive(Debug)]
pub struct FailoverReport {
    pub requests: usize,
    pub distribution: InstanceDistribution,
}

impl FailoverReport {
    pub fn instances(&self) -> Vec<&str> {
        self.distribution.iter().map(|(instance, _)| instance).collect()
    }
}

impl fmt::Display for FailoverReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== FAILOVER ===")?;
        writeln!(f, "Active instances detected: {:?}", self.instances())?;
        if self.distribution.balanced() {
            write!(f, "Multiple instances are responding")
        } else {
            write!(
                f,
                "Only {} instance detected; stop one backend and re-run to check traffic is rerouted",
                self.distribution.distinct()
            )
        }
    }
}

/// Which instances answer a short burst of `/ping` requests. Run while a backend is down
/// to confirm the balancer routes around it.
#[instrument(name = "failover", skip_all)]
pub async fn failover(config: &HarnessConfig) -> FailoverReport {
    let requests = config.failover.requests;
    let sampler = Sampler::with_timeout(config.failover.timeout);

    info!("Checking which instances answer {requests} requests...");
    let batch = run_sequential(
        requests,
        0,
        sampler.target(config.target.endpoint("/ping")),
    )
    .await;

    FailoverReport {
        requests,
        distribution: InstanceDistribution::from_samples(&batch.samples),
    }
}
