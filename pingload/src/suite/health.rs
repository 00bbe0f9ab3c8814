use crate::sampler::{ProbeOutcome, Sampler};
use pingload_core::HarnessConfig;
use std::fmt;
use tracing::{instrument, warn};

#[derive(Debug, Clone)]
pub struct EndpointStatus {
    pub url: String,
    pub outcome: ProbeOutcome,
}

impl EndpointStatus {
    fn mark(&self) -> &'static str {
        if self.outcome.is_ok() {
            "[OK]"
        } else {
            "[FAIL]"
        }
    }
}

impl fmt::Display for EndpointStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.mark(), self.url, self.outcome)
    }
}

#[derive(Debug)]
pub struct HealthReport {
    pub endpoints: Vec<EndpointStatus>,
}

impl HealthReport {
    pub fn healthy(&self) -> bool {
        self.endpoints.iter().all(|e| e.outcome.is_ok())
    }
}

impl fmt::Display for HealthReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "=== HEALTH CHECK ===")?;
        for endpoint in &self.endpoints {
            write!(f, "\n{endpoint}")?;
        }
        Ok(())
    }
}

/// Probe the balancer root, the balancer `/ping`, and `/ping` on each instance directly.
#[instrument(name = "health", skip_all)]
pub async fn health_check(config: &HarnessConfig) -> HealthReport {
    let sampler = Sampler::with_timeout(config.probe_timeout);

    let mut urls = vec![config.target.endpoint("/"), config.target.endpoint("/ping")];
    urls.extend(config.target.instance_endpoints("/ping"));

    let mut endpoints = Vec::with_capacity(urls.len());
    for url in urls {
        let outcome = sampler.probe(&url).await;
        if !outcome.is_ok() {
            warn!("{url} is not healthy: {outcome}");
        }
        endpoints.push(EndpointStatus { url, outcome });
    }

    HealthReport { endpoints }
}
