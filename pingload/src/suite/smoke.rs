use super::health::EndpointStatus;
use crate::sampler::{ProbeOutcome, Sampler};
use pingload_core::{HarnessConfig, SMOKE_BODY_PREVIEW, SMOKE_ENDPOINTS};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{info, instrument};

#[derive(Debug)]
pub struct SmokeReport {
    pub endpoints: Vec<EndpointStatus>,
}

impl fmt::Display for SmokeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "=== CRUD ENDPOINTS ===")?;
        for endpoint in &self.endpoints {
            match &endpoint.outcome {
                ProbeOutcome::Response { status, .. } => write!(
                    f,
                    "\n{}: {} - {}...",
                    endpoint.url,
                    status,
                    endpoint.outcome.preview(SMOKE_BODY_PREVIEW).unwrap_or_default()
                )?,
                ProbeOutcome::Failed(err) => {
                    let err = err.to_string();
                    let shown: String = err.chars().take(SMOKE_BODY_PREVIEW).collect();
                    write!(f, "\n{}: {shown}", endpoint.url)?
                }
            }
        }
        Ok(())
    }
}

/// GET each CRUD collection endpoint and record whatever comes back.
#[instrument(name = "smoke", skip_all)]
pub async fn smoke(config: &HarnessConfig) -> SmokeReport {
    let sampler = Sampler::with_timeout(config.probe_timeout);

    let mut endpoints = Vec::with_capacity(SMOKE_ENDPOINTS.len());
    for path in SMOKE_ENDPOINTS {
        let url = config.target.endpoint(path);
        let outcome = sampler.probe(&url).await;
        endpoints.push(EndpointStatus { url, outcome });
    }

    SmokeReport { endpoints }
}

#[derive(Debug, Clone)]
pub struct RepeatResult {
    pub path: String,
    pub requests: usize,
    pub successes: usize,
    pub elapsed: Duration,
}

impl fmt::Display for RepeatResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}/{} successes in {:.2}s",
            self.path,
            self.successes,
            self.requests,
            self.elapsed.as_secs_f64()
        )
    }
}

#[derive(Debug)]
pub struct RepeatReport {
    pub endpoints: Vec<RepeatResult>,
}

impl fmt::Display for RepeatReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "=== ENDPOINT REPETITION ===")?;
        for result in &self.endpoints {
            write!(f, "\n{result}")?;
        }
        Ok(())
    }
}

/// Hammer `/` and `/ping` sequentially, counting 200 responses.
#[instrument(name = "endpoint_repeat", skip_all)]
pub async fn endpoint_repeat(config: &HarnessConfig) -> RepeatReport {
    let sampler = Sampler::with_timeout(config.repeat.timeout);
    let requests = config.repeat.requests;

    let mut endpoints = vec![];
    for path in ["/", "/ping"] {
        info!("Requesting {path} {requests} times...");
        let url = config.target.endpoint(path);

        let start = Instant::now();
        let mut successes = 0;
        for _ in 0..requests {
            if sampler.probe(&url).await.is_ok() {
                successes += 1;
            }
        }

        endpoints.push(RepeatResult {
            path: path.to_string(),
            requests,
            successes,
            elapsed: start.elapsed(),
        });
    }

    RepeatReport { endpoints }
}
