//! Single-request sampling
use pingload_core::{Sample, SampleError};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

pub type SampleFuture = Pin<Box<dyn Future<Output = Sample> + Send>>;

/// Issues single GET requests and turns every outcome, good or bad, into a [`Sample`].
#[derive(Clone, Debug)]
pub struct Sampler {
    client: Client,
    timeout: Duration,
}

impl Sampler {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new(Client::new(), timeout)
    }

    /// GET `url` and record latency plus the instance named in the `/ping` body.
    ///
    /// Never fails: network errors, timeouts and non-200 statuses come back as failed
    /// samples. A 200 whose body is not JSON still counts, with the instance unknown.
    pub async fn sample(&self, url: &str) -> Sample {
        let start = Instant::now();
        let res = self.client.get(url).timeout(self.timeout).send().await;

        let sample = match res {
            Ok(response) if response.status() == StatusCode::OK => {
                let body = response.bytes().await;
                let latency = start.elapsed();
                match body {
                    Ok(body) => match serde_json::from_slice::<Value>(&body) {
                        Ok(json) => Sample::success(latency, instance_id(&json)),
                        Err(err) => {
                            debug!("GET {url} returned a non-JSON body: {err}");
                            Sample::success(latency, None)
                        }
                    },
                    Err(err) => Sample::failure(latency, self.network_error(err)),
                }
            }
            Ok(response) => Sample::failure(
                start.elapsed(),
                SampleError::HttpStatus(response.status().as_u16()),
            ),
            Err(err) => Sample::failure(start.elapsed(), self.network_error(err)),
        };

        match sample.error() {
            Some(err) => debug!("GET {url} failed: {err}"),
            None => trace!(
                "GET {url} -> {} in {:.2}ms",
                sample.instance().unwrap_or(pingload_core::UNKNOWN_INSTANCE),
                sample.latency_ms()
            ),
        }

        #[cfg(feature = "metrics")]
        record_metrics(&sample);

        sample
    }

    /// A cloneable closure sampling `url`, ready to hand to the driver.
    pub fn target(
        &self,
        url: impl Into<String>,
    ) -> impl Fn() -> SampleFuture + Clone + Send + Sync + 'static {
        let sampler = self.clone();
        let url: Arc<str> = Arc::from(url.into());
        move || {
            let sampler = sampler.clone();
            let url = url.clone();
            Box::pin(async move { sampler.sample(&url).await })
        }
    }

    /// GET `url` and keep the raw status and body. Used for health and smoke checks where
    /// any status is informative.
    pub async fn probe(&self, url: &str) -> ProbeOutcome {
        let start = Instant::now();
        let res = self.client.get(url).timeout(self.timeout).send().await;

        match res {
            Ok(response) => {
                let status = response.status().as_u16();
                match response.text().await {
                    Ok(body) => ProbeOutcome::Response {
                        status,
                        body,
                        latency: start.elapsed(),
                    },
                    Err(err) => ProbeOutcome::Failed(self.network_error(err)),
                }
            }
            Err(err) => ProbeOutcome::Failed(self.network_error(err)),
        }
    }

    fn network_error(&self, err: reqwest::Error) -> SampleError {
        if err.is_timeout() {
            SampleError::timeout(self.timeout)
        } else {
            SampleError::Network(err.to_string())
        }
    }
}

/// `host`, falling back to `instance`. A key that is present wins even if it is not a
/// string, in which case its JSON text is used.
fn instance_id(json: &Value) -> Option<String> {
    let value = json.get("host").or_else(|| json.get("instance"))?;
    match value {
        Value::String(id) => Some(id.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(feature = "metrics")]
fn record_metrics(sample: &Sample) {
    metrics::histogram!("pingload.latency").record(sample.latency_ms());
    if sample.is_success() {
        metrics::counter!("pingload.success").increment(1);
    } else {
        metrics::counter!("pingload.error").increment(1);
    }
}

/// Raw outcome of a probe request.
#[derive(Debug, Clone)]
pub enum ProbeOutcome {
    Response {
        status: u16,
        body: String,
        latency: Duration,
    },
    Failed(SampleError),
}

impl ProbeOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, ProbeOutcome::Response { status: 200, .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ProbeOutcome::Response { status, .. } => Some(*status),
            ProbeOutcome::Failed(_) => None,
        }
    }

    /// Body cut down to at most `max_chars` characters.
    pub fn preview(&self, max_chars: usize) -> Option<&str> {
        match self {
            ProbeOutcome::Response { body, .. } => Some(
                body.char_indices()
                    .nth(max_chars)
                    .map_or(body.as_str(), |(idx, _)| &body[..idx]),
            ),
            ProbeOutcome::Failed(_) => None,
        }
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeOutcome::Response {
                status: 200,
                body,
                latency,
            } => write!(f, "OK ({:.2}ms) - {body}", latency.as_secs_f64() * 1000.),
            ProbeOutcome::Response { status, .. } => write!(f, "HTTP {status}"),
            ProbeOutcome::Failed(err) => write!(f, "Error - {err}"),
        }
    }
}
