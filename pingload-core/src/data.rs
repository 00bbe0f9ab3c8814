use crate::stats::{percentile, sorted_latencies};
use crate::SampleError;
use std::fmt;
use std::time::Duration;

/// One observed request outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    latency_ms: f64,
    instance: Option<String>,
    error: Option<SampleError>,
}

impl Sample {
    pub fn success(latency: Duration, instance: Option<String>) -> Self {
        Self {
            latency_ms: latency.as_secs_f64() * 1e3,
            instance,
            error: None,
        }
    }

    pub fn failure(latency: Duration, error: SampleError) -> Self {
        Self {
            latency_ms: latency.as_secs_f64() * 1e3,
            instance: None,
            error: Some(error),
        }
    }

    /// Wall-clock time of the request in milliseconds. Recorded for failures too, but
    /// only successful latencies feed the statistics.
    pub fn latency_ms(&self) -> f64 {
        self.latency_ms
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn instance(&self) -> Option<&str> {
        self.instance.as_deref()
    }

    pub fn error(&self) -> Option<&SampleError> {
        self.error.as_ref()
    }
}

/// Every sample produced by one driver batch, plus how long the whole batch took.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    pub samples: Vec<Sample>,
    pub elapsed: Duration,
}

impl Batch {
    pub fn total(&self) -> usize {
        self.samples.len()
    }

    pub fn success_count(&self) -> usize {
        self.samples.iter().filter(|s| s.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.total() - self.success_count()
    }

    /// Requests per second across the whole batch, `0.0` when nothing was timed.
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0. {
            self.total() as f64 / secs
        } else {
            0.
        }
    }
}

/// Aggregate over one load level of a progressive run.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadLevelResult {
    pub workers: usize,
    pub total: usize,
    pub successes: usize,
    pub failures: usize,
    pub duration: Duration,
    pub throughput: f64,
    pub avg_latency_ms: Option<f64>,
    pub p95_latency_ms: Option<f64>,
}

impl LoadLevelResult {
    pub fn from_batch(workers: usize, batch: &Batch) -> Self {
        let latencies = sorted_latencies(&batch.samples);
        let avg_latency_ms = if latencies.is_empty() {
            None
        } else {
            Some(latencies.iter().sum::<f64>() / latencies.len() as f64)
        };

        Self {
            workers,
            total: batch.total(),
            successes: batch.success_count(),
            failures: batch.failure_count(),
            duration: batch.elapsed,
            throughput: batch.throughput(),
            avg_latency_ms,
            p95_latency_ms: percentile(&latencies, 0.95),
        }
    }

    /// Percentage of successful requests, `0.0` for an empty level.
    pub fn success_rate(&self) -> f64 {
        rate(self.successes, self.total)
    }
}

impl fmt::Display for LoadLevelResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} users: {:.1} RPS, {:.1}% success, ",
            self.workers,
            self.throughput,
            self.success_rate()
        )?;
        match self.avg_latency_ms {
            Some(avg) => write!(f, "{avg:.1}ms avg"),
            None => write!(f, "no successful samples"),
        }
    }
}

/// `part` as a percentage of `whole`, guarded against an empty whole.
pub fn rate(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.
    } else {
        part as f64 / whole as f64 * 100.
    }
}
