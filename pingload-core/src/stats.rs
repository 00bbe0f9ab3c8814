use crate::data::rate;
use crate::distribution::InstanceDistribution;
use crate::Sample;
use std::collections::BTreeMap;
use std::fmt;

/// Latency summary over the successful samples of a run.
///
/// Only ever constructed from at least one successful sample; an empty or all-failed run
/// has no `LatencyStats` at all rather than zeroed fields.
#[derive(Debug, Clone, PartialEq)]
pub struct LatencyStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation. Needs at least two samples.
    pub std_dev: Option<f64>,
    pub min: f64,
    pub max: f64,
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
}

impl LatencyStats {
    pub fn from_samples(samples: &[Sample]) -> Option<Self> {
        Self::from_latencies(sorted_latencies(samples))
    }

    /// Latencies in milliseconds. Need not be sorted.
    pub fn from_latencies(mut latencies: Vec<f64>) -> Option<Self> {
        if latencies.is_empty() {
            return None;
        }
        latencies.sort_by(f64::total_cmp);

        let std_dev = if latencies.len() > 1 {
            Some(statistical::standard_deviation(&latencies, None))
        } else {
            None
        };

        Some(Self {
            count: latencies.len(),
            mean: statistical::mean(&latencies),
            median: statistical::median(&latencies),
            std_dev,
            min: latencies[0],
            max: latencies[latencies.len() - 1],
            p50: percentile(&latencies, 0.50)?,
            p95: percentile(&latencies, 0.95)?,
            p99: percentile(&latencies, 0.99)?,
        })
    }
}

impl fmt::Display for LatencyStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Mean: {:.2}ms", self.mean)?;
        writeln!(f, "Median: {:.2}ms", self.median)?;
        match self.std_dev {
            Some(std_dev) => writeln!(f, "Std Dev: {std_dev:.2}ms")?,
            None => writeln!(f, "Std Dev: n/a (single sample)")?,
        }
        writeln!(f, "Min: {:.2}ms", self.min)?;
        writeln!(f, "Max: {:.2}ms", self.max)?;
        writeln!(f, "95th Percentile: {:.2}ms", self.p95)?;
        write!(f, "99th Percentile: {:.2}ms", self.p99)
    }
}

/// Nearest-rank style lookup on an ascending slice: the element at zero-based index
/// `ceil(p * n)`, clamped to the last element. No interpolation.
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }

    let n = sorted.len();
    // NOTE: The epsilon keeps products like 0.95 * 100 from rounding up past an exact index.
    let idx = (p.clamp(0., 1.) * n as f64 - 1e-9).ceil().max(0.) as usize;
    Some(sorted[idx.min(n - 1)])
}

/// Successful latencies in ascending order.
pub fn sorted_latencies(samples: &[Sample]) -> Vec<f64> {
    let mut latencies: Vec<f64> = samples
        .iter()
        .filter(|s| s.is_success())
        .map(Sample::latency_ms)
        .collect();
    latencies.sort_by(f64::total_cmp);
    latencies
}

/// Everything the reporter derives from one run of samples.
#[derive(Debug, Clone)]
pub struct Summary {
    pub total: usize,
    pub successes: usize,
    pub failures: usize,
    pub latency: Option<LatencyStats>,
    pub distribution: InstanceDistribution,
    /// Failure description -> occurrences.
    pub errors: BTreeMap<String, usize>,
}

impl Summary {
    pub fn from_samples(samples: &[Sample]) -> Self {
        let successes = samples.iter().filter(|s| s.is_success()).count();

        let mut errors = BTreeMap::new();
        for error in samples.iter().filter_map(Sample::error) {
            *errors.entry(error.to_string()).or_insert(0) += 1;
        }

        Self {
            total: samples.len(),
            successes,
            failures: samples.len() - successes,
            latency: LatencyStats::from_samples(samples),
            distribution: InstanceDistribution::from_samples(samples),
            errors,
        }
    }

    pub fn success_rate(&self) -> f64 {
        rate(self.successes, self.total)
    }

    pub fn failure_rate(&self) -> f64 {
        rate(self.failures, self.total)
    }
}

/// Latency statistics per reporting instance, over successful samples.
pub fn latency_by_instance(samples: &[Sample]) -> BTreeMap<String, LatencyStats> {
    let mut grouped: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for sample in samples.iter().filter(|s| s.is_success()) {
        grouped
            .entry(InstanceDistribution::key(sample).to_string())
            .or_default()
            .push(sample.latency_ms());
    }

    grouped
        .into_iter()
        .filter_map(|(instance, latencies)| {
            LatencyStats::from_latencies(latencies).map(|stats| (instance, stats))
        })
        .collect()
}
