use crate::data::rate;
use crate::{Sample, UNKNOWN_INSTANCE};
use std::collections::BTreeMap;
use std::fmt;

/// How many successful responses each backend instance answered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceDistribution {
    counts: BTreeMap<String, usize>,
}

impl InstanceDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_samples(samples: &[Sample]) -> Self {
        let mut distribution = Self::new();
        for sample in samples.iter().filter(|s| s.is_success()) {
            distribution.record(Self::key(sample));
        }
        distribution
    }

    /// The identifier a sample is counted under.
    pub fn key(sample: &Sample) -> &str {
        sample.instance().unwrap_or(UNKNOWN_INSTANCE)
    }

    pub fn record(&mut self, instance: &str) {
        *self.counts.entry(instance.to_string()).or_insert(0) += 1;
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn count(&self, instance: &str) -> usize {
        self.counts.get(instance).copied().unwrap_or(0)
    }

    /// Percentage of all counted responses answered by `instance`.
    pub fn share(&self, instance: &str) -> f64 {
        rate(self.count(instance), self.total())
    }

    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// More than one instance served traffic.
    pub fn balanced(&self) -> bool {
        self.distinct() >= 2
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl fmt::Display for InstanceDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "no instance answered");
        }

        let mut first = true;
        for (instance, count) in self.iter() {
            if !first {
                writeln!(f)?;
            }
            first = false;
            write!(
                f,
                "{instance}: {count} responses ({:.1}%)",
                self.share(instance)
            )?;
        }
        Ok(())
    }
}
