use crate::constants::*;
use crate::ConfigError;
use std::time::Duration;
use url::Url;

/// Where requests go: the balancer's base URL plus any backend instances addressed directly.
#[derive(Clone, Debug)]
pub struct TargetConfig {
    base_url: Url,
    instance_urls: Vec<Url>,
}

impl TargetConfig {
    pub fn new<S: AsRef<str>>(base_url: &str, instance_urls: &[S]) -> Result<Self, ConfigError> {
        let base_url = parse_http_url(base_url)?;
        let instance_urls = instance_urls
            .iter()
            .map(|url| parse_http_url(url.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            base_url,
            instance_urls,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn instance_urls(&self) -> &[Url] {
        &self.instance_urls
    }

    /// `path` appended to the base URL, keeping any path prefix the base already has.
    pub fn endpoint(&self, path: &str) -> String {
        join(&self.base_url, path)
    }

    /// `path` on every directly-addressed instance.
    pub fn instance_endpoints(&self, path: &str) -> Vec<String> {
        self.instance_urls.iter().map(|url| join(url, path)).collect()
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        // NOTE: The defaults are constant and known-good.
        Self::new(DEFAULT_BASE_URL, &DEFAULT_INSTANCE_URLS).unwrap()
    }
}

fn join(base: &Url, path: &str) -> String {
    format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn parse_http_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|source| ConfigError::InvalidUrl {
        url: raw.to_string(),
        source,
    })?;

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ConfigError::UnsupportedUrl(raw.to_string()));
    }

    Ok(url)
}

/// A run of sequential requests issued by a single worker.
#[derive(Clone, Debug)]
pub struct SequentialConfig {
    pub requests: usize,
    pub timeout: Duration,
}

/// A fixed pool of workers, each issuing a run of sequential requests.
#[derive(Clone, Debug)]
pub struct BatchConfig {
    pub workers: usize,
    pub requests_per_worker: usize,
    pub timeout: Duration,
}

#[derive(Clone, Debug)]
pub struct ProgressiveConfig {
    pub levels: Vec<usize>,
    pub requests_per_worker: usize,
    pub timeout: Duration,
    pub cool_down: Duration,
}

/// Every knob of the harness. Threaded explicitly through each suite.
#[derive(Clone, Debug)]
pub struct HarnessConfig {
    pub target: TargetConfig,
    pub warmup: Duration,
    pub probe_timeout: Duration,
    pub balancer: SequentialConfig,
    pub concurrent: BatchConfig,
    pub stress: BatchConfig,
    pub consistency: SequentialConfig,
    pub progressive: ProgressiveConfig,
    pub failover: SequentialConfig,
    pub repeat: SequentialConfig,
}

impl HarnessConfig {
    pub fn new(target: TargetConfig) -> Self {
        Self {
            target,
            warmup: DEFAULT_WARMUP,
            probe_timeout: PROBE_TIMEOUT,
            balancer: SequentialConfig {
                requests: BALANCER_REQUESTS,
                timeout: BALANCER_TIMEOUT,
            },
            concurrent: BatchConfig {
                workers: CONCURRENT_WORKERS,
                requests_per_worker: CONCURRENT_REQUESTS_PER_WORKER,
                timeout: CONCURRENT_TIMEOUT,
            },
            stress: BatchConfig {
                workers: STRESS_WORKERS,
                requests_per_worker: STRESS_REQUESTS_PER_WORKER,
                timeout: STRESS_TIMEOUT,
            },
            consistency: SequentialConfig {
                requests: CONSISTENCY_REQUESTS,
                timeout: CONSISTENCY_TIMEOUT,
            },
            progressive: ProgressiveConfig {
                levels: DEFAULT_LOAD_LEVELS.to_vec(),
                requests_per_worker: PROGRESSIVE_REQUESTS_PER_WORKER,
                timeout: PROGRESSIVE_TIMEOUT,
                cool_down: DEFAULT_COOL_DOWN,
            },
            failover: SequentialConfig {
                requests: FAILOVER_REQUESTS,
                timeout: FAILOVER_TIMEOUT,
            },
            repeat: SequentialConfig {
                requests: REPEAT_REQUESTS,
                timeout: PROBE_TIMEOUT,
            },
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, config) in [
            ("Load balancer test", &self.balancer),
            ("Response time consistency test", &self.consistency),
            ("Failover test", &self.failover),
            ("Endpoint repetition test", &self.repeat),
        ] {
            if config.requests == 0 {
                return Err(ConfigError::ZeroRequests(name));
            }
        }

        for (name, config) in [
            ("Concurrency test", &self.concurrent),
            ("Stress test", &self.stress),
        ] {
            if config.workers == 0 {
                return Err(ConfigError::ZeroWorkers(name));
            }
            if config.requests_per_worker == 0 {
                return Err(ConfigError::ZeroRequests(name));
            }
        }

        if self.progressive.levels.is_empty() {
            return Err(ConfigError::NoLoadLevels);
        }
        if self.progressive.levels.contains(&0) {
            return Err(ConfigError::ZeroLoadLevel);
        }
        if self.progressive.requests_per_worker == 0 {
            return Err(ConfigError::ZeroRequests("Progressive load test"));
        }

        Ok(())
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self::new(TargetConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_keeps_base_path() {
        let target = TargetConfig::new("http://localhost/api/", &["http://localhost:8001"]).unwrap();
        assert_eq!(target.endpoint("/ping"), "http://localhost/api/ping");
        assert_eq!(
            target.instance_endpoints("ping"),
            vec!["http://localhost:8001/ping".to_string()]
        );
    }

    #[test]
    fn endpoint_on_bare_host() {
        let target = TargetConfig::new::<&str>("http://localhost", &[]).unwrap();
        assert_eq!(target.endpoint("/ping"), "http://localhost/ping");
        assert_eq!(target.endpoint("/"), "http://localhost/");
    }

    #[test]
    fn rejects_malformed_urls() {
        assert!(matches!(
            TargetConfig::new::<&str>("not a url", &[]),
            Err(ConfigError::InvalidUrl { .. })
        ));
        assert!(matches!(
            TargetConfig::new::<&str>("localhost:8000", &[]),
            Err(ConfigError::UnsupportedUrl(_))
        ));
        assert!(matches!(
            TargetConfig::new("http://localhost", &["ftp://localhost:8001"]),
            Err(ConfigError::UnsupportedUrl(_))
        ));
    }

    #[test]
    fn defaults_validate() {
        let config = HarnessConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.progressive.levels, vec![1, 5, 10, 20, 50, 100]);
        assert_eq!(config.progressive.cool_down, Duration::from_secs(2));
        assert_eq!(config.target.instance_urls().len(), 2);
    }

    #[test]
    fn rejects_empty_workloads() {
        let mut config = HarnessConfig::default();
        config.stress.workers = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroWorkers(_))));

        let mut config = HarnessConfig::default();
        config.progressive.levels.clear();
        assert!(matches!(config.validate(), Err(ConfigError::NoLoadLevels)));

        let mut config = HarnessConfig::default();
        config.progressive.levels = vec![1, 0, 5];
        assert!(matches!(config.validate(), Err(ConfigError::ZeroLoadLevel)));

        let mut config = HarnessConfig::default();
        config.balancer.requests = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroRequests(_))));
    }
}
