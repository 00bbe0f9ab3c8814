//! Checks run against a live balancer
//!
//! Each suite takes the shared [`HarnessConfig`], logs progress through `tracing` and
//! returns a report that renders with `Display`.
mod balancer;
mod concurrency;
mod consistency;
mod failover;
mod health;
mod progressive;
mod smoke;

pub use balancer::{load_balancer, BalancerReport};
pub use concurrency::{concurrent_requests, stress, ConcurrencyReport, StressReport};
pub use consistency::{response_time_consistency, ConsistencyReport};
pub use failover::{failover, FailoverReport};
pub use health::{health_check, EndpointStatus, HealthReport};
pub use progressive::{progressive_load, ProgressiveReport};
pub use smoke::{endpoint_repeat, smoke, RepeatReport, RepeatResult, SmokeReport};

use pingload_core::HarnessConfig;
use std::fmt;
#[allow(unused)]
use tracing::{debug, error, info, instrument, trace, warn};

/// Reports from every suite, in the order they ran.
#[derive(Debug)]
pub struct SuiteReport {
    pub health: HealthReport,
    pub balancer: BalancerReport,
    pub concurrent: ConcurrencyReport,
    pub stress: StressReport,
    pub consistency: ConsistencyReport,
    pub progressive: ProgressiveReport,
    pub failover: FailoverReport,
    pub smoke: SmokeReport,
    pub repeat: RepeatReport,
}

impl fmt::Display for SuiteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}\n", self.health)?;
        writeln!(f, "{}\n", self.balancer)?;
        writeln!(f, "{}\n", self.concurrent)?;
        writeln!(f, "{}\n", self.stress)?;
        writeln!(f, "{}\n", self.consistency)?;
        writeln!(f, "{}\n", self.progressive)?;
        writeln!(f, "{}\n", self.failover)?;
        writeln!(f, "{}\n", self.smoke)?;
        write!(f, "{}", self.repeat)
    }
}

/// Every suite in sequence, after the configured warm-up pause.
#[instrument(name = "suite", skip_all, fields(target = %config.target.base_url()))]
pub async fn run_all(config: &HarnessConfig) -> SuiteReport {
    if !config.warmup.is_zero() {
        info!(
            "Waiting {} for services to come up...",
            humantime::format_duration(config.warmup)
        );
        tokio::time::sleep(config.warmup).await;
    }

    let report = SuiteReport {
        health: health_check(config).await,
        balancer: load_balancer(config).await,
        concurrent: concurrent_requests(config).await,
        stress: stress(config).await,
        consistency: response_time_consistency(config).await,
        progressive: progressive_load(config).await,
        failover: failover(config).await,
        smoke: smoke(config).await,
        repeat: endpoint_repeat(config).await,
    };

    info!("Suite complete");
    report
}
