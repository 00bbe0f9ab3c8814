use crate::driver::run_progressive;
use crate::sampler::Sampler;
use pingload_core::{HarnessConfig, LoadLevelResult};
use std::fmt;
use tracing::{info, instrument};

#[derive(Debug)]
pub struct ProgressiveReport {
    pub levels: Vec<LoadLevelResult>,
}

impl fmt::Display for ProgressiveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== PROGRESSIVE LOAD ===")?;
        writeln!(
            f,
            "{:<8} {:<8} {:<10} {:<12} {:<12}",
            "Users", "RPS", "Success%", "AvgTime(ms)", "P95Time(ms)"
        )?;
        write!(f, "{}", "-".repeat(50))?;

        for level in &self.levels {
            if level.total == 0 {
                write!(
                    f,
                    "\n{:<8} {:<8} {:<10} {:<12} {:<12}",
                    level.workers, "FAILED", "-", "-", "-"
                )?;
                continue;
            }

            write!(
                f,
                "\n{:<8} {:<8.1} {:<10.1} {:<12} {:<12}",
                level.workers,
                level.throughput,
                level.success_rate(),
                ms_or_dash(level.avg_latency_ms),
                ms_or_dash(level.p95_latency_ms),
            )?;
        }
        Ok(())
    }
}

fn ms_or_dash(ms: Option<f64>) -> String {
    ms.map_or_else(|| "-".to_string(), |ms| format!("{ms:.1}"))
}

/// `/ping` batches at each configured load level, cooling down between levels.
#[instrument(name = "progressive_load", skip_all)]
pub async fn progressive_load(config: &HarnessConfig) -> ProgressiveReport {
    let sampler = Sampler::with_timeout(config.progressive.timeout);
    info!(
        "Stepping through load levels {:?} with {} requests per worker",
        config.progressive.levels, config.progressive.requests_per_worker
    );

    let levels = run_progressive(
        &config.progressive,
        sampler.target(config.target.endpoint("/ping")),
    )
    .await;

    ProgressiveReport { levels }
}
