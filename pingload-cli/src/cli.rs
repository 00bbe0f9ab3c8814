use clap::{Args, Parser, Subcommand};
use pingload_core::{
    BatchConfig, HarnessConfig, SequentialConfig, TargetConfig, DEFAULT_BASE_URL,
    DEFAULT_INSTANCE_URLS,
};
use std::time::Duration;

/// Load balancer distribution and load checks against a `/ping` endpoint.
#[derive(Parser, Debug)]
#[command(name = "pingload", version, about)]
pub(crate) struct Cli {
    /// Base URL of the load balancer
    #[arg(short, long, global = true, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Backend instance addressed directly by the health check (repeatable).
    /// Defaults to http://localhost:8001 and http://localhost:8002.
    #[arg(short = 'i', long = "instance", global = true)]
    pub instances: Vec<String>,

    /// Timeout for one-off probes (health check, CRUD endpoints)
    #[arg(long, global = true, value_parser = humantime::parse_duration)]
    pub probe_timeout: Option<Duration>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Probe `/` and `/ping` on the balancer and `/ping` on each instance
    Health,

    /// Sequential `/ping` requests, tallied by answering instance
    Balance(SequentialArgs),

    /// Concurrent workers with latency, distribution and error breakdown
    Concurrent(BatchArgs),

    /// Concurrent workers with a short timeout, reporting throughput
    Stress(BatchArgs),

    /// Sequential samples summarised overall and per instance
    Consistency(SequentialArgs),

    /// Batches at increasing load levels with a cool-down between levels
    Progressive(ProgressiveArgs),

    /// Which instances answer a short burst of requests
    Failover(SequentialArgs),

    /// GET the CRUD endpoints and show what comes back
    Smoke,

    /// Repeated requests to `/` and `/ping`
    Repeat(SequentialArgs),

    /// Every suite in sequence
    All(AllArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct SequentialArgs {
    /// Number of requests
    #[arg(short = 'n', long)]
    pub requests: Option<usize>,

    /// Per-request timeout, e.g. `5s` or `500ms`
    #[arg(short, long, value_parser = humantime::parse_duration)]
    pub timeout: Option<Duration>,
}

impl SequentialArgs {
    fn apply(&self, config: &mut SequentialConfig) {
        if let Some(requests) = self.requests {
            config.requests = requests;
        }
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
    }
}

#[derive(Args, Debug, Default)]
pub(crate) struct BatchArgs {
    /// Number of concurrent workers
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Sequential requests issued by each worker
    #[arg(short = 'n', long)]
    pub requests: Option<usize>,

    /// Per-request timeout, e.g. `5s` or `500ms`
    #[arg(short, long, value_parser = humantime::parse_duration)]
    pub timeout: Option<Duration>,
}

impl BatchArgs {
    fn apply(&self, config: &mut BatchConfig) {
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(requests) = self.requests {
            config.requests_per_worker = requests;
        }
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
    }
}

#[derive(Args, Debug, Default)]
pub(crate) struct ProgressiveArgs {
    /// Comma separated worker counts, e.g. `1,5,10,20,50,100`
    #[arg(short, long, value_delimiter = ',')]
    pub levels: Option<Vec<usize>>,

    /// Sequential requests issued by each worker
    #[arg(short = 'n', long)]
    pub requests: Option<usize>,

    /// Per-request timeout
    #[arg(short, long, value_parser = humantime::parse_duration)]
    pub timeout: Option<Duration>,

    /// Pause between load levels
    #[arg(short, long, value_parser = humantime::parse_duration)]
    pub cool_down: Option<Duration>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct AllArgs {
    /// Pause before the first suite so freshly started services can come up
    #[arg(long, value_parser = humantime::parse_duration)]
    pub warmup: Option<Duration>,
}

impl Cli {
    /// Resolve the flags into a validated harness configuration. Fails before any request
    /// is sent if a URL or workload is malformed.
    pub fn harness_config(&self) -> anyhow::Result<HarnessConfig> {
        let target = if self.instances.is_empty() {
            TargetConfig::new(&self.base_url, &DEFAULT_INSTANCE_URLS)?
        } else {
            TargetConfig::new(&self.base_url, &self.instances)?
        };

        let mut config = HarnessConfig::new(target);
        if let Some(timeout) = self.probe_timeout {
            config.probe_timeout = timeout;
        }

        match &self.command {
            Command::Health | Command::Smoke => {}
            Command::Balance(args) => args.apply(&mut config.balancer),
            Command::Concurrent(args) => args.apply(&mut config.concurrent),
            Command::Stress(args) => args.apply(&mut config.stress),
            Command::Consistency(args) => args.apply(&mut config.consistency),
            Command::Failover(args) => args.apply(&mut config.failover),
            Command::Repeat(args) => args.apply(&mut config.repeat),
            Command::Progressive(args) => {
                let progressive = &mut config.progressive;
                if let Some(levels) = &args.levels {
                    progressive.levels = levels.clone();
                }
                if let Some(requests) = args.requests {
                    progressive.requests_per_worker = requests;
                }
                if let Some(timeout) = args.timeout {
                    progressive.timeout = timeout;
                }
                if let Some(cool_down) = args.cool_down {
                    progressive.cool_down = cool_down;
                }
            }
            Command::All(args) => {
                if let Some(warmup) = args.warmup {
                    config.warmup = warmup;
                }
            }
        }

        config.validate()?;
        Ok(config)
    }
}
