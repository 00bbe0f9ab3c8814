use clap::Parser;
use pingload::suite;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod cli;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pingload=info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = cli.harness_config()?;
    info!("Target: {}", config.target.base_url());

    match cli.command {
        Command::Health => println!("{}", suite::health_check(&config).await),
        Command::Balance(_) => println!("{}", suite::load_balancer(&config).await),
        Command::Concurrent(_) => println!("{}", suite::concurrent_requests(&config).await),
        Command::Stress(_) => println!("{}", suite::stress(&config).await),
        Command::Consistency(_) => {
            println!("{}", suite::response_time_consistency(&config).await)
        }
        Command::Progressive(_) => println!("{}", suite::progressive_load(&config).await),
        Command::Failover(_) => println!("{}", suite::failover(&config).await),
        Command::Smoke => println!("{}", suite::smoke(&config).await),
        Command::Repeat(_) => println!("{}", suite::endpoint_repeat(&config).await),
        Command::All(_) => println!("{}", suite::run_all(&config).await),
    }

    Ok(())
}
