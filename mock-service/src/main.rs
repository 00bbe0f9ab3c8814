use mock_service::MockConfig;
use std::net::SocketAddr;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const DEFAULT_PORT: u16 = 8000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mock_service=info,tower_http=warn")),
        )
        .init();

    // `INSTANCE_NAME=fastapi1,fastapi2` makes one process answer as a round-robin balancer.
    let names = std::env::var("INSTANCE_NAME").unwrap_or_else(|_| "unknown".to_string());
    let names: Vec<&str> = names.split(',').map(str::trim).collect();

    let port = match std::env::var("PORT") {
        Ok(port) => port.parse()?,
        Err(_) => DEFAULT_PORT,
    };

    let mut config = MockConfig::new(&names);
    if let Ok(delay_ms) = std::env::var("DELAY_MS") {
        config = config.delay(Duration::from_millis(delay_ms.parse()?));
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    mock_service::run(addr, config).await
}
