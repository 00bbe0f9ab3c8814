use mock_service::{MockConfig, MockService};
use pingload_core::{HarnessConfig, TargetConfig};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::error;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[allow(unused)]
pub fn init() {
    static ONCE_LOCK: OnceLock<()> = OnceLock::new();

    ONCE_LOCK.get_or_init(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            default_panic(info);
            error!("Panic occurred: {info:?}");
        }));

        let _ = FmtSubscriber::builder()
            .with_env_filter(EnvFilter::new("pingload=debug,mock_service=debug"))
            .with_test_writer()
            .try_init();
    });
}

/// A mock balancer plus a harness config pointed at it, scaled down so suites finish
/// in well under a second.
#[allow(unused)]
pub async fn harness(mock: MockConfig) -> (MockService, HarnessConfig) {
    init();

    let service = MockService::spawn(mock).await.unwrap();
    let base_url = service.base_url();
    let target = TargetConfig::new(&base_url, &[base_url.as_str()]).unwrap();

    let mut config = HarnessConfig::new(target);
    config.warmup = Duration::ZERO;
    config.probe_timeout = Duration::from_secs(2);
    config.concurrent.workers = 10;
    config.concurrent.requests_per_worker = 10;
    config.stress.workers = 5;
    config.stress.requests_per_worker = 10;
    config.consistency.requests = 40;
    config.progressive.levels = vec![1, 2, 4];
    config.progressive.requests_per_worker = 5;
    config.progressive.cool_down = Duration::from_millis(10);
    config.failover.requests = 10;
    config.repeat.requests = 10;
    config.validate().unwrap();

    (service, config)
}
