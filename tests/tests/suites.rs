mod utils;
#[allow(unused)]
use utils::*;

use mock_service::MockConfig;
use pingload::prelude::*;
use pingload::suite;
use std::time::{Duration, Instant};

#[tokio::test]
async fn balancer_tallies_instances() {
    let (_service, config) = harness(MockConfig::weighted(&[("A", 7), ("B", 3)])).await;

    let report = suite::load_balancer(&config).await;

    let distribution = &report.summary.distribution;
    assert_eq!(distribution.count("A"), 70);
    assert_eq!(distribution.count("B"), 30);
    assert_eq!(distribution.total(), 100);
    assert!(report.balanced());
    assert_eq!(report.summary.successes, 100);

    let rendered = report.to_string();
    assert!(rendered.contains("A: 70 responses (70.0%)"));
    assert!(rendered.contains("B: 30 responses (30.0%)"));
}

#[tokio::test]
async fn single_instance_is_not_balanced() {
    let (_service, config) = harness(MockConfig::new(&["solo"])).await;

    let report = suite::load_balancer(&config).await;

    assert_eq!(report.summary.distribution.count("solo"), 100);
    assert_eq!(report.summary.distribution.distinct(), 1);
    assert!(!report.balanced());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_workers_finish_together() {
    let (service, config) = harness(
        MockConfig::new(&["fastapi1", "fastapi2"]).delay(Duration::from_millis(10)),
    )
    .await;

    let start = Instant::now();
    let report = suite::concurrent_requests(&config).await;
    let elapsed = start.elapsed();

    assert_eq!(report.summary.total, 100);
    assert_eq!(report.summary.successes, 100);
    assert_eq!(service.hits(), 100);
    // 10 workers x 10 requests x 10ms each would take a full second if serialised
    assert!(elapsed < Duration::from_secs(2), "took {elapsed:?}");

    let latency = report.summary.latency.as_ref().unwrap();
    assert!(latency.min >= 10.0);
    assert!(latency.min <= latency.median && latency.median <= latency.max);
    assert_eq!(report.summary.distribution.count("fastapi1"), 50);
    assert_eq!(report.summary.distribution.count("fastapi2"), 50);
}

#[tokio::test]
async fn timeouts_leave_no_latency_stats() {
    let (_service, mut config) =
        harness(MockConfig::new(&["slow"]).delay(Duration::from_millis(300))).await;
    config.consistency.requests = 50;
    config.consistency.timeout = Duration::from_millis(20);

    let report = suite::response_time_consistency(&config).await;

    let summary = &report.summary;
    assert_eq!(summary.total, 50);
    assert_eq!(summary.successes, 0);
    assert_eq!(summary.failures, 50);
    assert_eq!(summary.success_rate(), 0.0);
    assert!(summary.latency.is_none());
    assert!(summary.distribution.is_empty());
    assert!(report.by_instance.is_empty());
    assert_eq!(summary.errors.len(), 1);
}

#[tokio::test]
async fn stress_reports_throughput() {
    let (_service, config) = harness(MockConfig::new(&["A", "B"])).await;

    let report = suite::stress(&config).await;

    assert_eq!(report.total, 50);
    assert_eq!(report.successes, 50);
    assert_eq!(report.failures, 0);
    assert!(report.rps > 0.0);
}

#[tokio::test]
async fn rate_limited_balancer_is_counted_as_failures() {
    let (_service, config) = harness(
        MockConfig::new(&["A"]).max_tps(std::num::NonZeroU32::new(5).unwrap()),
    )
    .await;

    let report = suite::concurrent_requests(&config).await;

    assert_eq!(report.summary.total, 100);
    assert!(report.summary.failures > 0);
    assert_eq!(
        report.summary.successes + report.summary.failures,
        report.summary.total
    );
    assert!(report
        .summary
        .errors
        .contains_key(&SampleError::HttpStatus(503).to_string()));
}

#[tokio::test]
async fn consistency_groups_by_instance() {
    let (_service, config) = harness(MockConfig::new(&["A", "B"])).await;

    let report = suite::response_time_consistency(&config).await;

    assert_eq!(report.summary.successes, 40);
    assert_eq!(report.by_instance.len(), 2);
    assert_eq!(report.by_instance["A"].count, 20);
    assert_eq!(report.by_instance["B"].count, 20);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn progressive_walks_every_level() {
    let (_service, config) = harness(MockConfig::new(&["A", "B"])).await;

    let report = suite::progressive_load(&config).await;

    let workers: Vec<usize> = report.levels.iter().map(|level| level.workers).collect();
    assert_eq!(workers, vec![1, 2, 4]);
    for level in &report.levels {
        assert_eq!(level.total, level.workers * 5);
        assert_eq!(level.success_rate(), 100.0);
        assert!(level.avg_latency_ms.is_some());
    }
}

#[tokio::test]
async fn progressive_marks_dead_levels() {
    init();
    // Nothing listens on a freshly released port
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let base_url = format!("http://127.0.0.1:{port}");
    let target = TargetConfig::new(&base_url, &[base_url.as_str()]).unwrap();
    let mut config = HarnessConfig::new(target);
    config.progressive.levels = vec![1, 2];
    config.progressive.requests_per_worker = 2;
    config.progressive.timeout = Duration::from_millis(200);
    config.progressive.cool_down = Duration::ZERO;

    let report = suite::progressive_load(&config).await;

    assert_eq!(report.levels.len(), 2);
    for level in &report.levels {
        assert_eq!(level.successes, 0);
        assert!(level.avg_latency_ms.is_none());
        assert!(level.p95_latency_ms.is_none());
    }
}

#[tokio::test]
async fn health_and_failover() {
    let (_service, config) = harness(MockConfig::new(&["A", "B"])).await;

    let health = suite::health_check(&config).await;
    assert_eq!(health.endpoints.len(), 3);
    assert!(health.healthy());

    let failover = suite::failover(&config).await;
    assert_eq!(failover.requests, 10);
    assert_eq!(failover.instances(), vec!["A", "B"]);
}

#[tokio::test]
async fn smoke_and_repeat() {
    let (_service, config) = harness(MockConfig::new(&["A"])).await;

    let smoke = suite::smoke(&config).await;
    let statuses: Vec<Option<u16>> = smoke.endpoints.iter().map(|e| e.outcome.status()).collect();
    assert_eq!(statuses, vec![Some(200), Some(200), Some(404), Some(404)]);
    assert!(smoke.to_string().contains("/users: 200 - [{"));

    let repeat = suite::endpoint_repeat(&config).await;
    assert_eq!(repeat.endpoints.len(), 2);
    for result in &repeat.endpoints {
        assert_eq!(result.requests, 10);
        assert_eq!(result.successes, 10);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn run_all_renders_every_section() {
    let (_service, config) = harness(MockConfig::new(&["A", "B"])).await;

    let report = suite::run_all(&config).await;

    assert!(report.health.healthy());
    assert!(report.balancer.balanced());
    assert_eq!(report.progressive.levels.len(), 3);

    let rendered = report.to_string();
    for header in ["CRUD ENDPOINTS", "ENDPOINT REPETITION"] {
        assert!(rendered.contains(header), "missing {header}");
    }
}
