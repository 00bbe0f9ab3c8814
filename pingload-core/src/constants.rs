use std::time::Duration;

/// Base URL of the load balancer when none is supplied.
pub const DEFAULT_BASE_URL: &str = "http://localhost";

/// Backend instances reachable without going through the balancer.
pub const DEFAULT_INSTANCE_URLS: [&str; 2] = ["http://localhost:8001", "http://localhost:8002"];

/// Identifier recorded when a `/ping` response carries neither `host` nor `instance`.
pub const UNKNOWN_INSTANCE: &str = "unknown";

/// Load levels (concurrent workers) stepped through by the progressive load test.
pub const DEFAULT_LOAD_LEVELS: [usize; 6] = [1, 5, 10, 20, 50, 100];

/// Pause between progressive load levels so one phase's queueing does not bleed into the
/// next.
pub const DEFAULT_COOL_DOWN: Duration = Duration::from_secs(2);

/// Pause before the full suite starts, giving freshly started services time to come up.
pub const DEFAULT_WARMUP: Duration = Duration::from_secs(5);

pub const BALANCER_REQUESTS: usize = 100;
pub const BALANCER_TIMEOUT: Duration = Duration::from_secs(5);

pub const CONCURRENT_WORKERS: usize = 20;
pub const CONCURRENT_REQUESTS_PER_WORKER: usize = 10;
pub const CONCURRENT_TIMEOUT: Duration = Duration::from_secs(5);

pub const STRESS_WORKERS: usize = 10;
pub const STRESS_REQUESTS_PER_WORKER: usize = 50;
pub const STRESS_TIMEOUT: Duration = Duration::from_secs(2);

pub const CONSISTENCY_REQUESTS: usize = 200;
pub const CONSISTENCY_TIMEOUT: Duration = Duration::from_secs(5);

pub const PROGRESSIVE_REQUESTS_PER_WORKER: usize = 10;
pub const PROGRESSIVE_TIMEOUT: Duration = Duration::from_secs(10);

pub const FAILOVER_REQUESTS: usize = 50;
pub const FAILOVER_TIMEOUT: Duration = Duration::from_secs(2);

pub const REPEAT_REQUESTS: usize = 100;

/// Timeout for one-off probes (health check, smoke endpoints, endpoint repetition).
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Number of body characters shown for smoke probe responses.
pub const SMOKE_BODY_PREVIEW: usize = 100;

/// CRUD endpoints touched by the smoke probe.
pub const SMOKE_ENDPOINTS: [&str; 4] = ["/users", "/transactions", "/api/users", "/api/transactions"];
