use axum::{
    debug_handler,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde::Serialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::{
    num::NonZeroU32,
    sync::{
        atomic::{AtomicU64, AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

/// How the mock answers. One server can stand in for a balancer over several instances
/// by cycling through `rotation`.
#[derive(Clone, Debug)]
pub struct MockConfig {
    pub rotation: Vec<String>,
    pub delay: Duration,
    pub max_tps: Option<NonZeroU32>,
}

impl MockConfig {
    /// Round-robin over `instances`.
    pub fn new<S: AsRef<str>>(instances: &[S]) -> Self {
        Self {
            rotation: instances.iter().map(|s| s.as_ref().to_string()).collect(),
            delay: Duration::ZERO,
            max_tps: None,
        }
    }

    /// Each instance answers `weight` consecutive requests before the next takes over.
    pub fn weighted(instances: &[(&str, usize)]) -> Self {
        let rotation = instances
            .iter()
            .flat_map(|(name, weight)| std::iter::repeat(name.to_string()).take(*weight))
            .collect::<Vec<_>>();
        Self::new(&rotation)
    }

    /// Artificial latency applied to every `/ping` variant.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Answer `503` on `/ping` once this rate is exceeded.
    pub fn max_tps(mut self, max_tps: NonZeroU32) -> Self {
        self.max_tps = Some(max_tps);
        self
    }
}

struct MockState {
    rotation: Vec<String>,
    next: AtomicUsize,
    hits: AtomicU64,
    delay: Duration,
    limiter: Option<DefaultDirectRateLimiter>,
}

impl MockState {
    fn new(config: MockConfig) -> Self {
        Self {
            rotation: config.rotation,
            next: AtomicUsize::new(0),
            hits: AtomicU64::new(0),
            delay: config.delay,
            limiter: config.max_tps.map(rate_limiter),
        }
    }

    fn next_instance(&self) -> &str {
        if self.rotation.is_empty() {
            return "unknown";
        }
        let idx = self.next.fetch_add(1, Ordering::Relaxed);
        &self.rotation[idx % self.rotation.len()]
    }
}

fn router_with_state(state: Arc<MockState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/ping", get(ping))
        .route("/ping/instance-only", get(ping_instance_only))
        .route("/ping/anonymous", get(ping_anonymous))
        .route("/delay/ms/:delay_ms", get(delay))
        .route("/status/:code", get(status))
        .route("/plain", get(plain))
        .route("/users", get(users))
        .route("/transactions", get(transactions))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn run(addr: SocketAddr, config: MockConfig) -> anyhow::Result<()> {
    let state = Arc::new(MockState::new(config));
    tokio::spawn(tps_measure_task(state.clone()));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Mock service listening on {}", listener.local_addr()?);
    axum::serve(listener, router_with_state(state)).await?;
    Ok(())
}

/// A mock bound to an ephemeral local port, shut down on drop.
pub struct MockService {
    addr: SocketAddr,
    state: Arc<MockState>,
    server: JoinHandle<()>,
}

impl MockService {
    pub async fn spawn(config: MockConfig) -> anyhow::Result<Self> {
        let state = Arc::new(MockState::new(config));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let app = router_with_state(state.clone());
        let server = tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app).await {
                tracing::error!("Mock service stopped: {err}");
            }
        });

        debug!("Mock service spawned on {addr}");
        Ok(Self {
            addr,
            state,
            server,
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}/{}", self.addr, path.trim_start_matches('/'))
    }

    /// Requests served so far, any route.
    pub fn hits(&self) -> u64 {
        self.state.hits.load(Ordering::Relaxed)
    }
}

impl Drop for MockService {
    fn drop(&mut self) {
        self.server.abort();
    }
}

#[derive(Serialize)]
struct PingBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    instance: Option<String>,
}

enum Shape {
    Full,
    InstanceOnly,
    Anonymous,
}

async fn answer(
    state: &MockState,
    shape: Shape,
    delay: Duration,
) -> Result<Json<PingBody>, StatusCode> {
    state.hits.fetch_add(1, Ordering::Relaxed);
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    if let Some(limiter) = &state.limiter {
        if limiter.check().is_err() {
            debug!("Mock service over its TPS limit");
            return Err(StatusCode::SERVICE_UNAVAILABLE);
        }
    }

    let name = state.next_instance().to_string();
    let message = format!("pong from {name}");
    let body = match shape {
        Shape::Full => PingBody {
            message,
            host: Some(name.clone()),
            instance: Some(name),
        },
        Shape::InstanceOnly => PingBody {
            message,
            host: None,
            instance: Some(name),
        },
        Shape::Anonymous => PingBody {
            message,
            host: None,
            instance: None,
        },
    };
    Ok(Json(body))
}

#[debug_handler]
async fn root(State(state): State<Arc<MockState>>) -> Json<Value> {
    state.hits.fetch_add(1, Ordering::Relaxed);
    Json(json!({ "message": "working" }))
}

async fn ping(State(state): State<Arc<MockState>>) -> Result<Json<PingBody>, StatusCode> {
    answer(&state, Shape::Full, state.delay).await
}

async fn ping_instance_only(
    State(state): State<Arc<MockState>>,
) -> Result<Json<PingBody>, StatusCode> {
    answer(&state, Shape::InstanceOnly, state.delay).await
}

async fn ping_anonymous(State(state): State<Arc<MockState>>) -> Result<Json<PingBody>, StatusCode> {
    answer(&state, Shape::Anonymous, state.delay).await
}

#[debug_handler]
async fn delay(
    State(state): State<Arc<MockState>>,
    Path(delay_ms): Path<u64>,
) -> Result<Json<PingBody>, StatusCode> {
    answer(&state, Shape::Full, Duration::from_millis(delay_ms)).await
}

async fn status(State(state): State<Arc<MockState>>, Path(code): Path<u16>) -> (StatusCode, String) {
    state.hits.fetch_add(1, Ordering::Relaxed);
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, format!("status {}", status.as_u16()))
}

async fn plain(State(state): State<Arc<MockState>>) -> &'static str {
    state.hits.fetch_add(1, Ordering::Relaxed);
    "pong"
}

async fn users(State(state): State<Arc<MockState>>) -> Json<Value> {
    state.hits.fetch_add(1, Ordering::Relaxed);
    Json(json!([
        { "id": 1, "name": "Ana", "email": "ana@example.com" },
        { "id": 2, "name": "Bruno", "email": "bruno@example.com" }
    ]))
}

async fn transactions(State(state): State<Arc<MockState>>) -> Json<Value> {
    state.hits.fetch_add(1, Ordering::Relaxed);
    Json(json!([
        { "id": 1, "user_id": 1, "amount": 150.0, "kind": "credit" },
        { "id": 2, "user_id": 2, "amount": 42.5, "kind": "debit" }
    ]))
}

/** Utils **/

fn rate_limiter(tps: NonZeroU32) -> DefaultDirectRateLimiter {
    RateLimiter::direct(Quota::per_second(tps))
}

/** TPS Printer **/

async fn tps_measure_task(state: Arc<MockState>) {
    let mut last = 0;
    loop {
        tokio::time::sleep(Duration::from_millis(1000)).await;
        let hits = state.hits.load(Ordering::Relaxed);
        if hits != last {
            info!("{} TPS", hits - last);
        }
        last = hits;
    }
}
