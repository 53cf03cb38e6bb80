use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use ctxeq_dsl::Formula;
use ctxeq_engine::oracles::ExternalOracles;
use ctxeq_engine::pipeline::{EngineError, EquivalenceOptions};
use ctxeq_engine::problem::EquivalenceProblem;
use ctxeq_engine::result::Witnesses;
use ctxeq_ir::logic::Logic;
use ctxeq_ir::transform::ContextMode;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[derive(Debug, Clone)]
struct ServerConfig {
    bind: String,
    max_request_bytes: usize,
    max_concurrent_solvers: usize,
    timeout_secs: u64,
    smt_command: String,
    ctl_sat_command: String,
    spot_translate_command: String,
    spot_word_command: String,
}

impl ServerConfig {
    fn from_env() -> Self {
        fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
            std::env::var(key)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        }
        let defaults = EquivalenceOptions::default();
        Self {
            bind: env_or("CTXEQ_BIND", "127.0.0.1:7878".to_string()),
            max_request_bytes: env_or("CTXEQ_MAX_REQUEST_BYTES", 65_536),
            max_concurrent_solvers: env_or("CTXEQ_MAX_CONCURRENT_SOLVERS", 4),
            timeout_secs: env_or("CTXEQ_TIMEOUT_SECS", defaults.timeout_secs),
            smt_command: env_or("CTXEQ_SMT_SOLVER", defaults.smt_command),
            ctl_sat_command: env_or("CTXEQ_CTL_SAT", defaults.ctl_sat_command),
            spot_translate_command: env_or("CTXEQ_LTL2TGBA", defaults.spot_translate_command),
            spot_word_command: env_or("CTXEQ_AUTFILT", defaults.spot_word_command),
        }
    }

    fn options(&self, logic: Logic, mode: ContextMode) -> EquivalenceOptions {
        EquivalenceOptions {
            logic,
            mode,
            timeout_secs: self.timeout_secs,
            smt_command: self.smt_command.clone(),
            ctl_sat_command: self.ctl_sat_command.clone(),
            spot_translate_command: self.spot_translate_command.clone(),
            spot_word_command: self.spot_word_command.clone(),
            ..EquivalenceOptions::default()
        }
    }
}

struct AppState {
    config: ServerConfig,
    solver_semaphore: Arc<Semaphore>,
}

#[derive(Debug, Clone, Deserialize)]
struct EquivalenceRequest {
    left: Option<String>,
    right: Option<String>,
    logic: Option<String>,
    /// Only monotonic contexts unless explicitly disabled.
    monotonic: Option<bool>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct WitnessText {
    raw: String,
    unsimp: String,
}

#[derive(Debug, Serialize)]
struct EquivalenceResponse {
    ok: bool,
    equivalent: bool,
    lword: Option<String>,
    rword: Option<String>,
    witnesses: IndexMap<String, WitnessText>,
    lformula: String,
    rformula: String,
    cformula: String,
}

impl EquivalenceResponse {
    fn from_problem(problem: &EquivalenceProblem, equivalent: bool) -> Self {
        let unsimplified = problem.canonical_context(false);
        let simplified = match problem.canonical_context(true) {
            // one witness per context name only
            Witnesses::Split { .. } => unsimplified.clone(),
            single => single,
        };
        let witnesses = simplified
            .primary()
            .iter()
            .zip(unsimplified.primary().values())
            .map(|((name, raw), unsimp)| {
                let text = WitnessText {
                    raw: raw.to_string(),
                    unsimp: unsimp.to_string(),
                };
                (name.clone(), text)
            })
            .collect();
        let generated = problem.generated();
        Self {
            ok: true,
            equivalent,
            lword: problem.lnr().map(ToString::to_string),
            rword: problem.rnl().map(ToString::to_string),
            witnesses,
            lformula: generated.left.to_string(),
            rformula: generated.right.to_string(),
            cformula: generated.condition.to_string(),
        }
    }
}

fn solve(
    left: &Formula,
    right: &Formula,
    options: &EquivalenceOptions,
) -> Result<EquivalenceResponse, EngineError> {
    let mut problem = EquivalenceProblem::new(left, right, options.logic, options.mode)?;
    let mut oracles = ExternalOracles::from_options(options);
    let equivalent = problem.solve(&mut oracles)?;
    Ok(EquivalenceResponse::from_problem(&problem, equivalent))
}

fn rejection(reason: impl Into<String>) -> Response {
    let reason: String = reason.into();
    (StatusCode::OK, Json(json!({"ok": false, "reason": reason}))).into_response()
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({"ok": false, "error": message}))).into_response()
}

fn failure_reason(error: &EngineError) -> String {
    if error.is_timeout() {
        "timed-out".into()
    } else {
        error.to_string()
    }
}

fn parse_side(logic: Logic, text: &str, side: &str) -> Result<Formula, Response> {
    logic
        .parse(text, side)
        .map_err(|_| rejection(format!("cannot parse {side} formula")))
}

/// Runs `job` on the blocking pool and releases `permit` only once the job
/// has returned, even if nobody awaits the handle any more.
fn spawn_solver<T, F>(permit: OwnedSemaphorePermit, job: F) -> JoinHandle<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let result = job();
        drop(permit);
        result
    })
}

async fn health() -> Json<Value> {
    Json(json!({"ok": true}))
}

async fn check_equivalence(
    State(state): State<Arc<AppState>>,
    Json(request): Json<EquivalenceRequest>,
) -> Response {
    let (Some(left), Some(right)) = (request.left.as_deref(), request.right.as_deref()) else {
        return rejection("missing parameters");
    };
    let logic_name = request.logic.as_deref().unwrap_or("ltl");
    let Ok(logic) = logic_name.parse::<Logic>() else {
        return rejection(format!("unknown logic: {logic_name}"));
    };
    let left = match parse_side(logic, left, "left") {
        Ok(f) => f,
        Err(resp) => return resp,
    };
    let right = match parse_side(logic, right, "right") {
        Ok(f) => f,
        Err(resp) => return resp,
    };
    let mode = ContextMode::from_any_formula(!request.monotonic.unwrap_or(true));

    let permit = match Arc::clone(&state.solver_semaphore).try_acquire_owned() {
        Ok(permit) => permit,
        Err(_) => {
            return error_response(
                StatusCode::SERVICE_UNAVAILABLE,
                "server busy: too many concurrent solver runs".into(),
            );
        }
    };

    let options = state.config.options(logic, mode);
    let server_timeout = Duration::from_secs(options.timeout_secs + 5);
    let task = spawn_solver(permit, move || solve(&left, &right, &options));
    match tokio::time::timeout(server_timeout, task).await {
        Ok(Ok(Ok(response))) => (StatusCode::OK, Json(response)).into_response(),
        Ok(Ok(Err(error))) => {
            warn!(%logic, %error, "equivalence check failed");
            rejection(failure_reason(&error))
        }
        Ok(Err(join_error)) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("solver task crashed: {join_error}"),
        ),
        Err(_) => rejection("timed-out"),
    }
}

fn build_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api", post(check_equivalence))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(state.config.max_request_bytes))
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(%e, "cannot listen for shutdown signal");
    }
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ctxeq_playground=info,tower_http=info".into()),
        )
        .init();

    let config = ServerConfig::from_env();
    info!(
        max_request_bytes = config.max_request_bytes,
        max_concurrent_solvers = config.max_concurrent_solvers,
        timeout_secs = config.timeout_secs,
        smt = %config.smt_command,
        "server config loaded"
    );

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    let addr = listener.local_addr()?;
    let state = Arc::new(AppState {
        solver_semaphore: Arc::new(Semaphore::new(config.max_concurrent_solvers)),
        config,
    });

    info!(%addr, "ctxeq playground ready");
    axum::serve(listener, build_app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

#[cfg(test)]
fn test_config() -> ServerConfig {
    ServerConfig {
        bind: "127.0.0.1:0".into(),
        max_request_bytes: 65_536,
        max_concurrent_solvers: 4,
        timeout_secs: 5,
        smt_command: "ctxeq-test-missing-smt".into(),
        ctl_sat_command: "ctxeq-test-missing-ctl-sat".into(),
        spot_translate_command: "ctxeq-test-missing-ltl2tgba".into(),
        spot_word_command: "ctxeq-test-missing-autfilt".into(),
    }
}

#[cfg(test)]
fn test_state_with_config(config: ServerConfig) -> Arc<AppState> {
    Arc::new(AppState {
        solver_semaphore: Arc::new(Semaphore::new(config.max_concurrent_solvers)),
        config,
    })
}
