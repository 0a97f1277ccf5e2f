mod config;
mod error;
mod metrics;
mod state;

use anyhow::{Context, Result};
use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use scanner::{FileSource, LabeledGame, LogScanner};
use serde_json::json;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::{ApiConfig, LogFormat};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Phase 1: Basic tracing so we can log during config loading
    // Uses set_default (thread-local) so it can be replaced by Phase 2's global subscriber
    let _basic_tracing = init_tracing_basic();

    info!("Starting Fraglog API v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = ApiConfig::load().context("Failed to load configuration")?;

    config
        .validate()
        .context("Configuration validation failed")?;

    // Phase 2: Re-initialize tracing with config (format, level)
    // Drop the phase-1 thread-local guard so the global subscriber slot is free
    drop(_basic_tracing);
    init_tracing_from_config(&config);

    info!("Configuration loaded successfully");
    info!("Server will bind to: {}", config.server.bind_address);
    info!("Log source: {}", config.scanner.log_path);

    // Build the scanner against the configured log file. A missing file or
    // blank path is fatal here rather than on the first request.
    let source = FileSource::new(&config.scanner.log_path);
    let scanner =
        LogScanner::new(config.scanner.clone(), source).context("Failed to initialize log scanner")?;

    // Create application state
    let state = AppState::new(config.clone(), scanner);

    // Build the application router
    let app = build_router(state);

    // Parse bind address
    let addr: SocketAddr = config
        .server
        .bind_address
        .parse()
        .context("Invalid bind address")?;

    info!("Starting HTTP server...");
    info!("  - Games endpoint: http://{}/api/v1/games", addr);
    info!("  - Health check: http://{}/health", addr);
    info!("  - Metrics: http://{}/metrics", addr);

    // Start server with graceful shutdown
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    info!("✓ Fraglog API is ready!");
    info!("Listening on: http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down gracefully");
    Ok(())
}

/// Build the application router
fn build_router(state: AppState) -> Router {
    // CORS configuration
    let cors = if state.config.server.enable_cors {
        // Use the actual origins from config
        let origins = state
            .config
            .server
            .cors_origins
            .iter()
            .filter_map(|s| s.parse::<axum::http::HeaderValue>().ok())
            .collect::<Vec<_>>();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    } else {
        // When CORS is disabled, use a restrictive layer (same-origin only)
        CorsLayer::new()
    };

    // Request timeout from config
    let request_timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    Router::new()
        .route("/api/v1/games", get(games_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/", get(root_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                // Timeout for requests (prevents indefinitely hanging connections)
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    request_timeout,
                ))
                // GET-only API; keep request bodies tiny
                .layer(DefaultBodyLimit::max(64 * 1024))
                .layer(cors),
        )
        .with_state(state)
}

/// Root handler - shows API info
async fn root_handler() -> Json<serde_json::Value> {
    Json(json!({
        "name": "Fraglog API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "games": "/api/v1/games",
            "health": "/health",
            "metrics": "/metrics"
        }
    }))
}

/// GET /api/v1/games — scan the log source and return every match
async fn games_handler(State(state): State<AppState>) -> ApiResult<Json<Vec<LabeledGame>>> {
    let started = Instant::now();
    let scanner = state.scanner.clone();

    // The scan is synchronous file I/O; keep it off the async workers.
    let report = match tokio::task::spawn_blocking(move || scanner.scan()).await {
        Ok(Ok(report)) => report,
        Ok(Err(err)) => {
            state.metrics.scan_failed();
            return Err(err.into());
        }
        Err(join_err) => {
            state.metrics.scan_failed();
            return Err(ApiError::Internal(format!("scan task failed: {}", join_err)));
        }
    };

    let elapsed = started.elapsed();
    state.metrics.scan_completed(&report.stats, elapsed);

    info!(
        games = report.games.len(),
        lines = report.stats.lines,
        kills = report.stats.kills,
        elapsed_ms = elapsed.as_millis() as u64,
        "scan completed"
    );

    Ok(Json(report.games))
}

/// Health check handler - reflects whether the log source still resolves
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let available = state.scanner.source_available();
    let status_code = if available {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(json!({
            "status": if available { "healthy" } else { "unhealthy" },
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "source": {
                "path": state.config.scanner.log_path,
                "available": available
            }
        })),
    )
}

/// Metrics endpoint
async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.metrics.snapshot();

    Json(json!({
        "scans": {
            "total": snapshot.scans_total,
            "failed": snapshot.scan_failures_total,
            "last_duration_ms": snapshot.last_scan_millis
        },
        "totals": {
            "lines": snapshot.lines_scanned_total,
            "games": snapshot.games_parsed_total,
            "kills": snapshot.kills_seen_total
        }
    }))
}

/// Phase 1: Basic tracing init so we can log during config loading.
/// Uses RUST_LOG env var or a sensible default.
fn init_tracing_basic() -> tracing::subscriber::DefaultGuard {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,api=debug,scanner=debug"));

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_default(subscriber)
}

/// Phase 2: Re-initialize tracing with configuration values.
/// This replaces the global subscriber with one that respects config.
fn init_tracing_from_config(config: &ApiConfig) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // Prefer RUST_LOG env var, fall back to config level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            let layer = fmt::layer().json().with_target(true).with_thread_ids(true);
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
        LogFormat::Pretty => {
            let layer = fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false);
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        },
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use scanner::MemorySource;
    use tower::ServiceExt;

    const INIT: &str =
        r"  0:00 InitGame: \sv_floodProtect\1\sv_hostname\Code Miner Server\g_gametype\0";
    const SHUTDOWN: &str = " 12:13 ShutdownGame:";

    fn fixture_lines() -> Vec<String> {
        vec![
            INIT.to_string(),
            r" 20:34 ClientUserinfoChanged: 2 n\Isgalamido\t\0\model\uriel/zael".to_string(),
            r" 20:38 ClientUserinfoChanged: 3 n\Zeh\t\0\model\sarge".to_string(),
            " 21:07 Kill: 2 3 7: Isgalamido killed Zeh by MOD_ROCKET_SPLASH".to_string(),
            SHUTDOWN.to_string(),
        ]
    }

    fn test_config() -> ApiConfig {
        let mut config = ApiConfig::default();
        config.scanner.log_path = "fixtures/games.log".to_string();
        config
    }

    fn state_with_source(source: MemorySource) -> AppState {
        let config = test_config();
        let scanner = LogScanner::new(config.scanner.clone(), source).unwrap();
        AppState::new(config, scanner)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_games_endpoint_returns_parsed_games() {
        let app = build_router(state_with_source(MemorySource::new(fixture_lines())));
        let (status, body) = get_json(app, "/api/v1/games").await;

        assert_eq!(status, StatusCode::OK);
        let game = &body[0]["game_1"];
        assert_eq!(game["totalKills"], 1);
        assert_eq!(game["players"][0], "Isgalamido");
        assert_eq!(game["kills"]["Isgalamido"], 1);
        assert_eq!(game["kills"]["Zeh"], 0);
    }

    #[tokio::test]
    async fn test_games_endpoint_empty_log() {
        let app = build_router(state_with_source(MemorySource::empty()));
        let (status, body) = get_json(app, "/api/v1/games").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_games_endpoint_scan_failure_is_sanitized() {
        let source = MemorySource::new(fixture_lines()).fail_after(2);
        let app = build_router(state_with_source(source));
        let (status, body) = get_json(app, "/api/v1/games").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "SCAN_FAILED");
    }

    #[tokio::test]
    async fn test_health_reports_healthy() {
        let app = build_router(state_with_source(MemorySource::new(fixture_lines())));
        let (status, body) = get_json(app, "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["source"]["available"], true);
    }

    #[tokio::test]
    async fn test_health_reports_source_lost_at_runtime() {
        let source = MemorySource::new(fixture_lines());
        let handle = source.clone();
        let app = build_router(state_with_source(source));

        handle.set_available(false);
        let (status, body) = get_json(app, "/health").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "unhealthy");
        assert_eq!(body["source"]["path"], "fixtures/games.log");
    }

    #[tokio::test]
    async fn test_metrics_track_scans() {
        let app = build_router(state_with_source(MemorySource::new(fixture_lines())));

        let _ = get_json(app.clone(), "/api/v1/games").await;
        let (status, body) = get_json(app, "/metrics").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["scans"]["total"], 1);
        assert_eq!(body["scans"]["failed"], 0);
        assert_eq!(body["totals"]["games"], 1);
        assert_eq!(body["totals"]["kills"], 1);
    }

    #[tokio::test]
    async fn test_metrics_count_failures() {
        let source = MemorySource::new(fixture_lines()).fail_after(1);
        let app = build_router(state_with_source(source));

        let _ = get_json(app.clone(), "/api/v1/games").await;
        let (_, body) = get_json(app, "/metrics").await;

        assert_eq!(body["scans"]["total"], 0);
        assert_eq!(body["scans"]["failed"], 1);
    }

    #[tokio::test]
    async fn test_root_lists_endpoints() {
        let app = build_router(state_with_source(MemorySource::empty()));
        let (status, body) = get_json(app, "/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Fraglog API");
        assert_eq!(body["endpoints"]["games"], "/api/v1/games");
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let app = build_router(state_with_source(MemorySource::empty()));
        let (status, _) = get_json(app, "/api/v1/players").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
