//! STM Index API Gateway
//!
//! The main entry point for all external API requests.
//! Handles:
//! - Authentication and authorization
//! - Rate limiting
//! - Request routing
//! - Observability (logging, metrics, tracing)

mod handlers;
mod middleware;

use axum::extract::FromRef;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use stmindex_common::{
    auth::JwtManager,
    config::AppConfig,
    db::{DbPool, Repository},
    mail::Mailer,
    metrics,
    notify::{Notifier, TracingNotifier},
    scholar::ScholarVerifier,
    wpsync::WordPressSync,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, warn, Level};

/// Fallback JWT secret for local development only
const DEV_JWT_SECRET: &str = "dev-secret-change-me";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DbPool,
    pub repo: Repository,
    pub jwt: Arc<JwtManager>,
    pub notifier: Arc<dyn Notifier>,
    pub mailer: Arc<Mailer>,
    pub scholar: Arc<ScholarVerifier>,
    pub wpsync: Arc<WordPressSync>,
}

impl FromRef<AppState> for Arc<JwtManager> {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(true)
        .json()
        .init();

    info!("Starting STM Index API Gateway v{}", stmindex_common::VERSION);

    // Load configuration
    let config = AppConfig::load().map_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        e
    })?;

    let config = Arc::new(config);

    // Initialize metrics
    metrics::register_metrics();
    if config.observability.metrics_port > 0 {
        let metrics_addr = SocketAddr::from(([0, 0, 0, 0], config.observability.metrics_port));
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(metrics_addr)
            .install()?;
        info!("Prometheus exporter listening on {}", metrics_addr);
    }

    // Initialize database connection
    info!("Connecting to database...");
    let db = DbPool::new(&config.database).await?;
    let repo = Repository::new(db.clone());

    let jwt_secret = match config.auth.jwt_secret.as_deref() {
        Some(secret) => secret.to_string(),
        None => {
            warn!("No JWT secret configured, using development fallback");
            DEV_JWT_SECRET.to_string()
        }
    };
    let jwt = Arc::new(JwtManager::new(&jwt_secret, config.auth.jwt_expiration_secs));

    // Create app state
    let state = AppState {
        config: config.clone(),
        db,
        repo,
        jwt,
        notifier: Arc::new(TracingNotifier),
        mailer: Arc::new(Mailer::new(&config.smtp)?),
        scholar: Arc::new(ScholarVerifier::new(config.scholar.clone())?),
        wpsync: Arc::new(WordPressSync::new()?),
    };

    // Build the router
    let app = create_router(state);

    // Start the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    // Rate limiters: one general bucket plus a stricter one for login
    let general_limiter = middleware::rate_limit::create_rate_limiter(
        state.config.rate_limit.requests_per_second,
        state.config.rate_limit.burst,
    );
    let login_limiter =
        middleware::rate_limit::create_login_limiter(state.config.rate_limit.login_per_minute);

    let auth_routes = Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route_layer(axum::middleware::from_fn_with_state(
            middleware::rate_limit::RateLimitState::new(
                login_limiter,
                state.config.rate_limit.enabled,
            ),
            middleware::rate_limit::rate_limit,
        ));

    // API routes
    let api_routes = Router::new()
        // Journal endpoints
        .route("/journals", get(handlers::journals::list_journals))
        .route("/journals", post(handlers::journals::create_journal))
        .route("/journals/{id}", get(handlers::journals::get_journal))
        .route("/journals/{id}/stats", get(handlers::journals::journal_stats))
        .route("/journals/{id}/sync", post(handlers::journals::sync_journal))
        .route(
            "/journals/{id}/applications",
            get(handlers::journals::list_applications),
        )
        .route("/journals/{id}/apply", post(handlers::journals::apply))
        // Paper endpoints
        .route("/papers", get(handlers::papers::list_papers))
        .route("/papers", post(handlers::papers::create_paper))
        .route("/papers/{id}", get(handlers::papers::get_paper))
        .route("/papers/{id}/recommend", get(handlers::papers::recommend_reviewers))
        .route("/papers/{id}/verify", post(handlers::papers::verify_paper))
        // Indexing database endpoints
        .route("/databases", get(handlers::databases::list_databases))
        // Admin endpoints
        .route("/admin/reviewers", get(handlers::reviewers::list_reviewers))
        .route("/admin/reviewers", post(handlers::reviewers::create_reviewer))
        .route("/admin/reviewers/{id}", put(handlers::reviewers::update_reviewer))
        .route(
            "/admin/reviewers/{id}",
            delete(handlers::reviewers::delete_reviewer),
        )
        .route(
            "/admin/database-configs",
            get(handlers::databases::list_database_configs),
        )
        .route(
            "/admin/database-configs",
            post(handlers::databases::create_database_config),
        )
        .route(
            "/admin/database-configs/{id}",
            put(handlers::databases::update_database_config),
        )
        .route(
            "/admin/send-invitation",
            post(handlers::invitations::send_invitation),
        )
        .route(
            "/admin/send-invitations",
            post(handlers::invitations::send_bulk_invitations),
        )
        // Analytics endpoints
        .route("/analytics/advanced", get(handlers::analytics::advanced))
        // Audit log endpoints
        .route("/audit-logs", get(handlers::audit::list_audit_logs))
        .merge(auth_routes)
        .route_layer(axum::middleware::from_fn_with_state(
            middleware::rate_limit::RateLimitState::new(
                general_limiter,
                state.config.rate_limit.enabled,
            ),
            middleware::rate_limit::rate_limit,
        ));

    // Compose the app
    Router::new()
        // Health endpoints (no auth, no rate limit)
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        .nest("/api", api_routes)
        .layer(axum::middleware::from_fn(middleware::track_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
