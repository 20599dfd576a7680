use axum::{
    http::{HeaderName, HeaderValue},
    middleware,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use crate::config::ItemstoreConfig;
use crate::store::ItemStore;

pub mod error;
pub mod rate_limit;
pub mod routes;

pub use error::ApiError;
pub use rate_limit::{RateLimitResult, RateLimiter};

/// Server state
pub struct AppState {
    pub store: ItemStore,
    pub rate_limiter: RateLimiter,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: &ItemstoreConfig) -> Self {
        Self {
            store: ItemStore::new(),
            rate_limiter: RateLimiter::new(&config.rate_limit),
            started_at: Instant::now(),
        }
    }
}

/// Response headers stamped on every response, preflights included
const SECURITY_HEADERS: &[(&str, &str)] = &[
    (
        "content-security-policy",
        "default-src 'self';base-uri 'self';font-src 'self' https: data:;\
         form-action 'self';frame-ancestors 'self';img-src 'self' data:;\
         object-src 'none';script-src 'self';script-src-attr 'none';\
         style-src 'self' https: 'unsafe-inline';upgrade-insecure-requests",
    ),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-origin"),
    ("origin-agent-cluster", "?1"),
    ("referrer-policy", "no-referrer"),
    ("strict-transport-security", "max-age=31536000; includeSubDomains"),
    ("x-content-type-options", "nosniff"),
    ("x-dns-prefetch-control", "off"),
    ("x-download-options", "noopen"),
    ("x-frame-options", "SAMEORIGIN"),
    ("x-permitted-cross-domain-policies", "none"),
    ("x-xss-protection", "0"),
];

/// Build the full application router.
///
/// Layers, outermost first: access log, security headers, CORS, rate limit.
pub fn build_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/items", get(routes::list_items).post(routes::create_item))
        .route(
            "/items/{id}",
            get(routes::get_item)
                .put(routes::update_item)
                .delete(routes::delete_item),
        );

    let router: Router<Arc<AppState>> = Router::new()
        .nest("/api/v1", api)
        .route("/health", get(routes::health))
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit::enforce))
        .layer(CorsLayer::permissive());

    SECURITY_HEADERS
        .iter()
        .fold(router, |router, &(name, value)| router.layer(security_header(name, value)))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn security_header(name: &'static str, value: &'static str) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::if_not_present(
        HeaderName::from_static(name),
        HeaderValue::from_static(value),
    )
}

pub async fn start_server(config: ItemstoreConfig) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(&config));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!("Starting server on {}", listener.local_addr()?);
    if config.rate_limit.enabled {
        tracing::info!(
            "Rate limit: {} requests per {}s per client",
            config.rate_limit.max_requests,
            config.rate_limit.window_secs
        );
    }

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
