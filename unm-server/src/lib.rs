//! unm-server library - HTTP host for the song resolver
//!
//! Exposes the executor (`list`, `search`, `retrieve`) as a JSON API. The
//! default [`Context`] and engine list come from configuration; each
//! request may layer its own values on top. The `/api/v1` routes share one
//! request budget; `/health` is outside it.

use axum::error_handling::HandleErrorLayer;
use axum::extract::Request;
use axum::http::Method;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use unm_common::config::{RateLimitConfig, TomlConfig};
use unm_common::Context;
use unm_engine::Executor;

pub mod api;
pub mod context;
pub mod error;

pub use context::ApiContext;
pub use error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub executor: Arc<Executor>,
    /// Context every request starts from
    pub default_context: Arc<Context>,
    /// Engines searched when a request names none
    pub default_engines: Option<Arc<Vec<String>>>,
    /// Request budget of the API routes, `None` for unlimited
    pub rate_limit: Option<RateLimitConfig>,
}

impl AppState {
    pub fn new(executor: Executor, default_context: Context, default_engines: Option<Vec<String>>) -> Self {
        Self {
            executor: Arc::new(executor),
            default_context: Arc::new(default_context),
            default_engines: default_engines.map(Arc::new),
            rate_limit: None,
        }
    }

    /// Limit the API routes to `limit`; a disabled limit means unlimited
    pub fn with_rate_limit(mut self, limit: RateLimitConfig) -> Self {
        self.rate_limit = Some(limit).filter(RateLimitConfig::is_enabled);
        self
    }

    /// State from the `[context]` table, `engines` list and
    /// `[server] rate_limit` of `config`
    pub fn from_config(executor: Executor, config: &TomlConfig) -> Self {
        Self::new(executor, config.context.clone(), config.engines.clone())
            .with_rate_limit(config.server.rate_limit)
    }

    /// The engines to search when the request asked for `requested`.
    ///
    /// An explicit list is used as-is, even when empty. Otherwise the
    /// configured default list, or every registered engine.
    pub fn engines_for(&self, requested: Option<Vec<String>>) -> Vec<String> {
        match (requested, &self.default_engines) {
            (Some(engines), _) => engines,
            (None, Some(defaults)) => defaults.as_ref().clone(),
            (None, None) => self
                .executor
                .list()
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }

    /// The context for one request: the default context with `overrides`
    /// layered on top
    pub fn context_for(&self, overrides: Option<ApiContext>) -> Context {
        match overrides {
            Some(overrides) => overrides.layer_over(&self.default_context),
            None => self.default_context.as_ref().clone(),
        }
    }
}

/// Bind the HTTP listener.
///
/// Returns the address actually bound, so port `0` resolves to the
/// ephemeral port the OS picked.
pub async fn bind_listener(address: &str) -> std::io::Result<(TcpListener, SocketAddr)> {
    let listener = TcpListener::bind(address).await?;
    let local_addr = listener.local_addr()?;
    Ok((listener, local_addr))
}

/// Queue depth in front of the limiter
const LIMITER_BUFFER: usize = 1024;

/// Build application router
///
/// Must be called inside a Tokio runtime when a rate limit is set: the
/// limiter's buffer spawns its worker task.
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/engines", get(api::list_engines))
        .route("/search", post(api::search))
        .route("/retrieve", post(api::retrieve))
        .with_state(state.clone());

    // Layered around the whole nested router so every API route draws
    // from the same budget. Requests over budget are shed, not queued.
    let router = match state.rate_limit {
        Some(limit) => {
            let limited = ServiceBuilder::new()
                .layer(HandleErrorLayer::new(error::handle_limiter_error))
                .buffer::<Request>(LIMITER_BUFFER)
                .load_shed()
                .rate_limit(limit.requests, limit.period())
                .service(api_routes);
            Router::new().nest_service("/api/v1", limited)
        }
        None => Router::new().nest("/api/v1", api_routes),
    };

    router
        .merge(api::health_routes().with_state(state))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
