//! API gateway: CORS policy, session gate and prefix routing to the services.
//!
//! Request flow: trace span -> CORS (preflights stop here) -> gateway-local
//! routes (`/health`) -> session gate -> dispatcher.

pub mod cors;
pub mod dispatcher;
pub mod route_validator;
pub mod session;

use axum::{
    http::header::InvalidHeaderValue,
    middleware::from_fn_with_state,
    response::Json,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tower_http::trace::TraceLayer;

use crate::config::GatewayConfig;

pub use cors::{cors_middleware, CorsDecision, CorsPolicy};
pub use dispatcher::{RouteTable, Resolved};
pub use route_validator::RouteValidator;
pub use session::{HttpSessionVerifier, LocalSessionVerifier, SessionVerifier, VerifyError};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid route: {0}")]
    InvalidRoute(String),

    #[error("invalid upstream URL for route {route}: {url}")]
    InvalidUpstream { route: String, url: String },

    #[error("invalid header value in gateway configuration")]
    InvalidHeader(#[from] InvalidHeaderValue),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Shared, read-only gateway state
#[derive(Clone)]
pub struct GatewayState {
    pub validator: Arc<RouteValidator>,
    pub routes: Arc<RouteTable>,
    pub verifier: Arc<dyn SessionVerifier>,
    pub client: reqwest::Client,
    pub max_body_bytes: usize,
}

impl GatewayState {
    pub fn new(config: &GatewayConfig, verifier: Arc<dyn SessionVerifier>) -> Result<Self, GatewayError> {
        Ok(Self {
            validator: Arc::new(RouteValidator::new(config.open_endpoints.iter().cloned())),
            routes: Arc::new(RouteTable::new(&config.routes)?),
            verifier,
            client: Self::build_client(config)?,
            max_body_bytes: config.max_body_bytes,
        })
    }

    /// Verifies sessions over HTTP against `session_service_url`
    pub fn with_http_verifier(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let client = Self::build_client(config)?;
        let verifier = Arc::new(HttpSessionVerifier::new(client, &config.session_service_url));
        Self::new(config, verifier)
    }

    fn build_client(config: &GatewayConfig) -> Result<reqwest::Client, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.upstream_timeout_secs))
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(client)
    }
}

pub fn router(state: GatewayState, cors: CorsPolicy) -> Router {
    let routes: Vec<_> = state.routes.routes().iter().map(|r| format!("{} -> {}", r.prefix, r.upstream)).collect();
    tracing::info!("Gateway routes: {}", routes.join(", "));
    tracing::info!("Open endpoints: {}", state.validator.open_endpoints().join(", "));

    let proxy = Router::new()
        .fallback(dispatcher::forward)
        .layer(from_fn_with_state(state.clone(), session::session_middleware))
        .with_state(state);

    Router::new()
        .route("/health", get(health))
        .fallback_service(proxy)
        .layer(from_fn_with_state(Arc::new(cors), cors_middleware))
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "gateway",
        "timestamp": chrono::Utc::now(),
    }))
}
