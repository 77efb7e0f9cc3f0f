//! Cross-origin policy for browser clients.
//!
//! The policy is fixed at startup and evaluated once per request, before the
//! session gate and routing. Header values are rendered once when the policy
//! is built so every response carries byte-identical directives.
//!
//! - `OPTIONS` on any path is a preflight: it is answered here with the policy
//!   directives and never reaches the dispatcher.
//! - `Access-Control-Allow-Origin` echoes the request origin only when it is
//!   in the allow-list. Other origins get no allow-origin header; the request
//!   itself is not rejected.

use axum::{
    extract::{Request, State},
    http::{
        header::{self, InvalidHeaderValue},
        HeaderMap, HeaderValue, Method, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::config::CorsConfig;

#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allowed_origins: Vec<String>,
    allow_methods: HeaderValue,
    allow_headers: HeaderValue,
    expose_headers: HeaderValue,
    allow_credentials: bool,
    max_age: HeaderValue,
}

/// Outcome of evaluating a request against the policy
#[derive(Debug, Clone)]
pub enum CorsDecision {
    /// Answer immediately with these headers
    Preflight(HeaderMap),
    /// Forward, then add these headers to the response
    Actual(HeaderMap),
}

impl CorsPolicy {
    pub fn new(config: &CorsConfig) -> Result<Self, InvalidHeaderValue> {
        Ok(Self {
            allowed_origins: config.allowed_origins.clone(),
            allow_methods: HeaderValue::from_str(&config.allowed_methods.join(","))?,
            allow_headers: HeaderValue::from_str(&config.allowed_headers.join(", "))?,
            expose_headers: HeaderValue::from_str(&config.exposed_headers.join(", "))?,
            allow_credentials: config.allow_credentials,
            max_age: HeaderValue::from(config.max_age_secs),
        })
    }

    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|allowed| allowed == origin)
    }

    pub fn apply(&self, method: &Method, request_headers: &HeaderMap) -> CorsDecision {
        let mut headers = HeaderMap::new();
        headers.insert(header::VARY, HeaderValue::from_static("Origin"));

        if let Some(origin) = self.allowed_origin(request_headers) {
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
        }
        if self.allow_credentials {
            headers.insert(header::ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true"));
        }
        headers.insert(header::ACCESS_CONTROL_EXPOSE_HEADERS, self.expose_headers.clone());

        if *method == Method::OPTIONS {
            headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, self.allow_methods.clone());
            headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, self.allow_headers.clone());
            headers.insert(header::ACCESS_CONTROL_MAX_AGE, self.max_age.clone());
            return CorsDecision::Preflight(headers);
        }

        if !headers.contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN) {
            // Disallowed or same-origin: leave the response untouched apart from Vary
            headers.remove(header::ACCESS_CONTROL_ALLOW_CREDENTIALS);
            headers.remove(header::ACCESS_CONTROL_EXPOSE_HEADERS);
        }
        CorsDecision::Actual(headers)
    }

    fn allowed_origin<'a>(&self, request_headers: &'a HeaderMap) -> Option<&'a HeaderValue> {
        request_headers
            .get(header::ORIGIN)
            .filter(|value| value.to_str().map(|o| self.is_origin_allowed(o)).unwrap_or(false))
    }
}

pub async fn cors_middleware(State(policy): State<Arc<CorsPolicy>>, request: Request, next: Next) -> Response {
    match policy.apply(request.method(), request.headers()) {
        CorsDecision::Preflight(headers) => {
            tracing::debug!("Answered preflight for {}", request.uri().path());
            (StatusCode::OK, headers).into_response()
        }
        CorsDecision::Actual(headers) => {
            let mut response = next.run(request).await;
            let target = response.headers_mut();
            for (name, value) in headers.iter() {
                if name == header::VARY {
                    target.append(name.clone(), value.clone());
                } else {
                    target.insert(name.clone(), value.clone());
                }
            }
            response
        }
    }
}
