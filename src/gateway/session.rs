use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    http::{HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use serde_json::Value;
use thiserror::Error;

use crate::error::ApiError;
use crate::middleware::{header_text, SESSION_HEADER, USER_ID_HEADER};
use crate::services::profile_service::SessionPrincipal;
use crate::services::{ProfileService, ServiceError};

use super::GatewayState;

const INVALID_SESSION: &str = "유효하지 않은 세션입니다";

#[derive(Debug, Error)]
pub enum VerifyError {
    /// The credential is unknown or expired
    #[error("{0}")]
    Rejected(String),

    /// The verifier could not give an answer
    #[error("session verification unavailable: {0}")]
    Unavailable(String),
}

impl From<VerifyError> for ApiError {
    fn from(err: VerifyError) -> Self {
        match err {
            VerifyError::Rejected(msg) => ApiError::unauthorized(msg),
            VerifyError::Unavailable(msg) => {
                tracing::error!("Session verification failed: {}", msg);
                ApiError::service_unavailable("Session verification temporarily unavailable")
            }
        }
    }
}

/// Resolves an `X-Session-ID` credential to the profile behind it
#[async_trait]
pub trait SessionVerifier: Send + Sync {
    async fn verify(&self, session_id: &str) -> Result<SessionPrincipal, VerifyError>;
}

/// Asks the user service's `GET /profile/session`
pub struct HttpSessionVerifier {
    client: reqwest::Client,
    url: String,
}

impl HttpSessionVerifier {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            url: format!("{}/profile/session", base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl SessionVerifier for HttpSessionVerifier {
    async fn verify(&self, session_id: &str) -> Result<SessionPrincipal, VerifyError> {
        let response = self
            .client
            .get(&self.url)
            .header(SESSION_HEADER, session_id)
            .send()
            .await
            .map_err(|e| VerifyError::Unavailable(format!("{}: {}", self.url, e)))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<SessionPrincipal>()
                .await
                .map_err(|e| VerifyError::Unavailable(format!("malformed session response: {}", e)));
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::NOT_FOUND {
            // Pass the user service's message through when it sent one
            let message = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|body| body.get("message").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_else(|| INVALID_SESSION.to_string());
            return Err(VerifyError::Rejected(message));
        }

        Err(VerifyError::Unavailable(format!("{} answered {}", self.url, status)))
    }
}

/// Verifies against the profile service directly, for single-process deployments
pub struct LocalSessionVerifier {
    profiles: ProfileService,
}

impl LocalSessionVerifier {
    pub fn new(profiles: ProfileService) -> Self {
        Self { profiles }
    }
}

#[async_trait]
impl SessionVerifier for LocalSessionVerifier {
    async fn verify(&self, session_id: &str) -> Result<SessionPrincipal, VerifyError> {
        self.profiles
            .resolve_session(session_id)
            .await
            .map_err(|err| match err {
                ServiceError::Unauthorized(msg) | ServiceError::NotFound(msg) => VerifyError::Rejected(msg),
                other => VerifyError::Unavailable(other.to_string()),
            })
    }
}

/// Session gate for proxied routes.
///
/// Client-supplied `X-User-ID` is always dropped. Secured paths need a live
/// `X-Session-ID`; the verified profile id is then forwarded as `X-User-ID`.
pub async fn session_middleware(
    State(state): State<GatewayState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    request.headers_mut().remove(USER_ID_HEADER);

    let path = request.uri().path().to_string();
    if !state.validator.is_secured(&path) {
        tracing::debug!("Open endpoint {}", path);
        return Ok(next.run(request).await);
    }

    let session_id = header_text(request.headers(), SESSION_HEADER)
        .ok_or_else(|| {
            tracing::warn!("Rejected {} without session", path);
            ApiError::unauthorized("세션 ID가 필요합니다")
        })?
        .to_string();

    let principal = state.verifier.verify(&session_id).await.map_err(|err| {
        if let VerifyError::Rejected(msg) = &err {
            tracing::warn!("Rejected session for {}: {}", path, msg);
        }
        ApiError::from(err)
    })?;

    request
        .headers_mut()
        .insert(USER_ID_HEADER, HeaderValue::from(principal.profile_id));
    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}
