use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Request},
    http::{request::Parts, HeaderMap},
    Json,
};
use serde::de::DeserializeOwned;

use crate::database::models::ProfileId;
use crate::error::ApiError;

use super::{SESSION_HEADER, USER_ID_HEADER};

/// Profile the gateway authenticated, read from `X-User-ID`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentProfile(pub ProfileId);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentProfile
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = header_text(&parts.headers, USER_ID_HEADER)
            .ok_or_else(|| ApiError::unauthorized("인증이 필요합니다"))?;

        raw.parse::<ProfileId>()
            .map(CurrentProfile)
            .map_err(|_| ApiError::unauthorized("Invalid X-User-ID header"))
    }
}

/// Raw `X-Session-ID` credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for SessionToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        header_text(&parts.headers, SESSION_HEADER)
            .map(|s| SessionToken(s.to_string()))
            .ok_or_else(|| ApiError::unauthorized("세션 ID가 필요합니다"))
    }
}

/// `Json<T>` whose rejections use the API error body
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

fn json_rejection(rejection: JsonRejection) -> ApiError {
    tracing::debug!("Rejected request body: {}", rejection.body_text());
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::bad_request("Content-Type must be application/json")
        }
        _ => ApiError::invalid_json("요청 본문이 올바른 JSON 형식이 아닙니다"),
    }
}

/// Trimmed, non-empty header value
pub fn header_text<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
