// handlers/user/mod.rs - profile service routes

pub mod login;
pub mod me;
pub mod register;
pub mod session;

use axum::{
    extract::FromRef,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::database::Stores;
use crate::handlers::health::{self, HealthState};
use crate::services::ProfileService;

pub const SERVICE_NAME: &str = "user_service";

#[derive(Clone)]
pub struct UserState {
    pub profiles: ProfileService,
    pub stores: Stores,
}

impl UserState {
    pub fn new(stores: Stores, session_ttl_secs: u64) -> Self {
        let profiles = ProfileService::new(stores.profiles.clone(), stores.sessions.clone(), session_ttl_secs);
        Self { profiles, stores }
    }
}

impl FromRef<UserState> for HealthState {
    fn from_ref(state: &UserState) -> Self {
        HealthState {
            service: SERVICE_NAME,
            stores: state.stores.clone(),
        }
    }
}

pub fn router(state: UserState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/profile/register", post(register::register_post))
        .route("/profile/login", post(login::login_post))
        .route("/profile/logout", post(session::logout_post))
        .route("/profile/session", get(session::session_get))
        .route("/profile/me", get(me::me_get))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        router(UserState::new(Stores::memory(), 1800))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn register_login_and_resolve_session() {
        let app = app();
        let credentials = json!({"email": "user@example.com", "password": "secret1"});

        let response = app.clone().oneshot(post_json("/profile/register", credentials.clone())).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let profile = body_json(response).await;
        assert_eq!(profile["email"], "user@example.com");
        assert!(profile.get("passwordHash").is_none());

        let response = app.clone().oneshot(post_json("/profile/login", credentials)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let login = body_json(response).await;
        let session_id = login["sessionId"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(
                Request::get("/profile/session")
                    .header("X-Session-ID", &session_id)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["profileId"], profile["id"]);
    }

    #[tokio::test]
    async fn duplicate_registration_is_a_conflict() {
        let app = app();
        let credentials = json!({"email": "user@example.com", "password": "secret1"});
        app.clone().oneshot(post_json("/profile/register", credentials.clone())).await.unwrap();

        let response = app.oneshot(post_json("/profile/register", credentials)).await.unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(response).await["message"], "이미 가입된 이메일입니다");
    }

    #[tokio::test]
    async fn malformed_json_uses_error_body() {
        let request = Request::post("/profile/register")
            .header("Content-Type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "INVALID_JSON");
    }

    #[tokio::test]
    async fn me_requires_user_header() {
        let response = app()
            .oneshot(Request::get("/profile/me").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn health_reports_memory_backend() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["service"], "user_service");
        assert_eq!(body["database"], "memory");
    }
}
