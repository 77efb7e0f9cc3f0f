// handlers/transaction/mod.rs - category and transaction routes
//
// Every route except /health acts on behalf of the profile in X-User-ID.

pub mod categories;
pub mod transactions;

use axum::{
    extract::FromRef,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::database::Stores;
use crate::handlers::health::{self, HealthState};
use crate::services::{CategoryService, TransactionService};

pub const SERVICE_NAME: &str = "transaction_service";

#[derive(Clone)]
pub struct TransactionState {
    pub categories: CategoryService,
    pub transactions: TransactionService,
    pub stores: Stores,
}

impl TransactionState {
    pub fn new(stores: Stores) -> Self {
        let categories = CategoryService::new(stores.categories.clone());
        let transactions = TransactionService::new(stores.transactions.clone(), categories.clone());
        Self {
            categories,
            transactions,
            stores,
        }
    }
}

impl FromRef<TransactionState> for HealthState {
    fn from_ref(state: &TransactionState) -> Self {
        HealthState {
            service: SERVICE_NAME,
            stores: state.stores.clone(),
        }
    }
}

pub fn router(state: TransactionState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        // Categories
        .route("/categories/create", post(categories::create_post))
        .route("/categories/get", get(categories::list_get))
        .route("/categories/:id", delete(categories::category_delete))
        // Transactions
        .route("/transactions/create", post(transactions::create_post))
        .route("/transactions/profile", get(transactions::list_get))
        .route("/transactions/edit/:id", put(transactions::edit_put))
        .route("/transactions/:id", delete(transactions::transaction_delete))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn request(method: Method, uri: &str, profile_id: i64, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("X-User-ID", profile_id.to_string());
        match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn create_category(app: &Router, profile_id: i64, content: &str) -> i64 {
        let response = app
            .clone()
            .oneshot(request(Method::POST, "/categories/create", profile_id, Some(json!({"content": content}))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await["id"].as_i64().unwrap()
    }

    fn transaction(category_ids: &[i64], amount: i64) -> Value {
        json!({
            "type": "expense",
            "categoryIds": category_ids,
            "description": "점심",
            "amount": amount,
            "date": "2024-05-01T12:00:00.000Z"
        })
    }

    #[tokio::test]
    async fn duplicate_category_is_conflict() {
        let app = router(TransactionState::new(Stores::memory()));
        create_category(&app, 1, "식비").await;

        let response = app
            .oneshot(request(Method::POST, "/categories/create", 1, Some(json!({"content": "식비"}))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = body_json(response).await;
        assert_eq!(body["error"], true);
        assert_eq!(body["message"], "이미 존재하는 카테고리입니다");
    }

    #[tokio::test]
    async fn negative_amount_is_a_validation_error() {
        let app = router(TransactionState::new(Stores::memory()));
        let category = create_category(&app, 1, "식비").await;

        let response = app
            .oneshot(request(Method::POST, "/transactions/create", 1, Some(transaction(&[category], -5))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["field_errors"]["amount"], "금액은 양수여야 합니다");
    }

    #[tokio::test]
    async fn transaction_lifecycle() {
        let app = router(TransactionState::new(Stores::memory()));
        let category = create_category(&app, 1, "식비").await;

        let response = app
            .clone()
            .oneshot(request(Method::POST, "/transactions/create", 1, Some(transaction(&[category], 100))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;
        assert_eq!(created["transactionType"], "expense");
        assert_eq!(created["categories"][0]["content"], "식비");
        let id = created["id"].as_i64().unwrap();

        let response = app
            .clone()
            .oneshot(request(Method::PUT, &format!("/transactions/edit/{}", id), 1, Some(transaction(&[category], 250))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["amount"], 250);

        let response = app
            .clone()
            .oneshot(request(Method::DELETE, &format!("/transactions/{}", id), 2, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .clone()
            .oneshot(request(Method::DELETE, &format!("/transactions/{}", id), 1, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .oneshot(request(Method::GET, "/transactions/profile", 1, None))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["transactions"], json!([]));
    }

    #[tokio::test]
    async fn categories_are_listed_and_soft_deleted() {
        let app = router(TransactionState::new(Stores::memory()));
        let id = create_category(&app, 1, "교통비").await;

        let response = app
            .clone()
            .oneshot(request(Method::DELETE, &format!("/categories/{}", id), 1, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .clone()
            .oneshot(request(Method::GET, "/categories/get", 1, None))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["categories"], json!([]));

        let response = app
            .oneshot(request(Method::DELETE, "/categories/abc", 1, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn routes_require_profile_header() {
        let app = router(TransactionState::new(Stores::memory()));
        let response = app
            .oneshot(Request::get("/categories/get").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
