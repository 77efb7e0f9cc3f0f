mod common;

use anyhow::Result;
use reqwest::{Method, StatusCode};

#[tokio::test]
async fn gateway_health_responds() -> Result<()> {
    let stack = common::spawn_stack().await?;

    let res = stack.client.get(stack.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["service"], "gateway");
    Ok(())
}

#[tokio::test]
async fn preflight_returns_policy_directives() -> Result<()> {
    let stack = common::spawn_stack().await?;

    let res = stack
        .client
        .request(Method::OPTIONS, stack.url("/transaction_service/transactions/create"))
        .header("Origin", "http://localhost")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "X-Session-ID, Content-Type")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let headers = res.headers();
    assert_eq!(headers["access-control-allow-origin"], "http://localhost");
    assert_eq!(headers["access-control-allow-methods"], "GET,POST,PUT,DELETE,OPTIONS");
    assert_eq!(
        headers["access-control-allow-headers"],
        "X-Session-ID, X-User-ID, Content-Type, X-Requested-With"
    );
    assert_eq!(headers["access-control-expose-headers"], "X-Service, Authorization");
    assert_eq!(headers["access-control-allow-credentials"], "true");
    assert_eq!(headers["access-control-max-age"], "3600");
    Ok(())
}

#[tokio::test]
async fn preflight_on_unknown_path_is_still_answered() -> Result<()> {
    let stack = common::spawn_stack().await?;

    let res = stack
        .client
        .request(Method::OPTIONS, stack.url("/no/such/service"))
        .header("Origin", "http://localhost:80")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["access-control-allow-origin"], "http://localhost:80");
    Ok(())
}

#[tokio::test]
async fn foreign_origin_gets_no_allow_origin() -> Result<()> {
    let stack = common::spawn_stack().await?;

    for method in [Method::OPTIONS, Method::POST] {
        let res = stack
            .client
            .request(method.clone(), stack.url("/user_service/profile/login"))
            .header("Origin", "http://evil.com")
            .json(&serde_json::json!({"email": "a@b.com", "password": "secret1"}))
            .send()
            .await?;

        let allow_origin = res.headers().get("access-control-allow-origin");
        assert!(
            allow_origin.map_or(true, |v| v != "http://evil.com"),
            "{} leaked allow-origin {:?}",
            method,
            allow_origin
        );
        // The filter never rejects on its own
        assert_ne!(res.status(), StatusCode::FORBIDDEN);
    }
    Ok(())
}

#[tokio::test]
async fn proxied_responses_name_their_service() -> Result<()> {
    let stack = common::spawn_stack().await?;

    let res = stack
        .client
        .post(stack.url("/user_service/profile/register"))
        .header("Origin", "http://localhost")
        .json(&serde_json::json!({"email": "svc@example.com", "password": "secret1"}))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(res.headers()["x-service"], "user_service");
    assert_eq!(res.headers()["access-control-allow-origin"], "http://localhost");
    assert_eq!(res.headers()["access-control-expose-headers"], "X-Service, Authorization");
    Ok(())
}
