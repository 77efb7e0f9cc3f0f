mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn create_category(stack: &common::TestStack, session: &str, content: &str) -> Result<reqwest::Response> {
    Ok(stack
        .client
        .post(stack.url("/transaction_service/categories/create"))
        .header("X-Session-ID", session)
        .json(&json!({ "content": content }))
        .send()
        .await?)
}

fn transaction(category_ids: &[i64], amount: i64, date: &str) -> Value {
    json!({
        "type": "expense",
        "categoryIds": category_ids,
        "description": "점심",
        "amount": amount,
        "date": date
    })
}

#[tokio::test]
async fn duplicate_category_is_a_conflict_not_a_storage_error() -> Result<()> {
    let stack = common::spawn_stack().await?;
    let session = stack.login_as("cat@example.com", "secret1").await?;

    let res = create_category(&stack, &session, "식비").await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = create_category(&stack, &session, "식비").await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body = res.json::<Value>().await?;
    assert_eq!(body["message"], "이미 존재하는 카테고리입니다");
    assert_eq!(body["code"], "CONFLICT");
    Ok(())
}

#[tokio::test]
async fn categories_are_per_profile() -> Result<()> {
    let stack = common::spawn_stack().await?;
    let alice = stack.login_as("alice@example.com", "secret1").await?;
    let bob = stack.login_as("bob@example.com", "secret1").await?;

    assert_eq!(create_category(&stack, &alice, "식비").await?.status(), StatusCode::CREATED);
    assert_eq!(create_category(&stack, &bob, "식비").await?.status(), StatusCode::CREATED);

    let res = stack
        .client
        .get(stack.url("/transaction_service/categories/get"))
        .header("X-Session-ID", &bob)
        .send()
        .await?;
    let body = res.json::<Value>().await?;
    assert_eq!(body["categories"].as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn transaction_validation_cites_positivity() -> Result<()> {
    let stack = common::spawn_stack().await?;
    let session = stack.login_as("neg@example.com", "secret1").await?;
    let category = create_category(&stack, &session, "식비").await?.json::<Value>().await?["id"]
        .as_i64()
        .unwrap_or_default();

    let res = stack
        .client
        .post(stack.url("/transaction_service/transactions/create"))
        .header("X-Session-ID", &session)
        .json(&transaction(&[category], -5, "2024-05-01T12:00:00.000Z"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert_eq!(body["field_errors"]["amount"], "금액은 양수여야 합니다");
    Ok(())
}

#[tokio::test]
async fn transaction_crud_through_the_gateway() -> Result<()> {
    let stack = common::spawn_stack().await?;
    let session = stack.login_as("tx@example.com", "secret1").await?;
    let category = create_category(&stack, &session, "식비").await?.json::<Value>().await?["id"]
        .as_i64()
        .unwrap_or_default();

    let mut ids = Vec::new();
    for (amount, date) in [(100, "2024-05-01T12:00:00.000Z"), (200, "2024-06-01")] {
        let res = stack
            .client
            .post(stack.url("/transaction_service/transactions/create"))
            .header("X-Session-ID", &session)
            .json(&transaction(&[category], amount, date))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(res.headers()["x-service"], "transaction_service");
        ids.push(res.json::<Value>().await?["id"].as_i64().unwrap_or_default());
    }

    // Newest date first
    let res = stack
        .client
        .get(stack.url("/transaction_service/transactions/profile"))
        .header("X-Session-ID", &session)
        .send()
        .await?;
    let body = res.json::<Value>().await?;
    let amounts: Vec<_> = body["transactions"]
        .as_array()
        .map(|list| list.iter().map(|t| t["amount"].clone()).collect())
        .unwrap_or_default();
    assert_eq!(amounts, vec![json!(200), json!(100)]);

    let res = stack
        .client
        .put(stack.url(&format!("/transaction_service/transactions/edit/{}", ids[0])))
        .header("X-Session-ID", &session)
        .json(&transaction(&[category], 150, "2024-05-02"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?["amount"], 150);

    let res = stack
        .client
        .delete(stack.url(&format!("/transaction_service/transactions/{}", ids[1])))
        .header("X-Session-ID", &session)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    Ok(())
}

#[tokio::test]
async fn foreign_categories_cannot_be_used() -> Result<()> {
    let stack = common::spawn_stack().await?;
    let alice = stack.login_as("alice2@example.com", "secret1").await?;
    let bob = stack.login_as("bob2@example.com", "secret1").await?;
    let alice_category = create_category(&stack, &alice, "여행").await?.json::<Value>().await?["id"]
        .as_i64()
        .unwrap_or_default();

    let res = stack
        .client
        .post(stack.url("/transaction_service/transactions/create"))
        .header("X-Session-ID", &bob)
        .json(&transaction(&[alice_category], 100, "2024-05-01"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    Ok(())
}
