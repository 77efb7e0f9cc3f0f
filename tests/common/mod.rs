#![allow(dead_code)]

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::Router;
use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use finance_api_rust::cli::commands::serve::gateway_app;
use finance_api_rust::config::{AppConfig, GatewayConfig};
use finance_api_rust::database::Stores;
use finance_api_rust::handlers::{transaction, user};

/// Gateway, user service and transaction service on their own ports,
/// sharing one set of in-memory stores
pub struct TestStack {
    pub base_url: String,
    pub user_url: String,
    pub transaction_url: String,
    pub client: reqwest::Client,
}

impl TestStack {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Registers and logs in; returns the session id
    pub async fn login_as(&self, email: &str, password: &str) -> Result<String> {
        let credentials = json!({ "email": email, "password": password });

        let res = self
            .client
            .post(self.url("/user_service/profile/register"))
            .json(&credentials)
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "register failed: {}", res.status());

        let res = self
            .client
            .post(self.url("/user_service/profile/login"))
            .json(&credentials)
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());

        let body = res.json::<Value>().await?;
        body["sessionId"]
            .as_str()
            .map(str::to_string)
            .context("login response without sessionId")
    }
}

async fn bind() -> Result<(TcpListener, String)> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = TcpListener::bind(("127.0.0.1", port)).await?;
    Ok((listener, format!("http://127.0.0.1:{}", port)))
}

fn spawn(listener: TcpListener, app: Router) {
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("test server stopped: {}", e);
        }
    });
}

/// Spawns the stack on the current test's runtime
pub async fn spawn_stack() -> Result<TestStack> {
    let (user_listener, user_url) = bind().await?;
    let (transaction_listener, transaction_url) = bind().await?;
    let (gateway_listener, base_url) = bind().await?;

    let stores = Stores::memory();
    let mut config = AppConfig::development();
    config.gateway = GatewayConfig::local(
        user_listener.local_addr()?.port(),
        transaction_listener.local_addr()?.port(),
    );
    config.gateway.upstream_timeout_secs = 30;

    spawn(
        user_listener,
        user::router(user::UserState::new(stores.clone(), config.session.ttl_secs)),
    );
    spawn(
        transaction_listener,
        transaction::router(transaction::TransactionState::new(stores)),
    );
    // Sessions go through the user service over HTTP, as in a split deployment
    spawn(gateway_listener, gateway_app(&config, None)?);

    let stack = TestStack {
        base_url,
        user_url,
        transaction_url,
        client: reqwest::Client::new(),
    };
    wait_ready(&stack, Duration::from_secs(5)).await?;
    Ok(stack)
}

async fn wait_ready(stack: &TestStack, timeout: Duration) -> Result<()> {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if let Ok(res) = stack.client.get(stack.url("/health")).send().await {
            if res.status() == StatusCode::OK {
                return Ok(());
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    anyhow::bail!("gateway did not become ready on {} within {:?}", stack.base_url, timeout)
}
