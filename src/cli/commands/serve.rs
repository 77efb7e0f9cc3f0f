use anyhow::Context;
use axum::Router;
use clap::ValueEnum;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::database::Stores;
use crate::gateway::{self, CorsPolicy, GatewayState, LocalSessionVerifier};
use crate::handlers::{transaction, user};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Component {
    Gateway,
    User,
    Transaction,
    All,
}

pub async fn handle(component: Component, config: &AppConfig) -> anyhow::Result<()> {
    tracing::info!("Starting {:?} in {:?} mode", component, config.environment);

    match component {
        Component::Gateway => {
            let app = gateway_app(config, None)?;
            serve("gateway", &config.server.host, config.server.gateway_port, app).await
        }
        Component::User => {
            let stores = Stores::from_config(&config.database).await?;
            let app = user::router(user::UserState::new(stores, config.session.ttl_secs));
            serve(user::SERVICE_NAME, &config.server.host, config.server.user_service_port, app).await
        }
        Component::Transaction => {
            let stores = Stores::from_config(&config.database).await?;
            let app = transaction::router(transaction::TransactionState::new(stores));
            serve(
                transaction::SERVICE_NAME,
                &config.server.host,
                config.server.transaction_service_port,
                app,
            )
            .await
        }
        Component::All => {
            // One store set; the gateway verifies sessions in-process
            let stores = Stores::from_config(&config.database).await?;
            let user_state = user::UserState::new(stores.clone(), config.session.ttl_secs);
            let gateway = gateway_app(config, Some(&user_state))?;
            let users = user::router(user_state);
            let transactions = transaction::router(transaction::TransactionState::new(stores));

            let host = &config.server.host;
            tokio::try_join!(
                serve("gateway", host, config.server.gateway_port, gateway),
                serve(user::SERVICE_NAME, host, config.server.user_service_port, users),
                serve(transaction::SERVICE_NAME, host, config.server.transaction_service_port, transactions),
            )?;
            Ok(())
        }
    }
}

/// Gateway router; sessions are checked over HTTP unless a local profile service is given
pub fn gateway_app(config: &AppConfig, local: Option<&user::UserState>) -> anyhow::Result<Router> {
    let state = match local {
        Some(user_state) => GatewayState::new(
            &config.gateway,
            Arc::new(LocalSessionVerifier::new(user_state.profiles.clone())),
        )?,
        None => GatewayState::with_http_verifier(&config.gateway)?,
    };
    let cors = CorsPolicy::new(&config.cors).context("invalid CORS configuration")?;
    Ok(gateway::router(state, cors))
}

async fn serve(name: &str, host: &str, port: u16, app: Router) -> anyhow::Result<()> {
    let listener = TcpListener::bind((host, port))
        .await
        .with_context(|| format!("failed to bind {} on {}:{}", name, host, port))?;

    tracing::info!("{} listening on http://{}", name, listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .with_context(|| format!("{} server error", name))?;

    tracing::info!("{} stopped", name);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
