use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub gateway: GatewayConfig,
    pub cors: CorsConfig,
    pub session: SessionConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub gateway_port: u16,
    pub user_service_port: u16,
    pub transaction_service_port: u16,
}

/// Downstream service reachable through the gateway under `prefix`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    pub id: String,
    pub prefix: String,
    pub upstream: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Exact paths reachable without a session
    pub open_endpoints: Vec<String>,
    pub routes: Vec<RouteConfig>,
    /// Base URL of the service answering `GET /profile/session`
    pub session_service_url: String,
    pub upstream_timeout_secs: u64,
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
    pub exposed_headers: Vec<String>,
    pub allow_credentials: bool,
    pub max_age_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres URL; in-memory stores are used when absent
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

pub const USER_SERVICE_ROUTE: &str = "user_service";
pub const TRANSACTION_SERVICE_ROUTE: &str = "transaction_service";

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: strings(&["http://localhost", "http://localhost:80"]),
            allowed_methods: strings(&["GET", "POST", "PUT", "DELETE", "OPTIONS"]),
            allowed_headers: strings(&["X-Session-ID", "X-User-ID", "Content-Type", "X-Requested-With"]),
            exposed_headers: strings(&["X-Service", "Authorization"]),
            allow_credentials: true,
            max_age_secs: 3600,
        }
    }
}

impl GatewayConfig {
    pub fn default_open_endpoints() -> Vec<String> {
        strings(&["/user_service/profile/register", "/user_service/profile/login"])
    }

    pub fn local(user_service_port: u16, transaction_service_port: u16) -> Self {
        let user_url = format!("http://127.0.0.1:{}", user_service_port);
        let transaction_url = format!("http://127.0.0.1:{}", transaction_service_port);

        Self {
            open_endpoints: Self::default_open_endpoints(),
            routes: vec![
                RouteConfig {
                    id: USER_SERVICE_ROUTE.to_string(),
                    prefix: format!("/{}", USER_SERVICE_ROUTE),
                    upstream: user_url.clone(),
                },
                RouteConfig {
                    id: TRANSACTION_SERVICE_ROUTE.to_string(),
                    prefix: format!("/{}", TRANSACTION_SERVICE_ROUTE),
                    upstream: transaction_url,
                },
            ],
            session_service_url: user_url,
            upstream_timeout_secs: 30,
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }

    pub fn set_upstream(&mut self, route_id: &str, url: &str) {
        if let Some(route) = self.routes.iter_mut().find(|r| r.id == route_id) {
            route.upstream = url.to_string();
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("GATEWAY_PORT") {
            self.server.gateway_port = v.parse().unwrap_or(self.server.gateway_port);
        }
        if let Ok(v) = env::var("USER_SERVICE_PORT") {
            self.server.user_service_port = v.parse().unwrap_or(self.server.user_service_port);
        }
        if let Ok(v) = env::var("TRANSACTION_SERVICE_PORT") {
            self.server.transaction_service_port =
                v.parse().unwrap_or(self.server.transaction_service_port);
        }
        // Local upstreams follow the service ports unless given explicit URLs below
        let local = GatewayConfig::local(self.server.user_service_port, self.server.transaction_service_port);
        self.gateway.routes = local.routes;
        self.gateway.session_service_url = local.session_service_url;

        // Gateway overrides
        if let Ok(v) = env::var("GATEWAY_OPEN_ENDPOINTS") {
            self.gateway.open_endpoints = split_list(&v);
        }
        if let Ok(v) = env::var("USER_SERVICE_URL") {
            self.gateway.set_upstream(USER_SERVICE_ROUTE, &v);
            self.gateway.session_service_url = v;
        }
        if let Ok(v) = env::var("TRANSACTION_SERVICE_URL") {
            self.gateway.set_upstream(TRANSACTION_SERVICE_ROUTE, &v);
        }
        if let Ok(v) = env::var("GATEWAY_UPSTREAM_TIMEOUT_SECS") {
            self.gateway.upstream_timeout_secs = v.parse().unwrap_or(self.gateway.upstream_timeout_secs);
        }
        if let Ok(v) = env::var("GATEWAY_MAX_BODY_BYTES") {
            self.gateway.max_body_bytes = v.parse().unwrap_or(self.gateway.max_body_bytes);
        }

        // CORS overrides
        if let Ok(v) = env::var("CORS_ALLOWED_ORIGINS") {
            self.cors.allowed_origins = split_list(&v);
        }
        if let Ok(v) = env::var("CORS_MAX_AGE_SECS") {
            self.cors.max_age_secs = v.parse().unwrap_or(self.cors.max_age_secs);
        }

        // Session overrides
        if let Ok(v) = env::var("SESSION_TTL_SECS") {
            self.session.ttl_secs = v.parse().unwrap_or(self.session.ttl_secs);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            if !v.trim().is_empty() {
                self.database.url = Some(v);
            }
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        self
    }

    pub fn development() -> Self {
        let server = ServerConfig {
            host: "127.0.0.1".to_string(),
            gateway_port: 8080,
            user_service_port: 8081,
            transaction_service_port: 8082,
        };
        let gateway = GatewayConfig::local(server.user_service_port, server.transaction_service_port);

        Self {
            environment: Environment::Development,
            server,
            gateway,
            cors: CorsConfig::default(),
            session: SessionConfig {
                ttl_secs: 30 * 60, // 30 minutes
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
        }
    }

    fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.server.host = "0.0.0.0".to_string();
        config.gateway.upstream_timeout_secs = 15;
        config.database.max_connections = 20;
        config.database.connection_timeout = 10;
        config
    }

    fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.server.host = "0.0.0.0".to_string();
        config.gateway.upstream_timeout_secs = 10;
        config.database.max_connections = 50;
        config.database.connection_timeout = 5;
        config
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
