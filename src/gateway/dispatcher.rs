use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, HeaderMap, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
};

use crate::config::RouteConfig;
use crate::error::ApiError;
use crate::middleware::SERVICE_HEADER;

use super::{GatewayError, GatewayState};

#[derive(Debug, Clone)]
pub struct Route {
    pub id: String,
    pub prefix: String,
    pub upstream: String,
    service_header: HeaderValue,
}

/// Route table with longest-prefix matching on path segment boundaries
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

/// Matched route plus the path to request upstream
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
    pub route: &'a Route,
    pub path: &'a str,
}

impl RouteTable {
    pub fn new(configs: &[RouteConfig]) -> Result<Self, GatewayError> {
        let mut routes = Vec::with_capacity(configs.len());
        for config in configs {
            let prefix = config.prefix.trim_end_matches('/');
            if !prefix.starts_with('/') {
                return Err(GatewayError::InvalidRoute(format!(
                    "prefix of route {} must start with '/': {:?}",
                    config.id, config.prefix
                )));
            }

            let upstream = url::Url::parse(&config.upstream).map_err(|_| GatewayError::InvalidUpstream {
                route: config.id.clone(),
                url: config.upstream.clone(),
            })?;
            if !matches!(upstream.scheme(), "http" | "https") {
                return Err(GatewayError::InvalidUpstream {
                    route: config.id.clone(),
                    url: config.upstream.clone(),
                });
            }

            routes.push(Route {
                id: config.id.clone(),
                prefix: prefix.to_string(),
                upstream: config.upstream.trim_end_matches('/').to_string(),
                service_header: HeaderValue::from_str(&config.id)?,
            });
        }

        // Longest prefix first; the sort is stable so equal lengths keep config order
        routes.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
        Ok(Self { routes })
    }

    pub fn resolve<'a>(&'a self, path: &'a str) -> Option<Resolved<'a>> {
        self.routes.iter().find_map(|route| {
            let rest = path.strip_prefix(route.prefix.as_str())?;
            match rest {
                "" => Some(Resolved { route, path: "/" }),
                _ if rest.starts_with('/') => Some(Resolved { route, path: rest }),
                _ => None,
            }
        })
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}

/// Connection-scoped headers are dropped, as are the ones the client re-derives
fn is_forwardable(name: &HeaderName) -> bool {
    let hop_by_hop = [
        header::CONNECTION,
        header::PROXY_AUTHENTICATE,
        header::PROXY_AUTHORIZATION,
        header::TE,
        header::TRAILER,
        header::TRANSFER_ENCODING,
        header::UPGRADE,
        header::HOST,
        header::CONTENT_LENGTH,
    ];
    !hop_by_hop.contains(name)
}

fn forwardable(headers: &HeaderMap) -> HeaderMap {
    headers
        .iter()
        .filter(|(name, _)| is_forwardable(name))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

/// Proxies the request to the service owning its path prefix
pub async fn forward(State(state): State<GatewayState>, request: Request) -> Result<Response, ApiError> {
    let (parts, body) = request.into_parts();
    let path = parts.uri.path();

    let resolved = state
        .routes
        .resolve(path)
        .ok_or_else(|| ApiError::not_found(format!("No service for path {}", path)))?;

    let mut url = format!("{}{}", resolved.route.upstream, resolved.path);
    if let Some(query) = parts.uri.query() {
        url.push('?');
        url.push_str(query);
    }

    let body = to_bytes(body, state.max_body_bytes)
        .await
        .map_err(|_| ApiError::bad_request("Request body too large"))?;

    tracing::debug!("{} {} -> {} ({})", parts.method, path, url, resolved.route.id);

    let upstream = state
        .client
        .request(parts.method.clone(), &url)
        .headers(forwardable(&parts.headers))
        .body(body)
        .send()
        .await
        .map_err(|e| upstream_error(&resolved.route.id, e))?;

    let status = upstream.status();
    let headers = forwardable(upstream.headers());
    let bytes = upstream
        .bytes()
        .await
        .map_err(|e| upstream_error(&resolved.route.id, e))?;

    let mut response = (status, Body::from(bytes)).into_response();
    response.headers_mut().extend(headers);
    response
        .headers_mut()
        .insert(SERVICE_HEADER, resolved.route.service_header.clone());
    Ok(response)
}

fn upstream_error(route_id: &str, err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        tracing::error!("Upstream {} timed out: {}", route_id, err);
        ApiError::gateway_timeout(format!("Service {} did not respond in time", route_id))
    } else {
        tracing::error!("Upstream {} failed: {}", route_id, err);
        ApiError::bad_gateway(format!("Service {} is unavailable", route_id))
    }
}
