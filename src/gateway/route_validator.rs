use crate::config::GatewayConfig;

/// Allow-list of paths reachable without a session.
///
/// Matching is exact and case-sensitive on the path component only; no
/// trailing-slash or case normalization is applied.
#[derive(Debug, Clone)]
pub struct RouteValidator {
    open_endpoints: Vec<String>,
}

impl RouteValidator {
    pub fn new<I, S>(open_endpoints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            open_endpoints: open_endpoints.into_iter().map(Into::into).collect(),
        }
    }

    /// `false` iff `path` is an open endpoint
    pub fn is_secured(&self, path: &str) -> bool {
        !self.open_endpoints.iter().any(|open| open == path)
    }

    pub fn open_endpoints(&self) -> &[String] {
        &self.open_endpoints
    }
}

impl Default for RouteValidator {
    fn default() -> Self {
        Self::new(GatewayConfig::default_open_endpoints())
    }
}
