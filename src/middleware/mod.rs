pub mod identity;
pub mod response;

pub use identity::{header_text, CurrentProfile, JsonBody, SessionToken};
pub use response::{ApiResponse, ApiResult};

/// Session credential issued by the user service at login
pub const SESSION_HEADER: &str = "x-session-id";
/// Profile id set by the gateway for verified sessions
pub const USER_ID_HEADER: &str = "x-user-id";
/// Route id of the service that produced a proxied response
pub const SERVICE_HEADER: &str = "x-service";
