use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no {} cookie after login", leekbot_protocol::SESSION_COOKIE)]
    MissingSessionCookie,
    #[error("unauthorized")]
    Unauthorized,
    #[error("rate limited")]
    RateLimited,
    #[error("transport: {0}")]
    Transport(String),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl From<crate::transport::TransportError> for ApiError {
    fn from(e: crate::transport::TransportError) -> Self {
        ApiError::Transport(e.0)
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// Reasons an automatic session stops before its first fight.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("login failed: {0}")]
    Login(#[from] ApiError),
    #[error("API access check failed")]
    ApiAccess,
    #[error("no leek found")]
    NoLeeks,
}
