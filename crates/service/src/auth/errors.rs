use thiserror::Error;

/// Business errors for admin auth workflows
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("invalid credentials")]
    Unauthorized,
    #[error("admin login is not configured")]
    NotConfigured,
    #[error("session expired or invalid")]
    InvalidSession,
    #[error("hashing error: {0}")]
    HashError(String),
    #[error("token error: {0}")]
    TokenError(String),
}

impl AuthError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthError::Validation(_) => 1001,
            AuthError::Unauthorized => 1004,
            AuthError::NotConfigured => 1005,
            AuthError::InvalidSession => 1006,
            AuthError::HashError(_) => 1101,
            AuthError::TokenError(_) => 1102,
        }
    }
}
