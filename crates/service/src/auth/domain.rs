use serde::{Deserialize, Serialize};

/// Login request body.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub password: String,
}

/// Claims carried by an admin session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

/// An issued session: the signed token and its lifetime in seconds.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub token: String,
    pub max_age_secs: u64,
}
