use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use rand::rngs::OsRng;
use tracing::{info, warn};

use super::domain::{AdminSession, LoginInput, SessionClaims};
use super::errors::AuthError;

const SUBJECT: &str = "admin";

/// Admin auth configuration
#[derive(Clone)]
pub struct AdminAuthConfig {
    /// Plaintext secret or an argon2 PHC string; empty disables login.
    pub password: String,
    pub session_secret: String,
    pub session_ttl_secs: u64,
}

impl From<&configs::AdminConfig> for AdminAuthConfig {
    fn from(cfg: &configs::AdminConfig) -> Self {
        Self {
            password: cfg.password.clone(),
            session_secret: cfg.session_secret.clone(),
            session_ttl_secs: cfg.session_ttl_secs,
        }
    }
}

/// Verifies the admin secret and issues/checks HS256 session tokens.
pub struct AdminAuth {
    password_hash: Option<String>,
    session_secret: String,
    ttl_secs: u64,
}

impl AdminAuth {
    /// A plaintext password is hashed once here; a PHC string is used as is.
    pub fn new(cfg: AdminAuthConfig) -> Result<Self, AuthError> {
        let password_hash = match cfg.password.trim() {
            "" => None,
            phc if phc.starts_with("$argon2") => {
                PasswordHash::new(phc).map_err(|e| AuthError::HashError(e.to_string()))?;
                Some(phc.to_string())
            }
            plain => {
                let salt = SaltString::generate(&mut OsRng);
                let hash = Argon2::default()
                    .hash_password(plain.as_bytes(), &salt)
                    .map_err(|e| AuthError::HashError(e.to_string()))?
                    .to_string();
                Some(hash)
            }
        };
        Ok(Self { password_hash, session_secret: cfg.session_secret, ttl_secs: cfg.session_ttl_secs })
    }

    pub fn is_enabled(&self) -> bool { self.password_hash.is_some() }

    pub fn session_ttl_secs(&self) -> u64 { self.ttl_secs }

    /// Check the submitted secret and issue a session.
    pub fn login(&self, input: &LoginInput) -> Result<AdminSession, AuthError> {
        if input.password.is_empty() {
            return Err(AuthError::Validation("password is required".into()));
        }
        let Some(stored) = &self.password_hash else {
            warn!("admin login attempted but no password is configured");
            return Err(AuthError::NotConfigured);
        };
        let parsed = PasswordHash::new(stored).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            warn!("admin login rejected");
            return Err(AuthError::Unauthorized);
        }
        let token = self.issue_at(chrono::Utc::now().timestamp())?;
        info!(ttl_secs = self.ttl_secs, "admin_login");
        Ok(AdminSession { token, max_age_secs: self.ttl_secs })
    }

    fn issue_at(&self, now: i64) -> Result<String, AuthError> {
        let iat = now.max(0) as usize;
        let claims = SessionClaims { sub: SUBJECT.into(), iat, exp: iat + self.ttl_secs as usize };
        encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(self.session_secret.as_bytes()))
            .map_err(|e| AuthError::TokenError(e.to_string()))
    }

    /// Validate a session token: signature, expiry and subject.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        if token.is_empty() {
            return Err(AuthError::InvalidSession);
        }
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let data = decode::<SessionClaims>(token, &DecodingKey::from_secret(self.session_secret.as_bytes()), &validation)
            .map_err(|_| AuthError::InvalidSession)?;
        if data.claims.sub != SUBJECT {
            return Err(AuthError::InvalidSession);
        }
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth(password: &str) -> AdminAuth {
        AdminAuth::new(AdminAuthConfig {
            password: password.into(),
            session_secret: "test-secret".into(),
            session_ttl_secs: 3600,
        })
        .expect("auth")
    }

    fn login(a: &AdminAuth, password: &str) -> Result<AdminSession, AuthError> {
        a.login(&LoginInput { password: password.into() })
    }

    #[test]
    fn correct_password_issues_verifiable_session() -> anyhow::Result<()> {
        let a = auth("hunter22");
        let session = login(&a, "hunter22")?;
        assert_eq!(session.max_age_secs, 3600);
        let claims = a.verify(&session.token)?;
        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.exp - claims.iat, 3600);
        Ok(())
    }

    #[test]
    fn wrong_or_missing_password_is_rejected() {
        let a = auth("hunter22");
        assert!(matches!(login(&a, "nope"), Err(AuthError::Unauthorized)));
        assert!(matches!(login(&a, ""), Err(AuthError::Validation(_))));
    }

    #[test]
    fn unconfigured_password_disables_login() {
        let a = auth("   ");
        assert!(!a.is_enabled());
        assert!(matches!(login(&a, "anything"), Err(AuthError::NotConfigured)));
    }

    #[test]
    fn accepts_a_precomputed_hash() -> anyhow::Result<()> {
        let salt = SaltString::generate(&mut OsRng);
        let phc = Argon2::default()
            .hash_password(b"s3cret", &salt)
            .map_err(|e| anyhow::anyhow!(e.to_string()))?
            .to_string();
        let a = auth(&phc);
        assert!(login(&a, "s3cret").is_ok());
        assert!(login(&a, &phc).is_err());
        Ok(())
    }

    #[test]
    fn expired_tampered_or_foreign_tokens_fail() -> anyhow::Result<()> {
        let a = auth("pw");
        let expired = a.issue_at(chrono::Utc::now().timestamp() - 7200)?;
        assert!(matches!(a.verify(&expired), Err(AuthError::InvalidSession)));

        let mut tampered = login(&a, "pw")?.token;
        tampered.push('x');
        assert!(a.verify(&tampered).is_err());

        let other = AdminAuth::new(AdminAuthConfig {
            password: "pw".into(),
            session_secret: "different".into(),
            session_ttl_secs: 3600,
        })?;
        let foreign = login(&other, "pw")?.token;
        assert!(a.verify(&foreign).is_err());
        assert!(a.verify("").is_err());
        Ok(())
    }
}
