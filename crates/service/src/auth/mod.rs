//! Admin authentication: one shared secret, signed session tokens.
//!
//! The catalog never sees credentials; the HTTP layer asks this module to
//! issue a token on login and to verify it on every admin request.

pub mod domain;
pub mod errors;
pub mod service;

pub use errors::AuthError;
pub use service::{AdminAuth, AdminAuthConfig};
