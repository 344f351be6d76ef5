use std::sync::Arc;

use service::auth::AdminAuth;
use service::catalog::CatalogService;
use service::contact::ContactService;

/// Shared handler state. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogService,
    pub auth: Arc<AdminAuth>,
    pub contact: Arc<ContactService>,
    /// Mark the session cookie `Secure`.
    pub secure_cookie: bool,
}
