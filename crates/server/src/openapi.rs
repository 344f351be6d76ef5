//! Documentation-only schemas and the OpenAPI document served at
//! `/api-docs/openapi.json`.

use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct FaqDoc { pub question: String, pub answer: String }

#[derive(ToSchema)]
pub struct SeoDoc {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Vec<String>,
}

/// A catalog entry. Field names are camelCase on the wire.
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ServiceDoc {
    pub id: Option<String>,
    pub slug: String,
    pub name: String,
    pub short_description: String,
    pub description: String,
    pub features: Vec<String>,
    pub highlights: Vec<String>,
    pub faqs: Vec<FaqDoc>,
    pub images: Vec<String>,
    pub order: u32,
    pub seo: Option<SeoDoc>,
    pub active: bool,
    /// RFC 3339 timestamp assigned by storage.
    pub last_updated: String,
}

/// Partial update; `slug`, `id` and `lastUpdated` are ignored.
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ServicePatchDoc {
    pub name: Option<String>,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub features: Option<Vec<String>>,
    pub highlights: Option<Vec<String>>,
    pub faqs: Option<Vec<FaqDoc>>,
    pub images: Option<Vec<String>>,
    pub order: Option<u32>,
    pub seo: Option<SeoDoc>,
    pub active: Option<bool>,
}

#[derive(ToSchema)]
pub struct ServiceListDoc {
    pub services: Vec<ServiceDoc>,
    /// `primary` or `fallback`.
    pub source: String,
}

#[derive(ToSchema)]
pub struct LoginRequest { pub password: String }

#[derive(ToSchema)]
pub struct RenameRequest { pub slug: String }

#[derive(ToSchema)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub service: Option<String>,
    pub message: String,
    pub honeypot: Option<String>,
    pub timestamp: Option<i64>,
}

#[derive(ToSchema)]
pub struct AckDoc { pub success: bool, pub message: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::services::list,
        crate::routes::services::search,
        crate::routes::services::get,
        crate::routes::contact::submit,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::admin::list,
        crate::routes::admin::create,
        crate::routes::admin::get,
        crate::routes::admin::update,
        crate::routes::admin::remove,
        crate::routes::admin::rename,
        crate::routes::admin::import,
    ),
    components(
        schemas(
            HealthResponse,
            FaqDoc,
            SeoDoc,
            ServiceDoc,
            ServicePatchDoc,
            ServiceListDoc,
            LoginRequest,
            RenameRequest,
            ContactRequest,
            AckDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "services"),
        (name = "contact"),
        (name = "auth"),
        (name = "admin")
    )
)]
pub struct ApiDoc;
