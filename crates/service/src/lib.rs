//! Service layer for the site: the service catalog and its collaborators.
//! - `storage`: interchangeable catalog backends (JSON file, process memory, Firestore).
//! - `catalog`: the façade callers use; validates before any backend write and
//!   normalizes backend failures into `errors::CatalogError`.
//! - `query`: pure filtering, ordering and search over a fetched collection.
//! - `auth`: shared-secret admin login and signed session tokens.
//! - `contact`: contact-form validation, rate limiting and mail dispatch.

pub mod errors;
pub mod storage;
pub mod catalog;
pub mod query;
pub mod runtime;
pub mod auth;
pub mod contact;
