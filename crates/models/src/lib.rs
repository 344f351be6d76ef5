//! Catalog record types shared by storage, service and HTTP layers.
//! - `service`: the Service record, its value types and the update patch.
//! - `validation`: all-or-nothing payload validation with field-level errors.
//! - `seed`: the default collection every backend falls back to.

pub mod errors;
pub mod service;
pub mod validation;
pub mod seed;

pub use errors::FieldErrors;
pub use service::{Faq, NewService, Seo, Service, ServicePatch};
