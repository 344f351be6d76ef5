use models::FieldErrors;
use thiserror::Error;

/// Failures surfaced by the catalog façade, independent of the backend in use.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{0}")]
    ValidationFailed(FieldErrors),
    #[error("service `{0}` already exists")]
    Conflict(String),
    #[error("service `{0}` not found")]
    NotFound(String),
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl CatalogError {
    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            CatalogError::ValidationFailed(_) => "validation_failed",
            CatalogError::Conflict(_) => "conflict",
            CatalogError::NotFound(_) => "not_found",
            CatalogError::StorageUnavailable(_) => "storage_unavailable",
        }
    }
}

impl From<FieldErrors> for CatalogError {
    fn from(errs: FieldErrors) -> Self { Self::ValidationFailed(errs) }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
