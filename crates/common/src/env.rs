//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

use tracing::{info, warn};

/// Ensure the parent directory of the catalog data file exists.
///
/// Only relevant for the file-backed store; other backends never touch disk.
pub async fn ensure_data_dir(data_file: &Path) -> anyhow::Result<()> {
    let Some(dir) = data_file.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };
    if tokio::fs::metadata(dir).await.is_ok() {
        return Ok(());
    }
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", dir.display()))?;
    info!(dir = %dir.display(), "created data directory");
    Ok(())
}

/// Warn about configuration that is legal but almost certainly a mistake in production.
pub fn warn_on_dev_defaults(session_secret: &str, admin_password_set: bool) {
    if session_secret == DEV_SESSION_SECRET {
        warn!("SESSION_SECRET not set; using the development default");
    }
    if !admin_password_set {
        warn!("ADMIN_PASSWORD not set; admin login is disabled");
    }
}

/// Session signing secret used when none is configured.
pub const DEV_SESSION_SECRET: &str = "dev-secret-change-me";
