//! Load the built-in catalog into the configured backend.
//!
//! Existing slugs are left alone, so running this twice is harmless.

use anyhow::Context;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    common::utils::logging::init_logging_from_env();

    let cfg = configs::AppConfig::load_and_validate().context("loading configuration")?;
    let catalog = service::runtime::build_catalog(&cfg).await?;
    if !catalog.is_durable() {
        warn!(backend = catalog.backend_name(), "backend is not durable; imported records vanish on exit");
    }

    let payloads = models::seed::default_services()
        .into_iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;
    let report = catalog.import(&payloads).await?;

    info!(
        backend = catalog.backend_name(),
        created = report.created.len(),
        skipped = report.skipped.len(),
        invalid = report.invalid.len(),
        "import finished"
    );
    for slug in &report.created { println!("created  {slug}"); }
    for slug in &report.skipped { println!("skipped  {slug}"); }
    for (slug, errs) in &report.invalid {
        let fields: Vec<_> = errs.iter().map(|(k, v)| format!("{k}: {v}")).collect();
        println!("invalid  {slug} ({})", fields.join(", "));
    }
    Ok(())
}
