//! Application entry point for vk-harvest.
//!
//! Runs one sync pass: member bootstrap if the store is empty, then one
//! crawl batch.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use dotenv::dotenv;
use log::debug;
use log::info;

use vk_harvest::config::Config;
use vk_harvest::database::Database;
use vk_harvest::logging::setup_logging;
use vk_harvest::service::Services;
use vk_harvest::vk::VkClient;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let init_start = Instant::now();
    let config = load_config()?;
    let db = setup_database(&config, init_start).await?;

    let client = Arc::new(VkClient::new(&config));
    let services = Services::new(db, client, &config);

    let report = services.sync.run().await?;

    if let Some(bootstrap) = &report.bootstrap {
        info!(
            "Bootstrap: {} of {} members stored across {} pages.",
            bootstrap.members_stored, bootstrap.members_total, bootstrap.pages
        );
    }
    info!(
        "Crawl: {} processed, {} deleted, {} skipped, {} still unprocessed ({:.2}s total).",
        report.crawl.processed,
        report.crawl.deleted,
        report.crawl.skipped,
        report.crawl.remaining,
        init_start.elapsed().as_secs_f64()
    );

    Ok(())
}

fn load_config() -> Result<Config> {
    debug!("Loading configuration...");
    let config = Config::load()?;
    setup_logging(&config)?;
    info!("Starting vk-harvest...");
    Ok(config)
}

async fn setup_database(config: &Config, init_start: Instant) -> Result<Arc<Database>> {
    debug!("Setting up Database...");
    let db = Arc::new(Database::new(&config.db_url, &config.db_path).await?);

    info!("Running database migrations...");
    db.run_migrations().await?;
    info!(
        "Database setup complete ({:.2}s).",
        init_start.elapsed().as_secs_f64()
    );

    Ok(db)
}
