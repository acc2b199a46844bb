use anyhow::Result;
use std::path::PathBuf;

use colophon_core::schema::Database;
use colophon_etl::{migrate_remote_covers, refresh_cover_urls, Config, CoverStore};

pub async fn run_covers_migrate(config: &Config, db_path: PathBuf) -> Result<()> {
    log::info!("Starting cover migration");

    let db = Database::open(&db_path)?;
    let store = CoverStore::new(config.public_dir.clone())?;

    let report = migrate_remote_covers(&db, &store).await?;

    println!(
        "\n✓ Cover migration complete: {} migrated, {} skipped (of {})",
        report.migrated, report.skipped, report.total
    );
    if report.skipped > 0 {
        println!("  Skipped covers keep their remote URL; re-run to retry them");
    }

    Ok(())
}

pub fn run_covers_refresh(db_path: PathBuf) -> Result<()> {
    log::info!("Starting cover URL refresh");

    let db = Database::open(&db_path)?;
    let report = refresh_cover_urls(&db)?;

    println!(
        "\n✓ Cover refresh complete: {} updated, {} skipped (of {})",
        report.updated, report.skipped, report.total
    );

    Ok(())
}
