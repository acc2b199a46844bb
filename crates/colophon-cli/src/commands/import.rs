use anyhow::{Context, Result};
use std::path::PathBuf;

use colophon_core::schema::Database;
use colophon_etl::{Config, CorpusParser};

pub fn run_import(config: &Config, db_path: PathBuf, file: PathBuf) -> Result<()> {
    log::info!("Importing corpus from {}", file.display());

    let content = std::fs::read_to_string(&file)
        .with_context(|| format!("Failed to read corpus file {}", file.display()))?;

    let db = Database::open(&db_path)?;
    let parser = CorpusParser::new(config);

    let mut imported = 0usize;
    let mut failed = 0usize;
    for record in parser.candidates(&content) {
        match db.insert_book(&record) {
            Ok(id) => {
                log::debug!("Imported \"{}\" ({})", record.title, id);
                imported += 1;
            }
            Err(e) => {
                // One bad record must not sink the rest of the file.
                log::warn!("Could not store \"{}\": {}", record.title, e);
                failed += 1;
            }
        }
    }

    println!("\n✓ Import complete: {} records added, {} failed", imported, failed);
    if imported > 0 {
        println!("  Run `colophon enrich` to fetch metadata for them");
    }

    Ok(())
}
