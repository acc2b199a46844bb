use anyhow::Result;
use std::path::PathBuf;

use colophon_core::schema::Database;
use colophon_etl::Config;
use colophon_search::{reindex, ReindexScope, SentenceEmbedder};

pub fn run_embed(config: &Config, db_path: PathBuf, all: bool) -> Result<()> {
    log::info!("Starting embedding pass");

    let db = Database::open(&db_path)?;
    let scope = if all {
        ReindexScope::All
    } else {
        ReindexScope::Missing
    };

    let embedder = SentenceEmbedder::new(&config.model_cache_dir)?;
    let report = reindex(&db, &embedder, scope)?;

    println!(
        "\n✓ Indexing complete: {} embedded, {} failed (of {} examined)",
        report.embedded, report.failed, report.examined
    );

    Ok(())
}
