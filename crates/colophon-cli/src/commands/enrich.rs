use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;

use colophon_core::schema::Database;
use colophon_etl::{Config, Enricher, GoogleBooksClient};
use colophon_search::{reindex, ReindexScope, SentenceEmbedder};

pub async fn run_enrich(config: &Config, db_path: PathBuf, reset: bool, embed: bool) -> Result<()> {
    log::info!("Starting enrichment");

    let db = Database::open(&db_path)?;

    if reset {
        let requeued = db.reset_not_found()?;
        println!("↺ Requeued {} not-found records", requeued);
    }

    let provider = GoogleBooksClient::new(Duration::from_millis(config.provider_delay_ms))?;
    let enricher = Enricher::new(provider, config.enrich_batch_size);
    let report = enricher.run(&db).await?;

    println!("\n✓ Enrichment complete");
    println!("  Examined:  {}", report.examined);
    println!("  Enriched:  {}", report.enriched);
    println!("  Not found: {}", report.not_found);
    println!("  Failed:    {}", report.failed);

    if report.examined == config.enrich_batch_size {
        println!("\n  Batch limit reached; run `colophon enrich` again for the rest");
    }

    if embed {
        // Enrichment clears the vector of every record it touched, so
        // the missing scope re-embeds exactly the updated records.
        let embedder = SentenceEmbedder::new(&config.model_cache_dir)?;
        let indexed = reindex(&db, &embedder, ReindexScope::Missing)?;
        println!(
            "\n✓ Indexed {} records ({} failed)",
            indexed.embedded, indexed.failed
        );
    }

    Ok(())
}
