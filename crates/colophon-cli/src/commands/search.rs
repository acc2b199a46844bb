use anyhow::Result;
use std::path::PathBuf;

use colophon_core::schema::Database;
use colophon_etl::Config;
use colophon_search::{search, SentenceEmbedder};

pub fn run_search(config: &Config, db_path: PathBuf, query: &str, limit: usize) -> Result<()> {
    let db = Database::open(&db_path)?;
    let embedder = SentenceEmbedder::new(&config.model_cache_dir)?;

    let hits = search(&db, &embedder, query, limit)?;

    if hits.is_empty() {
        println!("No indexed records. Run `colophon embed` first.");
        return Ok(());
    }

    println!("\n🔎 Results for \"{}\"\n", query);
    for (rank, hit) in hits.iter().enumerate() {
        println!(
            "  {}. [{:.3}] {} ({})",
            rank + 1,
            hit.score,
            hit.book.title,
            hit.book.author
        );
    }

    Ok(())
}
