use anyhow::Result;
use std::path::PathBuf;

use colophon_core::schema::Database;

pub fn show_status(db_path: PathBuf) -> Result<()> {
    let db = Database::open(&db_path)?;
    let stats = db.stats()?;

    println!("\n📚 Colophon Status\n");
    println!("  Database: {}", db_path.display());
    println!("  Books:    {}", stats.total);
    println!();
    println!("  Enrichment:");
    println!("    pending:   {}", stats.pending);
    println!("    enriched:  {}", stats.enriched);
    println!("    not found: {}", stats.not_found);
    println!();
    println!("  Embedded:  {} of {}", stats.embedded, stats.total);
    println!("  Covers:    {} local, {} remote", stats.local_covers, stats.remote_covers);

    if stats.pending > 0 {
        println!("\n  Run `colophon enrich` to fetch metadata for pending records");
    }
    if stats.embedded < stats.total {
        println!("  Run `colophon embed` to index records for search");
    }

    Ok(())
}
