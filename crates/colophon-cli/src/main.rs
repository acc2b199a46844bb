use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use colophon_etl::Config;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "colophon", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the database (default: ~/.local/share/colophon/colophon.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Import a corpus export into the catalog
    ///
    /// Reads a flat text export of a reading list and creates one catalog
    /// record per title/author pair. For each record found:
    ///
    /// - Strips a trailing "(<language> Edition)" annotation into the
    ///   record's language field
    /// - Skips subscription banners and promotional excerpt blocks
    /// - Assigns the configured default language and format
    /// - Stores the record with publisher "Unknown", awaiting enrichment
    ///
    /// The import is append-only: re-importing the same file creates
    /// duplicate records. Imported records carry no description yet; run
    /// 'colophon enrich' to fill in metadata from Google Books.
    ///
    /// Output:
    /// - Summary showing records added and failed
    ///
    /// Database: records are stored in the 'books' table. Use 'colophon
    /// status' to view catalog counts.
    Import {
        /// Path to the corpus export file
        path: PathBuf,
    },
    /// Enrich records with metadata from Google Books
    Enrich {
        /// Maximum records to process this run (default: configured batch size)
        #[arg(long)]
        limit: Option<usize>,

        /// Requeue records previously marked not-found before running
        #[arg(long)]
        reset: bool,

        /// Embed newly enriched records afterwards
        #[arg(long)]
        embed: bool,
    },
    /// Embed records for semantic search
    Embed {
        /// Re-embed every record, not just the missing ones
        #[arg(long)]
        all: bool,
    },
    /// Search the catalog semantically
    Search {
        /// Free-text query
        query: String,

        /// Maximum number of hits
        #[arg(long, default_value_t = colophon_search::DEFAULT_SEARCH_LIMIT)]
        limit: usize,
    },
    /// Maintain cover images
    Covers {
        #[command(subcommand)]
        action: CoversAction,
    },
    /// Show catalog status
    Status,
    /// Inspect or edit configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Debug, clap::Subcommand)]
enum CoversAction {
    /// Download remote covers into the local public directory
    Migrate,
    /// Rewrite provider cover URLs to the high-resolution form
    Refresh,
}

#[derive(Debug, clap::Subcommand)]
enum ConfigAction {
    /// Show the current effective configuration
    Show,
    /// Print a config value (or the whole file)
    Get {
        /// Config key to read
        key: Option<String>,
    },
    /// Set a config value
    Set {
        /// Config key to write
        key: String,
        /// New value
        value: String,
    },
    /// Print the config file path
    Path,
    /// Print an example configuration
    Example,
    /// Create the config file with defaults
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match cli.db {
        Some(path) => Config::load_with_db_path(path)?,
        None => Config::load()?,
    };
    let db_path = config.database_path.clone();

    // Ensure database directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    match cli.command {
        Commands::Import { path } => {
            commands::run_import(&config, db_path, path)?;
        }
        Commands::Enrich {
            limit,
            reset,
            embed,
        } => {
            if let Some(limit) = limit {
                config.enrich_batch_size = limit;
            }
            commands::run_enrich(&config, db_path, reset, embed).await?;
        }
        Commands::Embed { all } => {
            commands::run_embed(&config, db_path, all)?;
        }
        Commands::Search { query, limit } => {
            commands::run_search(&config, db_path, &query, limit)?;
        }
        Commands::Covers { action } => match action {
            CoversAction::Migrate => commands::run_covers_migrate(&config, db_path).await?,
            CoversAction::Refresh => commands::run_covers_refresh(db_path)?,
        },
        Commands::Status => {
            commands::show_status(db_path)?;
        }
        Commands::Config { action } => match action.unwrap_or(ConfigAction::Show) {
            ConfigAction::Show => commands::config::show_config()?,
            ConfigAction::Get { key } => commands::config::get_config(key)?,
            ConfigAction::Set { key, value } => commands::config::set_config(key, value)?,
            ConfigAction::Path => commands::config::show_path()?,
            ConfigAction::Example => commands::config::show_example()?,
            ConfigAction::Init => commands::config::init_config()?,
        },
    }

    Ok(())
}
