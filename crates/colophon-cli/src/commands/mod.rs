pub mod config;
pub mod covers;
pub mod embed;
pub mod enrich;
pub mod import;
pub mod search;
pub mod status;

pub use covers::{run_covers_migrate, run_covers_refresh};
pub use embed::run_embed;
pub use enrich::run_enrich;
pub use import::run_import;
pub use search::run_search;
pub use status::show_status;
