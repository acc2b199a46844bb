//! Metadata enrichment stage.
//!
//! The orchestrator walks never-enriched records and writes provider
//! results back one record at a time; resilience holds the pacing
//! primitive shared by provider clients.

pub mod orchestrator;
pub mod resilience;
