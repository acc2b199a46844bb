//! Core domain model for colophon.
//!
//! This crate defines the book catalog data model, the SQLite-backed
//! store with its schema migrations, and the byte-level embedding
//! codec shared by the ingestion and search crates.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod embedding;
pub mod error;
pub mod model;
pub mod schema;

pub use error::{Error, Result};
