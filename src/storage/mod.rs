//! Persistent document storage

pub mod database;

pub use database::{DocumentDb, DocumentListQuery};
