// src/model/mod.rs
// Declares the modules within the model directory.

pub mod app;
pub mod catalog;

// Re-export
pub use app::{AppSource, ResolvedApp};
pub use catalog::{CatalogDocument, CatalogEntry};
