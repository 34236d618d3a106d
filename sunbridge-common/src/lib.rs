// sunbridge-common/src/lib.rs
pub mod config;
pub mod error;
pub mod model;

// Re-export key types
pub use config::Config;
pub use error::{Result, SunbridgeError};
pub use model::{AppSource, CatalogDocument, CatalogEntry, ResolvedApp};
