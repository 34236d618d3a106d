// sunbridge-core/src/lib.rs

// Declare the top-level modules within the library crate
pub mod artwork;
pub mod autodetect;
pub mod commit;
pub mod merge;
pub mod plan;
pub mod resolve;
pub mod shortcut;

// Re-export key types for easier use by the CLI crate
pub use autodetect::AutoDetectedTitle;
pub use merge::{ArtworkCopy, MigrationPlan};
pub use shortcut::ShortcutRecord;
