// sunbridge-core/src/autodetect.rs
//! Auto-detected titles from the legacy host's own detection backend.
//!
//! Enumerating them is the host platform's job; their export enters here
//! as a read-only JSON manifest mapping opaque identifiers to display
//! names and streaming command lines.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use sunbridge_common::error::Result;

use crate::resolve::normalize_identifier;

/// One title the legacy host detected on its own, referenced internally
/// by an opaque UUID-shaped identifier rather than a literal path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoDetectedTitle {
    pub id: String,
    pub name: String,
    /// Streaming command line; may be empty, in which case the title
    /// cannot be imported.
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub working_dir: String,
    /// Pre-resolved box-art source, when the backend exported one.
    #[serde(default)]
    pub box_art: Option<PathBuf>,
}

/// Load the auto-detected title manifest, keyed by canonicalized
/// identifier so shortcut targets can be matched regardless of casing or
/// brace style.
pub fn load_titles(path: &Path) -> Result<HashMap<String, AutoDetectedTitle>> {
    let raw = fs::read_to_string(path)?;
    let titles: Vec<AutoDetectedTitle> = serde_json::from_str(&raw)?;
    debug!("loaded {} auto-detected titles from {}", titles.len(), path.display());

    Ok(titles
        .into_iter()
        .map(|t| {
            let key = normalize_identifier(&t.id).unwrap_or_else(|| t.id.to_lowercase());
            (key, t)
        })
        .collect())
}
