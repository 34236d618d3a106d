// src/model/catalog.rs
// The destination host's `apps.json` document.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Result, SunbridgeError};

/// One launchable application in the destination catalog.
///
/// Only the fields sunbridge itself writes are typed; anything else an
/// existing entry carries (prep commands, elevation flags, ...) is kept in
/// `extra` and round-trips through a merge untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmd: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detached: Option<Vec<String>>,

    #[serde(rename = "working-dir", skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,

    #[serde(rename = "image-path", skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The whole `apps.json` document. Insertion order of `apps` is preserved
/// across load, merge and save; top-level fields like `env` are carried
/// through verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub apps: Vec<CatalogEntry>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CatalogDocument {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(SunbridgeError::NotFound(format!(
                "Catalog file {} does not exist. If you used the Sunshine installer, run \
                 Sunshine once so the default apps.json is created, or pass --apps with the \
                 full path of the file.",
                path.display()
            )));
        }

        let raw = fs::read_to_string(path)?;
        let doc: CatalogDocument = serde_json::from_str(&raw).map_err(|e| {
            SunbridgeError::CatalogParse(format!("{}: {e}", path.display()))
        })?;
        debug!("Loaded catalog with {} entries from {}", doc.apps.len(), path.display());
        Ok(doc)
    }

    /// Case-sensitive exact-name membership test.
    pub fn has_app(&self, name: &str) -> bool {
        self.apps.iter().any(|app| app.name == name)
    }

    /// Serialize with four-space indentation, matching the formatting the
    /// destination host itself writes.
    pub fn to_json_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        String::from_utf8(buf)
            .map_err(|e| SunbridgeError::CatalogWrite(format!("catalog is not valid UTF-8: {e}")))
    }

    /// Atomically replace the catalog file: serialize to a temp file in the
    /// same directory, then rename over the target. A crash mid-write can
    /// never leave a truncated catalog behind.
    pub fn save_atomic(&self, path: &Path) -> Result<()> {
        use std::io::Write;

        let serialized = self.to_json_string()?;
        let dir = path.parent().ok_or_else(|| {
            SunbridgeError::CatalogWrite(format!("{} has no parent directory", path.display()))
        })?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| {
            SunbridgeError::CatalogWrite(format!(
                "failed to create temp file in {}: {e}",
                dir.display()
            ))
        })?;
        tmp.write_all(serialized.as_bytes()).map_err(|e| {
            SunbridgeError::CatalogWrite(format!("failed to write catalog data: {e}"))
        })?;
        tmp.persist(path).map_err(|e| {
            SunbridgeError::CatalogWrite(format!(
                "failed to replace {}: {e}",
                path.display()
            ))
        })?;

        debug!("Wrote catalog with {} entries to {}", self.apps.len(), path.display());
        Ok(())
    }
}

impl CatalogEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            output: None,
            cmd: None,
            detached: None,
            working_dir: None,
            image_path: None,
            extra: Map::new(),
        }
    }
}
