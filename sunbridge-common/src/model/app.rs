use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where a candidate catalog entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppSource {
    /// Decoded from a shortcut file on disk.
    ShortcutFile,
    /// Synthesized from the legacy host's auto-detected title list.
    AutoDetected,
}

/// Canonical, catalog-ready representation of one application.
///
/// The `name` is the identity key used for duplicate detection during a
/// merge; it is always non-empty and trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedApp {
    pub name: String,
    pub command: String,
    pub args: Vec<String>,
    pub working_dir: String,
    /// Box-art image to copy before the entry becomes usable. `None` when
    /// no artwork was located, which is expected and non-fatal.
    pub image_path: Option<PathBuf>,
    /// Detached launches (URIs, `start` commands) go into the catalog
    /// entry's `detached` array instead of `cmd`.
    pub detached: bool,
    pub source: AppSource,
}

impl ResolvedApp {
    /// Log file name the destination host should write for this entry.
    pub fn logfile(&self) -> String {
        format!("{}.log", self.name.to_lowercase().replace(' ', "_"))
    }

    /// The full launch line: command plus tokenized arguments.
    pub fn launch_line(&self) -> String {
        if self.args.is_empty() {
            self.command.clone()
        } else {
            format!("{} {}", self.command, self.args.join(" "))
        }
    }
}
