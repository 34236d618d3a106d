// sunbridge-core/src/artwork.rs
//! Locates companion box-art for a shortcut.
//!
//! The legacy host keeps cover images under a `StreamingAssets` directory
//! beside the shortcut files, one subdirectory per title. It converts
//! everything to PNG, so only `box-art.png` needs to be considered.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

const ASSETS_DIR: &str = "StreamingAssets";
const BOX_ART_FILE: &str = "box-art.png";

/// Find the box-art image for `display_name` under the assets directory
/// beside the shortcut. Only existence and names are checked, never file
/// contents. Missing artwork is expected and yields `None`.
pub fn locate(source_dir: &Path, display_name: &str) -> Option<PathBuf> {
    let assets = source_dir.join(ASSETS_DIR);

    let exact = assets.join(display_name).join(BOX_ART_FILE);
    if exact.is_file() {
        return Some(exact);
    }

    // Case-insensitive fallback on the title directory name.
    for entry in fs::read_dir(&assets).ok()?.flatten() {
        let dir_name = entry.file_name();
        if dir_name.to_string_lossy().eq_ignore_ascii_case(display_name) {
            let candidate = entry.path().join(BOX_ART_FILE);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }

    debug!("no box-art found for '{display_name}' under {}", assets.display());
    None
}
