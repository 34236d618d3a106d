// sunbridge-core/src/commit.rs
//! Materializes a [`MigrationPlan`]: copies box-art and rewrites the
//! catalog file.
//!
//! The commit is best-effort across files, not transactional: artwork
//! copies that already happened are not rolled back when a later step
//! fails. The catalog itself is replaced atomically, so a crash mid-write
//! never leaves a truncated file.

use std::fs;
use std::path::Path;

use sunbridge_common::error::{Result, SunbridgeError};
use tracing::{debug, info, warn};

use crate::merge::MigrationPlan;

/// Apply the plan: create the image directory, perform the artwork copies,
/// then atomically rewrite the catalog at `apps_path`.
pub fn commit(plan: &MigrationPlan, apps_path: &Path, image_dir: &Path) -> Result<()> {
    if !plan.artwork.is_empty() {
        fs::create_dir_all(image_dir).map_err(|e| {
            SunbridgeError::CatalogWrite(format!(
                "failed to create image directory {}: {e}",
                image_dir.display()
            ))
        })?;
    }

    for copy in &plan.artwork {
        if copy.destination.is_file() {
            // First import wins; user-replaced art stays untouched.
            debug!("box-art already present at {}", copy.destination.display());
            continue;
        }
        if !copy.source.is_file() {
            warn!("No box-art image found at: {}", copy.source.display());
            continue;
        }
        fs::copy(&copy.source, &copy.destination).map_err(|e| {
            SunbridgeError::CatalogWrite(format!(
                "failed to copy box-art {} to {}: {e}",
                copy.source.display(),
                copy.destination.display()
            ))
        })?;
        info!("Copied box-art image to: {}", copy.destination.display());
    }

    plan.catalog.save_atomic(apps_path)
}
