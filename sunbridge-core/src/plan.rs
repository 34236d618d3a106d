// sunbridge-core/src/plan.rs
//! Orchestrates one migration run: decode every discovered shortcut,
//! optionally fold in auto-detected titles, locate artwork, then merge.
//!
//! Planning performs no filesystem writes; committing a plan is
//! [`crate::commit`]'s job and is skipped entirely in preview mode.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use sunbridge_common::model::{AppSource, CatalogDocument, ResolvedApp};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::autodetect::AutoDetectedTitle;
use crate::merge::{self, MigrationPlan};
use crate::resolve::normalize_launch;
use crate::{artwork, resolve, shortcut};

/// List the shortcut files in the top level of `dir`, sorted for a
/// deterministic discovery order.
pub fn discover_shortcuts(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .map(|ext| ext.eq_ignore_ascii_case("lnk"))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    files
}

/// Build the migration plan for one run.
///
/// A decode or resolve failure on one file is recorded as a warning and
/// excludes that file; it never aborts the run. When `include_auto` is
/// set, one candidate is synthesized per auto-detected title that is not
/// already represented among the shortcut-derived candidates by name.
pub fn plan(
    shortcut_files: &[PathBuf],
    existing: &CatalogDocument,
    auto_titles: &HashMap<String, AutoDetectedTitle>,
    include_auto: bool,
    image_dir: &Path,
) -> MigrationPlan {
    let mut warnings = Vec::new();
    let mut candidates: Vec<ResolvedApp> = Vec::new();

    for file in shortcut_files {
        let record = match shortcut::decode(file) {
            Ok(record) => record,
            Err(e) => {
                warn!("skipping shortcut {}: {e}", file.display());
                warnings.push(format!("Skipped {}: {e}", file.display()));
                continue;
            }
        };
        let mut app = match resolve::resolve(&record, auto_titles) {
            Ok(app) => app,
            Err(e) => {
                warn!("skipping shortcut {}: {e}", file.display());
                warnings.push(format!("Skipped {}: {e}", file.display()));
                continue;
            }
        };
        debug!("found app '{}' (target: {})", app.name, record.target_path);

        let source_dir = file.parent().unwrap_or(Path::new("."));
        app.image_path = artwork::locate(source_dir, &app.name)
            .or_else(|| icon_fallback(&record.icon_path));

        candidates.push(app);
    }

    if include_auto {
        candidates.extend(auto_candidates(auto_titles, &candidates, &mut warnings));
    }

    let mut plan = merge::merge(existing, &candidates, image_dir);
    plan.warnings = warnings;
    plan
}

/// The shortcut's icon resource doubles as an artwork hint when the assets
/// directory had nothing; only existing PNG files qualify.
fn icon_fallback(icon_path: &str) -> Option<PathBuf> {
    if icon_path.is_empty() {
        return None;
    }
    let path = PathBuf::from(icon_path);
    let is_png = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("png"))
        .unwrap_or(false);
    (is_png && path.is_file()).then_some(path)
}

fn auto_candidates(
    auto_titles: &HashMap<String, AutoDetectedTitle>,
    existing_candidates: &[ResolvedApp],
    warnings: &mut Vec<String>,
) -> Vec<ResolvedApp> {
    let mut titles: Vec<&AutoDetectedTitle> = auto_titles.values().collect();
    titles.sort_by(|a, b| a.name.cmp(&b.name));

    let mut synthesized = Vec::new();
    for title in titles {
        // The legacy host lists Steam itself as a streamable title; the
        // destination ships its own Steam entry.
        if title.name == "Steam" {
            debug!("skipping auto-detected Steam entry");
            continue;
        }
        if title.command.is_empty() {
            warnings.push(format!(
                "{} has no streaming command line. Skipping",
                title.name
            ));
            continue;
        }
        if existing_candidates.iter().any(|c| c.name == title.name) {
            debug!(
                "auto-detected '{}' already represented by a shortcut",
                title.name
            );
            continue;
        }

        let (command, working_dir, detached) =
            normalize_launch(&title.command, &title.working_dir);
        synthesized.push(ResolvedApp {
            name: title.name.clone(),
            command,
            args: Vec::new(),
            working_dir,
            image_path: title.box_art.clone().filter(|p| p.is_file()),
            detached,
            source: AppSource::AutoDetected,
        });
    }
    synthesized
}
