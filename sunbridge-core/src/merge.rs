// sunbridge-core/src/merge.rs
//! Reconciles candidate applications against the existing catalog.
//!
//! The duplicate policy is deliberate: pre-existing catalog entries always
//! win and are never overwritten, and within one batch the first candidate
//! with a given name wins. Existing entries are never mutated, reordered
//! or removed; new entries are appended in discovery order. Merging is a
//! pure function of its inputs, so re-running an applied plan skips every
//! candidate and adds nothing.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use sunbridge_common::model::{CatalogDocument, CatalogEntry, ResolvedApp};
use tracing::debug;

/// One pending box-art copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtworkCopy {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Everything a run would change, computed before any destructive action.
/// Either committed as a whole or discarded; never partially applied.
#[derive(Debug, Clone)]
pub struct MigrationPlan {
    pub catalog: CatalogDocument,
    /// Names appended to the catalog, in discovery order.
    pub added: Vec<String>,
    /// Names skipped because they were already present (in the catalog or
    /// earlier in the same batch).
    pub skipped: Vec<String>,
    pub artwork: Vec<ArtworkCopy>,
    /// Per-file and per-record problems accumulated during planning,
    /// reported once at the end of the run.
    pub warnings: Vec<String>,
}

/// Merge `candidates` into `existing`, producing the plan.
///
/// `image_dir` determines the deterministic box-art destination
/// (`<image_dir>/<name>.png`) recorded both in the new entry and in the
/// copy instruction.
pub fn merge(
    existing: &CatalogDocument,
    candidates: &[ResolvedApp],
    image_dir: &Path,
) -> MigrationPlan {
    let mut catalog = existing.clone();
    let mut taken: HashSet<String> = catalog.apps.iter().map(|a| a.name.clone()).collect();

    let mut added = Vec::new();
    let mut skipped = Vec::new();
    let mut artwork = Vec::new();

    for app in candidates {
        if taken.contains(&app.name) {
            debug!("'{}' already exists in the catalog, skipping", app.name);
            skipped.push(app.name.clone());
            continue;
        }

        let mut entry = CatalogEntry::new(app.name.clone());
        entry.output = Some(app.logfile());
        let launch = app.launch_line();
        if app.detached {
            entry.detached = Some(vec![launch]);
        } else {
            entry.cmd = Some(launch);
        }
        if !app.working_dir.is_empty() {
            entry.working_dir = Some(app.working_dir.clone());
        }
        if let Some(source) = &app.image_path {
            let destination = image_dir.join(format!("{}.png", app.name));
            entry.image_path = Some(destination.to_string_lossy().into_owned());
            artwork.push(ArtworkCopy {
                source: source.clone(),
                destination,
            });
        }

        catalog.apps.push(entry);
        taken.insert(app.name.clone());
        added.push(app.name.clone());
    }

    MigrationPlan {
        catalog,
        added,
        skipped,
        artwork,
        warnings: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use sunbridge_common::model::AppSource;

    use super::*;

    fn app(name: &str) -> ResolvedApp {
        ResolvedApp {
            name: name.to_string(),
            command: format!("C:\\Games\\{name}\\{}.exe", name.to_lowercase()),
            args: Vec::new(),
            working_dir: format!("C:\\Games\\{name}"),
            image_path: None,
            detached: false,
            source: AppSource::ShortcutFile,
        }
    }

    fn existing_with(names: &[&str]) -> CatalogDocument {
        let mut doc = CatalogDocument::default();
        for name in names {
            doc.apps.push(CatalogEntry::new(*name));
        }
        doc
    }

    #[test]
    fn existing_entry_wins_over_candidate() {
        let mut existing = existing_with(&["Chess"]);
        existing.apps[0].cmd = Some("original.exe".to_string());

        let plan = merge(
            &existing,
            &[app("Chess"), app("Solitaire")],
            Path::new("/images"),
        );

        assert_eq!(plan.added, vec!["Solitaire"]);
        assert_eq!(plan.skipped, vec!["Chess"]);
        assert_eq!(plan.catalog.apps.len(), 2);
        // The pre-existing entry is untouched.
        assert_eq!(plan.catalog.apps[0].cmd.as_deref(), Some("original.exe"));
    }

    #[test]
    fn first_writer_wins_within_a_batch() {
        let plan = merge(
            &CatalogDocument::default(),
            &[app("Chess"), app("Chess")],
            Path::new("/images"),
        );
        assert_eq!(plan.added, vec!["Chess"]);
        assert_eq!(plan.skipped, vec!["Chess"]);
        assert_eq!(plan.catalog.apps.len(), 1);
    }

    #[test]
    fn merge_is_idempotent() {
        let candidates = vec![app("Chess"), app("Solitaire")];
        let first = merge(&CatalogDocument::default(), &candidates, Path::new("/i"));
        let second = merge(&first.catalog, &candidates, Path::new("/i"));

        assert!(second.added.is_empty());
        assert_eq!(second.skipped, vec!["Chess", "Solitaire"]);
        assert_eq!(second.catalog.apps, first.catalog.apps);
    }

    #[test]
    fn existing_order_is_a_prefix_of_the_result() {
        let existing = existing_with(&["Zelda", "Asteroids", "Myst"]);
        let plan = merge(&existing, &[app("Chess")], Path::new("/i"));

        let names: Vec<&str> = plan.catalog.apps.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Zelda", "Asteroids", "Myst", "Chess"]);
    }

    #[test]
    fn image_path_produces_copy_instruction() {
        let mut chess = app("Chess");
        chess.image_path = Some(PathBuf::from("/shield/StreamingAssets/Chess/box-art.png"));

        let plan = merge(&CatalogDocument::default(), &[chess], Path::new("/images"));

        assert_eq!(plan.artwork.len(), 1);
        assert_eq!(
            plan.artwork[0].destination,
            PathBuf::from("/images/Chess.png")
        );
        assert_eq!(
            plan.catalog.apps[0].image_path.as_deref(),
            Some("/images/Chess.png")
        );
    }

    #[test]
    fn detached_apps_use_the_detached_field() {
        let mut big_picture = app("Steam Big Picture");
        big_picture.command = "steam steam://open/bigpicture".to_string();
        big_picture.detached = true;

        let plan = merge(&CatalogDocument::default(), &[big_picture], Path::new("/i"));
        let entry = &plan.catalog.apps[0];
        assert!(entry.cmd.is_none());
        assert_eq!(
            entry.detached.as_deref(),
            Some(&["steam steam://open/bigpicture".to_string()][..])
        );
        assert_eq!(entry.output.as_deref(), Some("steam_big_picture.log"));
    }
}
