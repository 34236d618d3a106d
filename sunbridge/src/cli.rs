// sunbridge/src/cli.rs
//! Defines the command-line argument structure using clap.
use std::path::PathBuf;

use clap::{ArgAction, Parser};
use colored::Colorize;
use sunbridge_common::config::Config;
use sunbridge_common::error::Result;
use sunbridge_common::model::CatalogDocument;
use sunbridge_core::{autodetect, commit, plan};
use tracing::{debug, warn};

#[derive(Parser, Debug)]
#[command(author, version, name = "sunbridge", bin_name = "sunbridge")]
#[command(about = "Migrates NVIDIA GameStream shortcuts and box-art into Sunshine's apps.json")]
pub struct CliArgs {
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Sunshine `apps.json` file to update, otherwise the file from the
    /// default Sunshine installation location is used
    #[arg(short, long)]
    pub apps: Option<PathBuf>,

    /// Directory to copy box-art into (default: Pictures/Sunshine)
    #[arg(short, long)]
    pub image_dir: Option<PathBuf>,

    /// Custom shortcut directory (default: the Shield Apps directory)
    #[arg(short, long)]
    pub shortcut_dir: Option<PathBuf>,

    /// Preview the changes that would be made without overwriting
    /// `apps.json` or copying box-art
    #[arg(short, long)]
    pub dry_run: bool,

    /// Also import the legacy host's automatically detected applications
    #[arg(short = 'n', long)]
    pub include_autodetected: bool,

    /// Auto-detected title manifest exported from the legacy host's backend
    #[arg(long)]
    pub autodetect_manifest: Option<PathBuf>,
}

impl CliArgs {
    pub fn run(&self, config: &Config) -> Result<()> {
        let apps_path = self.apps.clone().unwrap_or_else(|| config.apps_json.clone());
        let image_dir = self
            .image_dir
            .clone()
            .unwrap_or_else(|| config.image_dir.clone());
        let shortcut_dir = self
            .shortcut_dir
            .clone()
            .unwrap_or_else(|| config.shortcut_dir.clone());
        let manifest_path = self
            .autodetect_manifest
            .clone()
            .unwrap_or_else(|| config.autodetect_manifest.clone());

        // Document-level failures abort here, before anything is written.
        let existing = CatalogDocument::load(&apps_path)?;
        println!(
            "{}{}",
            "==> ".bold().blue(),
            format!(
                "Found apps.json with {} existing apps at {}",
                existing.apps.len(),
                apps_path.display()
            )
            .bold()
        );

        let shortcut_files = if shortcut_dir.is_dir() {
            plan::discover_shortcuts(&shortcut_dir)
        } else {
            warn!(
                "shortcut directory {} does not exist; nothing to discover",
                shortcut_dir.display()
            );
            Vec::new()
        };
        debug!("discovered {} shortcut files", shortcut_files.len());

        // The title map also serves identifier resolution for shortcuts, so
        // it is loaded whenever the manifest is around; a broken or missing
        // manifest only degrades matching, it never aborts the run.
        let mut preflight_warnings = Vec::new();
        let auto_titles = if manifest_path.is_file() {
            match autodetect::load_titles(&manifest_path) {
                Ok(titles) => titles,
                Err(e) => {
                    preflight_warnings
                        .push(format!("Could not load {}: {e}", manifest_path.display()));
                    Default::default()
                }
            }
        } else {
            if self.include_autodetected {
                preflight_warnings.push(format!(
                    "Auto-detect manifest {} not found; no auto-detected apps imported",
                    manifest_path.display()
                ));
            }
            Default::default()
        };

        let mut migration = plan::plan(
            &shortcut_files,
            &existing,
            &auto_titles,
            self.include_autodetected,
            &image_dir,
        );

        for name in &migration.added {
            println!("Found GameStream app: {name}");
        }
        for name in &migration.skipped {
            println!("{name} app already exists in Sunshine apps.json, skipping.");
        }
        if self.dry_run {
            for copy in &migration.artwork {
                println!(
                    "Would copy box-art: {} -> {}",
                    copy.source.display(),
                    copy.destination.display()
                );
            }
            println!(
                "{}{}",
                "==> ".bold().blue(),
                "Dry run: apps.json was not modified and no box-art was copied.".bold()
            );
        } else {
            commit::commit(&migration, &apps_path, &image_dir)?;
        }

        println!(
            "{}{}",
            "==> ".bold().blue(),
            "Completed importing GameStream games.".bold()
        );
        println!(
            "{}",
            format!("Added {} apps to Sunshine.", migration.added.len()).bold()
        );

        // All accumulated warnings come out once, after the summary.
        preflight_warnings.append(&mut migration.warnings);
        if !preflight_warnings.is_empty() {
            println!();
            println!("{}", "Warnings:".yellow().bold());
            for warning in &preflight_warnings {
                println!("{} {warning}", "Warning:".yellow());
            }
        }

        Ok(())
    }
}
