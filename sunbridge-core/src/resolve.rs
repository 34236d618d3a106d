// sunbridge-core/src/resolve.rs
//! Turns a decoded [`ShortcutRecord`] into a catalog-ready [`ResolvedApp`].
//!
//! Legacy catalogs sometimes reference installed titles by an opaque
//! UUID-shaped identifier instead of a literal install path. Those are
//! looked up in the auto-detected title map; a miss falls back to the
//! literal shortcut data, best-effort, never an error.

use std::collections::HashMap;

use sunbridge_common::error::{Result, SunbridgeError};
use sunbridge_common::model::{AppSource, ResolvedApp};
use tracing::debug;
use uuid::Uuid;

use crate::autodetect::AutoDetectedTitle;
use crate::shortcut::ShortcutRecord;

/// Resolve one shortcut record against the auto-detected title map.
pub fn resolve(
    record: &ShortcutRecord,
    auto_titles: &HashMap<String, AutoDetectedTitle>,
) -> Result<ResolvedApp> {
    let args = split_arguments(&record.arguments)?;

    let (name, raw_command, raw_working_dir) = match find_auto_match(record, auto_titles) {
        Some(title) => {
            debug!(
                "resolved opaque identifier in '{}' to auto-detected title '{}'",
                record.target_path, title.name
            );
            (
                title.name.clone(),
                title.command.clone(),
                title.working_dir.clone(),
            )
        }
        None => (
            record.display_name.trim().to_string(),
            record.target_path.clone(),
            record.working_dir.clone(),
        ),
    };

    if name.is_empty() {
        return Err(SunbridgeError::MalformedShortcut(
            "shortcut resolves to an empty name".to_string(),
        ));
    }

    let (command, working_dir, detached) = normalize_launch(&raw_command, &raw_working_dir);

    Ok(ResolvedApp {
        name,
        command,
        args,
        working_dir,
        image_path: None,
        detached,
        source: AppSource::ShortcutFile,
    })
}

/// Canonical lowercase-hyphenated form of a UUID-shaped string, accepting
/// optional surrounding braces and a leading `::` shell prefix.
pub fn normalize_identifier(raw: &str) -> Option<String> {
    let trimmed = raw
        .trim()
        .trim_start_matches("::")
        .trim_start_matches('{')
        .trim_end_matches('}');
    Uuid::parse_str(trimmed)
        .ok()
        .map(|u| u.as_hyphenated().to_string())
}

/// Look for a UUID-shaped path segment (or whole target) that matches one
/// of the auto-detected titles.
fn find_auto_match<'a>(
    record: &ShortcutRecord,
    auto_titles: &'a HashMap<String, AutoDetectedTitle>,
) -> Option<&'a AutoDetectedTitle> {
    if auto_titles.is_empty() {
        return None;
    }
    record
        .target_path
        .split(['\\', '/'])
        .filter_map(normalize_identifier)
        .find_map(|id| auto_titles.get(&id))
}

/// Split a raw argument string on whitespace with double-quoted segments
/// kept together. An unterminated quote is a [`SunbridgeError::MalformedArguments`].
pub fn split_arguments(raw: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for ch in raw.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }
    if in_quotes {
        return Err(SunbridgeError::MalformedArguments(format!(
            "unterminated quote in arguments: {raw}"
        )));
    }
    if has_token {
        tokens.push(current);
    }
    Ok(tokens)
}

/// Normalize a launch command and working directory into the form the
/// destination catalog expects, and classify detached launches.
///
/// Mirrors what the legacy host's own entries look like: quotes are not
/// kept around paths, a `start `-prefixed command or a URI launches
/// detached, and `steam://` URIs go through the steam executable. A
/// relative command is anchored to the working directory.
pub fn normalize_launch(command: &str, working_dir: &str) -> (String, String, bool) {
    let mut working_dir = working_dir.replace('"', "");
    while working_dir.ends_with(['\\', '/']) {
        working_dir.pop();
    }

    let mut cmd = command.replace('"', "");
    while cmd.starts_with(['\\', '/']) {
        cmd.remove(0);
    }

    let mut detached = false;
    if cmd.to_lowercase().starts_with("start") {
        detached = true;
        cmd = cmd[5..].trim_start().to_string();
    }

    if cmd.contains("://") {
        detached = true;
        if cmd.contains("steam://") {
            cmd = format!("steam {cmd}");
        }
    } else if !working_dir.is_empty() && !cmd.is_empty() && !cmd.starts_with(&working_dir) && !looks_absolute(&cmd) {
        cmd = format!(
            "{}{}{}",
            working_dir,
            std::path::MAIN_SEPARATOR,
            cmd
        );
    }

    (cmd, working_dir, detached)
}

fn looks_absolute(cmd: &str) -> bool {
    cmd.starts_with('/')
        || cmd.starts_with("\\\\")
        || cmd
            .as_bytes()
            .get(1)
            .is_some_and(|&b| b == b':' && cmd.as_bytes()[0].is_ascii_alphabetic())
}
