//! Persistence of per-deck study state.
//!
//! Files are stored under `.cache/` using a hash of the deck path as the
//! directory name to avoid filesystem issues. The progress map is a flat JSON
//! object under a fixed filename; the "show studied" preference is the literal
//! string `true` or `false` in its own file. A missing or unreadable progress
//! file is treated as an empty map so a corrupt write never blocks startup.

use crate::progress::ProgressMap;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const CACHE_DIR: &str = ".cache";
const PROGRESS_FILE: &str = "progress.json";
const SHOW_STUDIED_FILE: &str = "show-studied";

pub fn hash_dir(deck_path: &Path) -> PathBuf {
    let mut hasher = Sha256::new();
    hasher.update(deck_path.as_os_str().to_string_lossy().as_bytes());
    let hash = format!("{:x}", hasher.finalize());
    Path::new(CACHE_DIR).join(hash)
}

fn progress_path(deck_path: &Path) -> PathBuf {
    hash_dir(deck_path).join(PROGRESS_FILE)
}

fn show_studied_path(deck_path: &Path) -> PathBuf {
    hash_dir(deck_path).join(SHOW_STUDIED_FILE)
}

/// Load the persisted progress map for a deck. Absent or malformed state
/// yields an empty map.
pub fn load_progress(deck_path: &Path) -> ProgressMap {
    let path = progress_path(deck_path);
    let data = match fs::read_to_string(&path) {
        Ok(data) => data,
        Err(_) => return ProgressMap::new(),
    };
    match serde_json::from_str::<ProgressMap>(&data) {
        Ok(mut progress) => {
            progress.retain_studied();
            debug!(path = %path.display(), entries = progress.len(), "Loaded progress map");
            progress
        }
        Err(err) => {
            warn!(path = %path.display(), "Discarding unreadable progress file: {err}");
            ProgressMap::new()
        }
    }
}

/// Persist the progress map. Errors are logged and swallowed so a failed
/// write never interrupts a study session.
pub fn save_progress(deck_path: &Path, progress: &ProgressMap) {
    let path = progress_path(deck_path);
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    match serde_json::to_string(progress) {
        Ok(contents) => {
            if let Err(err) = fs::write(&path, contents) {
                warn!(path = %path.display(), "Failed to write progress map: {err}");
            }
        }
        Err(err) => {
            warn!("Failed to serialize progress map: {err}");
        }
    }
}

/// Load the persisted "show studied" preference, if any.
pub fn load_show_studied(deck_path: &Path) -> Option<bool> {
    let data = fs::read_to_string(show_studied_path(deck_path)).ok()?;
    match data.trim() {
        "true" => Some(true),
        "false" => Some(false),
        other => {
            warn!(value = other, "Ignoring unrecognized show-studied preference");
            None
        }
    }
}

pub fn save_show_studied(deck_path: &Path, show_studied: bool) {
    let path = show_studied_path(deck_path);
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let literal = if show_studied { "true" } else { "false" };
    if let Err(err) = fs::write(&path, literal) {
        warn!(path = %path.display(), "Failed to write show-studied preference: {err}");
    }
}
