// RikTech Engine — Whole-Document JSON Files
//
// The only persistence primitive in the engine: read an entire JSON document,
// write an entire JSON document. Writes go to a sibling temp file first and
// are renamed into place, so a reader never sees a half-written document.

use crate::atoms::error::EngineResult;
use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Read and parse `path`. A missing file is `Ok(None)`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> EngineResult<Option<T>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    if raw.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(&raw)?))
}

/// Serialize `value` (pretty) and atomically replace `path`.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> EngineResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_vec_pretty(value)?;
    let tmp = temp_path(path);
    fs::write(&tmp, json)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

/// Move an unreadable document out of the way so a fresh one can be written.
/// Returns where it went.
pub fn quarantine(path: &Path) -> Option<PathBuf> {
    let mut target = path.as_os_str().to_owned();
    target.push(format!(".corrupt-{}", chrono::Utc::now().timestamp()));
    let target = PathBuf::from(target);
    match fs::rename(path, &target) {
        Ok(()) => {
            warn!("[persist] Moved unreadable {:?} to {:?}", path, target);
            Some(target)
        }
        Err(e) => {
            warn!("[persist] Could not quarantine {:?}: {}", path, e);
            None
        }
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(format!(".tmp-{}", uuid::Uuid::new_v4().simple()));
    PathBuf::from(tmp)
}
