use super::{is_valid_session_id, sort_summaries, SessionStore};
use crate::atoms::error::{EngineError, EngineResult};
use crate::atoms::types::{Session, SessionSummary, Turn};
use crate::engine::persist::{quarantine, read_json, write_json};
use log::{info, warn};
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};

/// One JSON document per session at `<dir>/<session_id>.json`.
///
/// Every append reads the whole document, pushes the turn and writes the
/// whole document back. The internal mutex makes each call atomic; callers
/// that need ordering across several calls hold a `SessionLocks` guard.
pub struct JsonSessionStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonSessionStore {
    /// Open (or create) the session directory.
    pub fn open(dir: impl Into<PathBuf>) -> EngineResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        info!("[sessions] Opening JSON session store at {:?}", dir);
        Ok(Self { dir, write_lock: Mutex::new(()) })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, session_id: &str) -> PathBuf {
        self.dir.join(format!("{session_id}.json"))
    }
}

impl SessionStore for JsonSessionStore {
    fn get(&self, session_id: &str) -> EngineResult<Option<Session>> {
        if !is_valid_session_id(session_id) {
            return Ok(None);
        }
        read_json(&self.path_for(session_id))
    }

    fn append(&self, session_id: &str, user_id: Option<&str>, turn: Turn) -> EngineResult<()> {
        if !is_valid_session_id(session_id) {
            return Err(EngineError::store("sessions", format!("invalid session id {session_id:?}")));
        }
        let _guard = self.write_lock.lock();
        let path = self.path_for(session_id);

        let mut session = match read_json::<Session>(&path) {
            Ok(Some(s)) => s,
            Ok(None) => Session::new(session_id, user_id.map(str::to_string)),
            Err(e) => {
                warn!("[sessions] Session {} unreadable ({}), starting over", session_id, e);
                quarantine(&path);
                Session::new(session_id, user_id.map(str::to_string))
            }
        };

        session.turns.push(turn);
        write_json(&path, &session)
    }

    fn remove(&self, session_id: &str) -> EngineResult<bool> {
        if !is_valid_session_id(session_id) {
            return Ok(false);
        }
        let _guard = self.write_lock.lock();
        match fs::remove_file(self.path_for(session_id)) {
            Ok(()) => {
                info!("[sessions] Removed session {}", session_id);
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self) -> EngineResult<Vec<SessionSummary>> {
        let mut list = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match read_json::<Session>(&path) {
                Ok(Some(s)) => list.push(SessionSummary::from(&s)),
                Ok(None) => {}
                Err(e) => warn!("[sessions] Skipping unreadable {:?}: {}", path, e),
            }
        }
        sort_summaries(&mut list);
        Ok(list)
    }
}
