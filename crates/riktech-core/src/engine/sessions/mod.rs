// RikTech Engine — Session Store
// Conversation history keyed by session id, as an ordered list of turns.
//
// Module layout:
//   mod.rs     — `SessionStore` trait, id helpers
//   memory     — in-process store (tests, `--ephemeral`)
//   json_file  — one whole JSON document per session on disk
//
// Stores only guarantee that a single call is atomic with respect to other
// calls on the same store. Ordering across a load → respond → append cycle is
// the responder's job (see `SessionLocks`).

use crate::atoms::error::EngineResult;
use crate::atoms::types::{Session, SessionSummary, Turn};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

mod json_file;
mod memory;

pub use json_file::JsonSessionStore;
pub use memory::MemorySessionStore;

pub trait SessionStore: Send + Sync {
    /// Full session record; `None` when the id has never been seen.
    fn get(&self, session_id: &str) -> EngineResult<Option<Session>>;

    /// Append one turn, creating the session (owned by `user_id`) on first use.
    fn append(&self, session_id: &str, user_id: Option<&str>, turn: Turn) -> EngineResult<()>;

    /// Delete a session. Returns whether anything was removed.
    fn remove(&self, session_id: &str) -> EngineResult<bool>;

    /// All known sessions, most recently active first.
    fn list(&self) -> EngineResult<Vec<SessionSummary>>;

    /// Ordered turns for a session; empty when unknown.
    fn load(&self, session_id: &str) -> EngineResult<Vec<Turn>> {
        Ok(self.get(session_id)?.map(|s| s.turns).unwrap_or_default())
    }
}

/// Fresh random session id.
pub fn new_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Session ids end up in file names; only `[A-Za-z0-9_-]` is allowed.
pub fn is_valid_session_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 128
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Sort newest activity first; sessions with no turns go last.
pub(crate) fn sort_summaries(list: &mut [SessionSummary]) {
    list.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));
}

// ── Per-session serialisation ─────────────────────────────────────────────

/// One mutex per session id. Holding the guard for a whole read-modify-write
/// cycle means turns for a session are appended in the order requests
/// acquired the lock.
#[derive(Default)]
pub struct SessionLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the lock for `session_id`, created on first use.
    pub fn handle(&self, session_id: &str) -> Arc<Mutex<()>> {
        self.locks
            .lock()
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drop lock entries nobody is holding.
    pub fn prune(&self) {
        self.locks.lock().retain(|_, l| Arc::strong_count(l) > 1);
    }

    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
