use super::{sort_summaries, SessionStore};
use crate::atoms::error::EngineResult;
use crate::atoms::types::{Session, SessionSummary, Turn};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Process-local session store. Nothing survives a restart.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, session_id: &str) -> EngineResult<Option<Session>> {
        Ok(self.sessions.read().get(session_id).cloned())
    }

    fn append(&self, session_id: &str, user_id: Option<&str>, turn: Turn) -> EngineResult<()> {
        let mut sessions = self.sessions.write();
        let session = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Session::new(session_id, user_id.map(str::to_string)));
        session.turns.push(turn);
        Ok(())
    }

    fn remove(&self, session_id: &str) -> EngineResult<bool> {
        Ok(self.sessions.write().remove(session_id).is_some())
    }

    fn list(&self) -> EngineResult<Vec<SessionSummary>> {
        let mut list: Vec<SessionSummary> =
            self.sessions.read().values().map(SessionSummary::from).collect();
        sort_summaries(&mut list);
        Ok(list)
    }
}
