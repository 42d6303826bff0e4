// ── RikTech Atoms: Pure Data Types ─────────────────────────────────────────
// Plain struct/enum definitions shared by the engine, the CLI and the HTTP
// layer. Atoms layer rule: no I/O, no side effects, no imports from engine/.
//
// Wire shapes use camelCase so the JSON written to disk and returned over HTTP
// stays compatible with the browser client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Conversation ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message within a session. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    pub ts: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, text: text.into(), ts: Utc::now(), confidence: None }
    }

    pub fn assistant(text: impl Into<String>, confidence: f64) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            ts: Utc::now(),
            confidence: Some(confidence),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub turns: Vec<Turn>,
}

impl Session {
    pub fn new(id: impl Into<String>, user_id: Option<String>) -> Self {
        Self { id: id.into(), user_id, turns: Vec::new() }
    }
}

/// Lightweight listing row for a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: String,
    pub user_id: Option<String>,
    pub turn_count: usize,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<&Session> for SessionSummary {
    fn from(s: &Session) -> Self {
        SessionSummary {
            id: s.id.clone(),
            user_id: s.user_id.clone(),
            turn_count: s.turns.len(),
            updated_at: s.turns.last().map(|t| t.ts),
        }
    }
}

// ── Training examples ──────────────────────────────────────────────────────

/// A user-rated exchange kept for future recall.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrainingExample {
    pub id: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    pub user_message: String,
    pub assistant_reply: String,
    #[serde(default)]
    pub rating: Option<i32>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub ts: DateTime<Utc>,
}

/// Feedback as submitted by a caller, before an id and timestamp are assigned.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_message: String,
    #[serde(default)]
    pub assistant_reply: String,
    #[serde(default)]
    pub rating: Option<i32>,
    #[serde(default)]
    pub tags: Vec<String>,
}

// ── Responder boundary ─────────────────────────────────────────────────────

/// Inbound message. The boundary layer guarantees `message` is non-blank.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub message: String,
}

impl MessageRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), ..Default::default() }
    }

    pub fn in_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

/// Which branch of the decision chain produced a reply.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMethod {
    Safety,
    Command,
    Intent,
    Retrieval,
    Technical,
    Fallback,
}

impl SelectionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionMethod::Safety => "safety",
            SelectionMethod::Command => "command",
            SelectionMethod::Intent => "intent",
            SelectionMethod::Retrieval => "retrieval",
            SelectionMethod::Technical => "technical",
            SelectionMethod::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for SelectionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub reply_id: String,
    pub text: String,
    pub confidence: f64,
    pub session_id: String,
    pub method: SelectionMethod,
    /// Rule id, knowledge entry id or recall score, for observability.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}
