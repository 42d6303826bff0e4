// ── RikTech Atoms: Error Types ─────────────────────────────────────────────
// Single canonical error enum for the engine, built with `thiserror`.
//
// Design rules:
//   • Variants are coarse-grained by domain (I/O, serialization, config, store…).
//   • The `#[from]` attribute wires std/external error conversions automatically.
//   • The responder never surfaces these to a caller; stores and logs return
//     them so the responder can decide to log and carry on.

use thiserror::Error;

// ── Primary error enum ─────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum EngineError {
    /// Filesystem or OS-level I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization / deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML config could not be parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Session store or training log failure.
    #[error("Store error: {store}: {message}")]
    Store { store: String, message: String },

    /// Rejected input at the boundary (empty message, missing fields).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for errors that do not yet have a dedicated variant.
    #[error("{0}")]
    Other(String),
}

// ── Convenience constructors ───────────────────────────────────────────────

impl EngineError {
    /// Create a store error with store name and message.
    pub fn store(store: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Store { store: store.into(), message: message.into() }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// True when the error came from caller input rather than the engine.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<toml::de::Error> for EngineError {
    fn from(e: toml::de::Error) -> Self {
        EngineError::Config(e.to_string())
    }
}

// ── Convenience alias ──────────────────────────────────────────────────────

/// All engine operations that can fail return this type.
pub type EngineResult<T> = Result<T, EngineError>;
