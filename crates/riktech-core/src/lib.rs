// riktech-core — the engine behind RikTech AI.
//
// Layout:
//   atoms/   pure data: types, constants, the error enum
//   engine/  tokenizer + tf-idf recall, safety/intent rules, templates,
//            knowledge base, session store, training log, config, responder
//
// Front ends (the `riktech` CLI and the HTTP server) only talk to
// `Responder` and the config loader.

pub mod atoms;
pub mod engine;

pub use atoms::error::{EngineError, EngineResult};
pub use atoms::types::{
    FeedbackRequest, MessageRequest, Reply, Role, SelectionMethod, Session, SessionSummary,
    TrainingExample, Turn,
};
pub use engine::config::EngineConfig;
pub use engine::knowledge::KnowledgeBase;
pub use engine::responder::{Responder, TrainingSnapshot};
pub use engine::sessions::{JsonSessionStore, MemorySessionStore, SessionStore};
pub use engine::training::{JsonTrainingLog, MemoryTrainingLog, TrainingLog};
