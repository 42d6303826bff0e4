// RikTech Engine — rule-first, retrieval-second reply engine.
// Everything below runs synchronously and in-process; no network, no model.

pub mod config;
pub mod intent;
pub mod knowledge;
pub mod paths;
pub mod persist;
pub mod responder;
pub mod retrieval;
pub mod sessions;
pub mod templates;
pub mod training;
