// ── RikTech Atoms: Constants ───────────────────────────────────────────────
// Named defaults for the crate. Every value here can be overridden through
// `EngineConfig`; these are only what a fresh install starts with.

// ── Retrieval ──────────────────────────────────────────────────────────────
// How many of the session's own user turns feed the recall corpus.
pub const DEFAULT_HISTORY_WINDOW: usize = 30;
// How many stored training examples (most recent first) join the corpus.
pub const DEFAULT_TRAINING_SAMPLE: usize = 200;
// Minimum cosine similarity for the recall path to answer.
pub const DEFAULT_ACCEPT_THRESHOLD: f64 = 0.12;
// Minimum cosine similarity for a knowledge-base entry to answer.
pub const DEFAULT_KNOWLEDGE_THRESHOLD: f64 = 0.08;
// Recall confidence = clamp(floor + similarity, floor, ceiling).
pub const DEFAULT_CONFIDENCE_FLOOR: f64 = 0.4;
pub const DEFAULT_CONFIDENCE_CEILING: f64 = 0.9;

// ── Fixed confidences per selection path ───────────────────────────────────
pub const SAFETY_CONFIDENCE: f64 = 1.0;
pub const COMMAND_CONFIDENCE: f64 = 0.95;
pub const INTENT_CONFIDENCE: f64 = 0.85;
pub const TECHNICAL_CONFIDENCE: f64 = 0.8;
pub const FALLBACK_CONFIDENCE: f64 = 0.6;

// ── Storage ────────────────────────────────────────────────────────────────
// Training log keeps only the most recent N examples.
pub const DEFAULT_TRAINING_CAP: usize = 5000;
pub const SESSIONS_DIR: &str = "sessions";
pub const TRAINING_FILE: &str = "training_examples.json";
pub const DATA_DIR_NAME: &str = "riktech";

// ── Templates ──────────────────────────────────────────────────────────────
// Character budget for the naive "summarize" intent.
pub const DEFAULT_SUMMARY_CHARS: usize = 220;
pub const DEFAULT_VERSION_LABEL: &str = "RikTech AI — versi lokal 1.1 (engine: TF-IDF + rules)";

// ── Boundary ───────────────────────────────────────────────────────────────
pub const TRAIN_SAMPLE_LIMIT: usize = 20;
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;
pub const CONFIG_ENV_VAR: &str = "RIKTECH_CONFIG";
pub const CONFIG_FILE_NAME: &str = "riktech.toml";
