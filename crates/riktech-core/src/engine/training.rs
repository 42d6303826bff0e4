// RikTech Engine — Training-Example Log
//
// Capped, newest-first log of user-rated exchanges. The responder mixes the
// user side of recent examples into its recall corpus.

use crate::atoms::constants::TRAINING_FILE;
use crate::atoms::error::{EngineError, EngineResult};
use crate::atoms::types::{FeedbackRequest, TrainingExample};
use crate::engine::persist::{quarantine, read_json, write_json};
use chrono::Utc;
use log::{info, warn};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

impl TrainingExample {
    /// Validate caller feedback and stamp it with an id and timestamp.
    pub fn from_feedback(req: FeedbackRequest) -> EngineResult<Self> {
        if req.user_message.trim().is_empty() || req.assistant_reply.trim().is_empty() {
            return Err(EngineError::validation("userMessage and assistantReply required"));
        }
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: req.session_id,
            user_id: req.user_id,
            user_message: req.user_message,
            assistant_reply: req.assistant_reply,
            rating: req.rating,
            tags: req.tags,
            ts: Utc::now(),
        })
    }
}

pub trait TrainingLog: Send + Sync {
    fn append_example(&self, example: TrainingExample) -> EngineResult<()>;

    /// Up to `n` examples, most recent first.
    fn sample(&self, n: usize) -> EngineResult<Vec<TrainingExample>>;

    fn count(&self) -> EngineResult<usize>;

    /// User-side text of the `n` most recent examples.
    fn user_messages(&self, n: usize) -> EngineResult<Vec<String>> {
        Ok(self.sample(n)?.into_iter().map(|e| e.user_message).collect())
    }
}

fn push_capped(examples: &mut Vec<TrainingExample>, example: TrainingExample, cap: usize) {
    examples.insert(0, example);
    examples.truncate(cap);
}

// ── In-memory ─────────────────────────────────────────────────────────────

pub struct MemoryTrainingLog {
    examples: Mutex<Vec<TrainingExample>>,
    cap: usize,
}

impl MemoryTrainingLog {
    pub fn new(cap: usize) -> Self {
        Self { examples: Mutex::new(Vec::new()), cap: cap.max(1) }
    }
}

impl TrainingLog for MemoryTrainingLog {
    fn append_example(&self, example: TrainingExample) -> EngineResult<()> {
        push_capped(&mut self.examples.lock(), example, self.cap);
        Ok(())
    }

    fn sample(&self, n: usize) -> EngineResult<Vec<TrainingExample>> {
        Ok(self.examples.lock().iter().take(n).cloned().collect())
    }

    fn count(&self) -> EngineResult<usize> {
        Ok(self.examples.lock().len())
    }
}

// ── JSON file ─────────────────────────────────────────────────────────────

#[derive(Debug, Default, Serialize, Deserialize)]
struct TrainingDocument {
    #[serde(default)]
    examples: Vec<TrainingExample>,
}

/// `<data_dir>/training_examples.json`, rewritten whole on every append.
pub struct JsonTrainingLog {
    path: PathBuf,
    cap: usize,
    lock: Mutex<()>,
}

impl JsonTrainingLog {
    pub fn open(data_dir: &Path, cap: usize) -> EngineResult<Self> {
        std::fs::create_dir_all(data_dir)?;
        let path = data_dir.join(TRAINING_FILE);
        info!("[training] Using training log at {:?} (cap {})", path, cap);
        Ok(Self { path, cap: cap.max(1), lock: Mutex::new(()) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> EngineResult<TrainingDocument> {
        Ok(read_json(&self.path)?.unwrap_or_default())
    }
}

impl TrainingLog for JsonTrainingLog {
    fn append_example(&self, example: TrainingExample) -> EngineResult<()> {
        let _guard = self.lock.lock();
        let mut doc = match self.read() {
            Ok(doc) => doc,
            Err(e) => {
                warn!("[training] Training log unreadable ({}), starting a new one", e);
                quarantine(&self.path);
                TrainingDocument::default()
            }
        };
        push_capped(&mut doc.examples, example, self.cap);
        write_json(&self.path, &doc)
    }

    fn sample(&self, n: usize) -> EngineResult<Vec<TrainingExample>> {
        let _guard = self.lock.lock();
        let mut doc = self.read()?;
        doc.examples.truncate(n);
        Ok(doc.examples)
    }

    fn count(&self) -> EngineResult<usize> {
        let _guard = self.lock.lock();
        Ok(self.read()?.examples.len())
    }
}
