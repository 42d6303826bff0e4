// RikTech Engine — Responder
//
// Decision chain for one inbound message, first hit wins:
//
//   1. safety rules      → fixed safe message            (method: safety)
//   2. command rules     → clear / session info / version (method: command)
//   3. intent rules      → template reply                 (method: intent)
//   4. recall            → tf-idf over the session's recent user turns plus
//                          recent training examples       (method: retrieval)
//   5. technical words   → triage template                (method: technical)
//   6. knowledge base    → canned answer for a message that
//                          contains one of its trigger phrases (method: retrieval)
//   7. anything else     → rotating empathetic prompt     (method: fallback)
//
// The user turn and the assistant turn are both appended to the session.
// The whole load → decide → append cycle runs under a per-session lock, so
// concurrent requests for one session never interleave or lose turns.
//
// Persistence is best-effort: a failed read is treated as an empty history and
// a failed write is logged. `respond` itself cannot fail.

use crate::atoms::constants::TRAIN_SAMPLE_LIMIT;
use crate::atoms::error::EngineResult;
use crate::atoms::types::{
    FeedbackRequest, MessageRequest, Reply, Role, SelectionMethod, SessionSummary,
    TrainingExample, Turn,
};
use crate::engine::config::EngineConfig;
use crate::engine::intent::{self, Classification, IntentKind};
use crate::engine::knowledge::KnowledgeBase;
use crate::engine::paths::sessions_dir;
use crate::engine::retrieval::Corpus;
use crate::engine::sessions::{
    is_valid_session_id, new_session_id, JsonSessionStore, MemorySessionStore, SessionLocks,
    SessionStore,
};
use crate::engine::templates::{
    entropy_rng, pick_empathy, recall_reply, render, ReplyRng, TemplateContext,
    HISTORY_CLEAR_FAILED, TECHNICAL_TRIAGE,
};
use crate::engine::training::{JsonTrainingLog, MemoryTrainingLog, TrainingLog};
use log::{debug, info, warn};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;

// Lock entries for idle sessions are pruned once the table grows past this.
const LOCK_PRUNE_THRESHOLD: usize = 256;

/// Training log size plus its most recent examples.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingSnapshot {
    pub count: usize,
    pub sample: Vec<TrainingExample>,
}

/// What the decision chain produced, before it is stamped into a `Reply`.
struct Decision {
    text: String,
    confidence: f64,
    method: SelectionMethod,
    detail: Option<String>,
    suggestions: Vec<String>,
}

pub struct Responder {
    store: Arc<dyn SessionStore>,
    training: Arc<dyn TrainingLog>,
    knowledge: Option<Arc<KnowledgeBase>>,
    config: EngineConfig,
    locks: SessionLocks,
    rng: Mutex<Box<dyn ReplyRng>>,
}

impl Responder {
    pub fn new(
        store: Arc<dyn SessionStore>,
        training: Arc<dyn TrainingLog>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            training,
            knowledge: None,
            config,
            locks: SessionLocks::new(),
            rng: Mutex::new(entropy_rng()),
        }
    }

    /// File-backed stores under the configured data directory, plus the
    /// built-in knowledge base when enabled.
    pub fn open(config: EngineConfig) -> EngineResult<Self> {
        let data_dir = config.data_dir();
        let store = JsonSessionStore::open(sessions_dir(&data_dir))?;
        let training = JsonTrainingLog::open(&data_dir, config.storage.training_cap)?;
        info!("[responder] Data directory {:?}", data_dir);
        Ok(Self::new(Arc::new(store), Arc::new(training), config).with_configured_knowledge())
    }

    /// In-memory stores; nothing is written to disk.
    pub fn ephemeral(config: EngineConfig) -> Self {
        let cap = config.storage.training_cap;
        Self::new(Arc::new(MemorySessionStore::new()), Arc::new(MemoryTrainingLog::new(cap)), config)
            .with_configured_knowledge()
    }

    fn with_configured_knowledge(self) -> Self {
        if self.config.knowledge.enabled {
            self.with_knowledge_base(Arc::new(KnowledgeBase::builtin()))
        } else {
            self
        }
    }

    pub fn with_knowledge_base(mut self, kb: Arc<KnowledgeBase>) -> Self {
        self.knowledge = Some(kb);
        self
    }

    pub fn with_rng(self, rng: Box<dyn ReplyRng>) -> Self {
        *self.rng.lock() = rng;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ── Message handling ───────────────────────────────────────────────────

    /// Answer one message. The caller has already rejected blank input.
    pub fn respond(&self, req: &MessageRequest) -> Reply {
        let session_id = match req.session_id.as_deref() {
            Some(id) if is_valid_session_id(id) => id.to_string(),
            Some(id) => {
                warn!("[responder] Replacing unusable session id {:?}", id);
                new_session_id()
            }
            None => new_session_id(),
        };
        let user_id = req.user_id.as_deref();
        let message = req.message.as_str();

        let lock = self.locks.handle(&session_id);
        let decision = {
            let _guard = lock.lock();
            self.respond_locked(&session_id, user_id, message)
        };
        drop(lock);
        if self.locks.len() > LOCK_PRUNE_THRESHOLD {
            self.locks.prune();
        }

        Reply {
            reply_id: uuid::Uuid::new_v4().to_string(),
            text: decision.text,
            confidence: decision.confidence,
            session_id,
            method: decision.method,
            detail: decision.detail,
            suggestions: decision.suggestions,
        }
    }

    fn respond_locked(&self, session_id: &str, user_id: Option<&str>, message: &str) -> Decision {
        let history = self.store.load(session_id).unwrap_or_else(|e| {
            warn!("[responder] Could not load session {}: {}", session_id, e);
            Vec::new()
        });

        let classification = intent::classify(message);
        debug!(
            "[responder] session={} turns={} rule={:?}",
            session_id,
            history.len(),
            classification.rule_id
        );

        if classification.kind == IntentKind::ClearHistory {
            return match self.store.remove(session_id) {
                Ok(removed) => {
                    info!("[responder] Cleared session {} (existed: {})", session_id, removed);
                    self.rule_decision(&classification, session_id, message, history.len())
                }
                Err(e) => {
                    warn!("[responder] Could not clear session {}: {}", session_id, e);
                    Decision {
                        text: HISTORY_CLEAR_FAILED.to_string(),
                        confidence: self.config.confidence.command,
                        method: SelectionMethod::Command,
                        detail: classification.rule_id.map(str::to_string),
                        suggestions: Vec::new(),
                    }
                }
            };
        }

        self.record(session_id, user_id, Turn::user(message));

        let decision = if classification.is_none() {
            self.retrieve(session_id, message, &history)
        } else {
            self.rule_decision(&classification, session_id, message, history.len())
        };

        self.record(session_id, user_id, Turn::assistant(&decision.text, decision.confidence));
        decision
    }

    fn record(&self, session_id: &str, user_id: Option<&str>, turn: Turn) {
        if let Err(e) = self.store.append(session_id, user_id, turn) {
            warn!("[responder] Could not record turn for session {}: {}", session_id, e);
        }
    }

    fn rule_decision(
        &self,
        classification: &Classification,
        session_id: &str,
        message: &str,
        prior_turns: usize,
    ) -> Decision {
        let ctx = TemplateContext {
            message,
            session_id,
            turn_count: prior_turns + 1,
            capture: classification.capture.as_deref(),
            version_label: &self.config.templates.version_label,
            summary_chars: self.config.templates.summary_chars,
        };
        let (Some(rendered), Some(method)) = (render(classification.kind, &ctx), classification.kind.method())
        else {
            return self.fallback();
        };

        let c = &self.config.confidence;
        let confidence = match method {
            SelectionMethod::Safety => {
                warn!("[responder] Safety rule {:?} fired in session {}", classification.rule_id, session_id);
                c.safety
            }
            SelectionMethod::Command => c.command,
            _ => c.intent,
        };
        Decision {
            text: rendered.text,
            confidence,
            method,
            detail: classification.rule_id.map(str::to_string),
            suggestions: rendered.suggestions,
        }
    }

    /// Steps 4–7: recall, technical triage, knowledge base, fallback.
    fn retrieve(&self, session_id: &str, message: &str, history: &[Turn]) -> Decision {
        let r = &self.config.retrieval;

        let corpus = self.build_corpus(session_id, history);
        if let Some(best) = corpus.best_match(message) {
            debug!("[responder] recall best={:.3} over {} docs", best.score, corpus.len());
            if best.score > r.accept_threshold {
                if let Some(doc) = corpus.document(best.index) {
                    return Decision {
                        text: recall_reply(doc),
                        confidence: r.recall_confidence(best.score),
                        method: SelectionMethod::Retrieval,
                        detail: Some(format!("recall:{:.3}", best.score)),
                        suggestions: Vec::new(),
                    };
                }
            }
        }

        if intent::is_technical(message) {
            return Decision {
                text: TECHNICAL_TRIAGE.to_string(),
                confidence: self.config.confidence.technical,
                method: SelectionMethod::Technical,
                detail: None,
                suggestions: Vec::new(),
            };
        }

        if let Some(kb) = &self.knowledge {
            if let Some(m) = kb.best_match(message) {
                debug!("[responder] knowledge best={} {:.3}", m.entry.id, m.score);
                if m.score > r.knowledge_threshold {
                    return Decision {
                        text: m.entry.reply.clone(),
                        confidence: r.recall_confidence(m.score),
                        method: SelectionMethod::Retrieval,
                        detail: Some(format!("kb:{}", m.entry.id)),
                        suggestions: Vec::new(),
                    };
                }
            }
        }

        self.fallback()
    }

    /// Recent user turns of this session, then recent training examples.
    fn build_corpus(&self, session_id: &str, history: &[Turn]) -> Corpus {
        let r = &self.config.retrieval;
        let mut docs: Vec<String> = history
            .iter()
            .filter(|t| t.role == Role::User)
            .rev()
            .take(r.history_window)
            .map(|t| t.text.clone())
            .collect();
        docs.reverse();

        match self.training.user_messages(r.training_sample) {
            Ok(examples) => docs.extend(examples),
            Err(e) => warn!("[responder] Training sample unavailable for {}: {}", session_id, e),
        }
        Corpus::build(docs)
    }

    fn fallback(&self) -> Decision {
        let mut rng = self.rng.lock();
        let text = pick_empathy(&mut **rng);
        Decision {
            text: text.to_string(),
            confidence: self.config.confidence.fallback,
            method: SelectionMethod::Fallback,
            detail: None,
            suggestions: Vec::new(),
        }
    }

    // ── Side operations ────────────────────────────────────────────────────

    /// Validate and store a rated exchange.
    pub fn record_feedback(&self, req: FeedbackRequest) -> EngineResult<TrainingExample> {
        let example = TrainingExample::from_feedback(req)?;
        self.training.append_example(example.clone())?;
        info!("[responder] Stored training example {}", example.id);
        Ok(example)
    }

    pub fn history(&self, session_id: &str) -> EngineResult<Vec<Turn>> {
        self.store.load(session_id)
    }

    pub fn sessions(&self) -> EngineResult<Vec<SessionSummary>> {
        self.store.list()
    }

    pub fn train_sample(&self, limit: Option<usize>) -> EngineResult<TrainingSnapshot> {
        Ok(TrainingSnapshot {
            count: self.training.count()?,
            sample: self.training.sample(limit.unwrap_or(TRAIN_SAMPLE_LIMIT))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::error::EngineError;
    use crate::atoms::types::Session;
    use crate::engine::templates::{RoundRobin, EMPATHY_TEMPLATES, HISTORY_CLEARED, SAFETY_MESSAGE};

    fn bare() -> Responder {
        let config = EngineConfig::default();
        Responder::new(
            Arc::new(MemorySessionStore::new()),
            Arc::new(MemoryTrainingLog::new(config.storage.training_cap)),
            config,
        )
        .with_rng(Box::new(RoundRobin::default()))
    }

    /// Default configuration, built-in knowledge base included.
    fn stock() -> Responder {
        Responder::ephemeral(EngineConfig::default()).with_rng(Box::new(RoundRobin::default()))
    }

    fn send(r: &Responder, session: &str, text: &str) -> Reply {
        r.respond(&MessageRequest::new(text).in_session(session))
    }

    #[test]
    fn test_greeting_without_session() {
        let r = bare();
        let reply = r.respond(&MessageRequest::new("halo"));
        assert_eq!(reply.method, SelectionMethod::Intent);
        assert!((reply.confidence - 0.85).abs() < 1e-9);
        assert!(reply.text.starts_with("Halo!"));
        assert!(is_valid_session_id(&reply.session_id));
        assert!(!reply.suggestions.is_empty());
        assert_eq!(r.history(&reply.session_id).unwrap().len(), 2);
    }

    #[test]
    fn test_safety_wins_regardless_of_history() {
        let r = bare();
        for _ in 0..3 {
            send(&r, "s", "saya ingin bunuh diri");
        }
        r.record_feedback(FeedbackRequest {
            user_message: "saya ingin bunuh diri".into(),
            assistant_reply: "x".into(),
            ..Default::default()
        })
        .unwrap();

        let reply = send(&r, "s", "saya ingin bunuh diri");
        assert_eq!(reply.method, SelectionMethod::Safety);
        assert_eq!(reply.text, SAFETY_MESSAGE);
        assert!((reply.confidence - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_technical_then_recall() {
        let r = bare();
        let first = send(&r, "dbg", "error: TypeError undefined is not a function");
        assert_eq!(first.method, SelectionMethod::Technical);
        assert!((first.confidence - 0.8).abs() < 1e-9);

        let second = send(&r, "dbg", "masih error");
        assert_eq!(second.method, SelectionMethod::Retrieval);
        assert!(second.text.contains("TypeError undefined is not a function"));
        assert!(second.confidence >= 0.4 && second.confidence <= 0.9);
    }

    #[test]
    fn test_empty_everything_falls_back_to_empathy() {
        let r = bare();
        let reply = send(&r, "new", "aku bingung hari ini");
        assert_eq!(reply.method, SelectionMethod::Fallback);
        assert!(EMPATHY_TEMPLATES.contains(&reply.text.as_str()));
        assert!((reply.confidence - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_fallback_rotates_with_injected_rng() {
        let r = bare();
        let a = send(&r, "a", "qwerty");
        let b = send(&r, "b", "asdfgh");
        assert_eq!(a.text, EMPATHY_TEMPLATES[0]);
        assert_eq!(b.text, EMPATHY_TEMPLATES[1]);
    }

    #[test]
    fn test_turn_order_is_preserved() {
        let r = bare();
        let messages = ["pertama", "kedua", "ketiga", "keempat"];
        for m in messages {
            send(&r, "ord", m);
        }
        let turns = r.history("ord").unwrap();
        assert_eq!(turns.len(), 2 * messages.len());
        for (i, m) in messages.iter().enumerate() {
            assert_eq!(turns[2 * i].role, Role::User);
            assert_eq!(turns[2 * i].text, *m);
            assert_eq!(turns[2 * i + 1].role, Role::Assistant);
            assert!(turns[2 * i + 1].confidence.is_some());
        }
    }

    #[test]
    fn test_recall_never_answers_below_threshold() {
        let mut config = EngineConfig::default();
        config.retrieval.accept_threshold = 0.99;
        let r = Responder::new(
            Arc::new(MemorySessionStore::new()),
            Arc::new(MemoryTrainingLog::new(10)),
            config,
        );
        send(&r, "t", "kucing oranye tidur di sofa");
        let reply = send(&r, "t", "kucing tidur");
        assert_ne!(reply.method, SelectionMethod::Retrieval);
    }

    #[test]
    fn test_training_examples_join_the_corpus() {
        let r = bare();
        r.record_feedback(FeedbackRequest {
            user_message: "deploy aplikasi ke server produksi".into(),
            assistant_reply: "Gunakan pipeline CI.".into(),
            rating: Some(5),
            ..Default::default()
        })
        .unwrap();
        let reply = send(&r, "fresh", "deploy server");
        assert_eq!(reply.method, SelectionMethod::Retrieval);
        assert!(reply.text.contains("deploy aplikasi ke server produksi"));
    }

    #[test]
    fn test_knowledge_base_answers_after_recall() {
        let r = bare().with_knowledge_base(Arc::new(KnowledgeBase::builtin()));
        let reply = send(&r, "kb", "siapa pengembang aplikasi ini");
        assert_eq!(reply.method, SelectionMethod::Retrieval);
        assert_eq!(reply.detail.as_deref(), Some("kb:who_dev"));
        assert_eq!(reply.text, "Dikembangkan oleh Rikdev Apps.");
    }

    #[test]
    fn test_clear_history_removes_session() {
        let r = bare();
        send(&r, "c", "pertama");
        send(&r, "c", "kedua");
        let reply = send(&r, "c", "tolong hapus history saya");
        assert_eq!(reply.method, SelectionMethod::Command);
        assert_eq!(reply.text, HISTORY_CLEARED);
        assert!(r.history("c").unwrap().is_empty());
        assert!(r.sessions().unwrap().is_empty());
    }

    #[test]
    fn test_session_info_counts_turns() {
        let r = bare();
        send(&r, "info", "pertama");
        let reply = send(&r, "info", "info session");
        assert_eq!(reply.method, SelectionMethod::Command);
        assert!((reply.confidence - 0.95).abs() < 1e-9);
        assert!(reply.text.contains("info"));
        assert!(reply.text.contains("Jumlah pesan: 3"), "{}", reply.text);
    }

    #[test]
    fn test_unusable_session_id_is_replaced() {
        let r = bare();
        let reply = send(&r, "../../etc", "halo");
        assert_ne!(reply.session_id, "../../etc");
        assert!(is_valid_session_id(&reply.session_id));
    }

    #[test]
    fn test_concurrent_requests_keep_every_turn() {
        let r = Arc::new(bare());
        let threads: Vec<_> = (0..8)
            .map(|t| {
                let r = Arc::clone(&r);
                std::thread::spawn(move || {
                    for i in 0..5 {
                        send(&r, "shared", &format!("pesan {t} nomor {i}"));
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }

        let turns = r.history("shared").unwrap();
        assert_eq!(turns.len(), 80);
        for pair in turns.chunks(2) {
            assert_eq!(pair[0].role, Role::User);
            assert_eq!(pair[1].role, Role::Assistant);
        }
    }

    struct BrokenStore;

    impl SessionStore for BrokenStore {
        fn get(&self, _: &str) -> EngineResult<Option<Session>> {
            Err(EngineError::store("sessions", "disk gone"))
        }
        fn append(&self, _: &str, _: Option<&str>, _: Turn) -> EngineResult<()> {
            Err(EngineError::store("sessions", "disk gone"))
        }
        fn remove(&self, _: &str) -> EngineResult<bool> {
            Err(EngineError::store("sessions", "disk gone"))
        }
        fn list(&self) -> EngineResult<Vec<SessionSummary>> {
            Err(EngineError::store("sessions", "disk gone"))
        }
    }

    #[test]
    fn test_broken_store_still_replies() {
        let r = Responder::new(
            Arc::new(BrokenStore),
            Arc::new(MemoryTrainingLog::new(10)),
            EngineConfig::default(),
        );
        let reply = send(&r, "x", "halo");
        assert_eq!(reply.method, SelectionMethod::Intent);
        let reply = send(&r, "x", "hapus riwayat");
        assert_eq!(reply.method, SelectionMethod::Command);
        assert_eq!(reply.text, HISTORY_CLEAR_FAILED);
        assert_ne!(reply.text, HISTORY_CLEARED);
        assert!(r.history("x").is_err());
    }

    #[test]
    fn test_stock_config_rules_still_win() {
        let r = stock();
        assert_eq!(send(&r, "s1", "halo").method, SelectionMethod::Intent);
        let reply = send(&r, "s2", "saya ingin bunuh diri");
        assert_eq!(reply.method, SelectionMethod::Safety);
        assert_eq!(reply.text, SAFETY_MESSAGE);
    }

    #[test]
    fn test_stock_config_error_reports_get_triage() {
        let r = stock();
        for (i, msg) in [
            "error: TypeError undefined is not a function",
            "SyntaxError: unexpected token",
            "saya punya error di server",
            "stack trace saya kosong",
        ]
        .into_iter()
        .enumerate()
        {
            let reply = send(&r, &format!("tech-{i}"), msg);
            assert_eq!(reply.method, SelectionMethod::Technical, "{msg}: {:?}", reply.detail);
            assert_eq!(reply.text, TECHNICAL_TRIAGE);
        }
    }

    #[test]
    fn test_stock_config_recall_follows_error() {
        let r = stock();
        assert_eq!(send(&r, "dbg", "error: TypeError undefined is not a function").method, SelectionMethod::Technical);
        let second = send(&r, "dbg", "masih error");
        assert_eq!(second.method, SelectionMethod::Retrieval);
        assert!(second.detail.as_deref().is_some_and(|d| d.starts_with("recall:")));
    }

    #[test]
    fn test_stock_config_small_talk_falls_back() {
        let r = stock();
        for (i, msg) in ["aku bingung hari ini", "saya sedih"].into_iter().enumerate() {
            let reply = send(&r, &format!("feel-{i}"), msg);
            assert_eq!(reply.method, SelectionMethod::Fallback, "{msg}: {:?}", reply.detail);
            assert!(EMPATHY_TEMPLATES.contains(&reply.text.as_str()));
            assert!((reply.confidence - 0.6).abs() < 1e-9);
        }
    }

    #[test]
    fn test_stock_config_knowledge_needs_trigger_phrase() {
        let r = stock();
        let reply = send(&r, "kb", "cara buat website sederhana");
        assert_eq!(reply.method, SelectionMethod::Retrieval);
        assert_eq!(reply.detail.as_deref(), Some("kb:build_website"));
    }

    #[test]
    fn test_feedback_and_train_sample() {
        let r = bare();
        assert!(r.record_feedback(FeedbackRequest::default()).unwrap_err().is_validation());
        for i in 0..25 {
            r.record_feedback(FeedbackRequest {
                user_message: format!("q{i}"),
                assistant_reply: "a".into(),
                ..Default::default()
            })
            .unwrap();
        }
        let snap = r.train_sample(None).unwrap();
        assert_eq!(snap.count, 25);
        assert_eq!(snap.sample.len(), 20);
        assert_eq!(snap.sample[0].user_message, "q24");
    }

    #[test]
    fn test_file_backed_responder_persists() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = EngineConfig::default();
        config.storage.data_dir = Some(dir.path().to_path_buf());
        let sid = {
            let r = Responder::open(config.clone()).unwrap();
            send(&r, "disk", "halo").session_id
        };
        let r = Responder::open(config).unwrap();
        assert_eq!(r.history(&sid).unwrap().len(), 2);
        assert_eq!(r.sessions().unwrap()[0].id, "disk");
    }
}
