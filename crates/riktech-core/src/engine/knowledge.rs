// ── RikTech: Knowledge Base ─────────────────────────────────────────────────
//
// Static canned-answer table. Each entry is vectorized once (normalized TF
// over its trigger phrases only) when the base is built; after that the base
// is read-only and can be shared freely between threads.
//
// An entry is only a candidate when every token of at least one of its
// trigger phrases appears in the message. Cosine then ranks the candidates.

use super::retrieval::{best_of, cosine, normalized_tf, tokenize, TermVector};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KnowledgeEntry {
    pub id: String,
    pub patterns: Vec<String>,
    pub reply: String,
}

impl KnowledgeEntry {
    pub fn new(id: &str, patterns: &[&str], reply: &str) -> Self {
        Self {
            id: id.to_string(),
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
            reply: reply.to_string(),
        }
    }

    fn trigger_tokens(&self) -> Vec<String> {
        self.patterns.iter().flat_map(|p| tokenize(p)).collect()
    }

    /// True when some trigger phrase is fully present in `tokens`.
    fn triggered_by(&self, tokens: &HashSet<&str>) -> bool {
        self.patterns.iter().any(|p| {
            let words = tokenize(p);
            !words.is_empty() && words.iter().all(|w| tokens.contains(w.as_str()))
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeMatch<'a> {
    pub entry: &'a KnowledgeEntry,
    pub score: f64,
}

#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    entries: Vec<KnowledgeEntry>,
    vectors: Vec<TermVector>,
}

impl KnowledgeBase {
    pub fn new(entries: Vec<KnowledgeEntry>) -> Self {
        let vectors = entries
            .iter()
            .map(|e| normalized_tf(&e.trigger_tokens()))
            .collect();
        Self { entries, vectors }
    }

    /// The table shipped with RikTech AI.
    pub fn builtin() -> Self {
        Self::new(builtin_entries())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[KnowledgeEntry] {
        &self.entries
    }

    /// Closest triggered entry by cosine over normalized TF. First entry wins
    /// ties; `None` when no trigger phrase is present in `text`.
    pub fn best_match(&self, text: &str) -> Option<KnowledgeMatch<'_>> {
        let tokens = tokenize(text);
        let present: HashSet<&str> = tokens.iter().map(String::as_str).collect();
        let q = normalized_tf(&tokens);
        let scores = self.entries.iter().zip(&self.vectors).map(|(e, v)| {
            if e.triggered_by(&present) {
                cosine(&q, v)
            } else {
                0.0
            }
        });
        let best = best_of(scores)?;
        Some(KnowledgeMatch { entry: &self.entries[best.index], score: best.score })
    }
}

fn builtin_entries() -> Vec<KnowledgeEntry> {
    vec![
        KnowledgeEntry::new(
            "greet",
            &["halo", "hello", "hai", "hi"],
            "Halo! Saya RikTech AI — asisten lokal Anda. Mau ngobrol tentang apa hari ini?",
        ),
        KnowledgeEntry::new(
            "whoareyou",
            &["siapa kamu", "nama kamu", "siapa ini"],
            "Saya bernama RikTech AI — dibuat untuk membantu tanpa integrasi pihak ketiga.",
        ),
        KnowledgeEntry::new(
            "thanks",
            &["terima kasih", "thanks", "makasih"],
            "Sama-sama! Senang bisa membantu.",
        ),
        KnowledgeEntry::new(
            "build_website",
            &["buat website", "membuat website", "cara buat website", "tutorial website"],
            "Untuk membuat website, mulailah dengan menentukan tujuan, pilih teknologi (HTML/CSS/JS atau framework), lalu desain UI. Mau contoh struktur project?",
        ),
        KnowledgeEntry::new(
            "help",
            &["help", "bantuan", "apa yang bisa kamu lakukan"],
            "Saya bisa memberi panduan teknis, menjawab pertanyaan sederhana, dan menyimpan history percakapan secara lokal.",
        ),
        KnowledgeEntry::new(
            "settings",
            &["settings", "pengaturan", "konfigurasi"],
            "Pengaturan saat ini terbatas. Anda bisa mengubah nama sesi atau menghapus history.",
        ),
        KnowledgeEntry::new(
            "who_dev",
            &["pengembang", "siapa pembuat", "info pengembang"],
            "Dikembangkan oleh Rikdev Apps.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_loads() {
        let kb = KnowledgeBase::builtin();
        assert_eq!(kb.len(), 7);
        assert!(kb.entries().iter().all(|e| !e.reply.is_empty()));
    }

    #[test]
    fn test_website_question_hits_build_website() {
        let kb = KnowledgeBase::builtin();
        let m = kb.best_match("cara buat website sederhana").expect("should match");
        assert_eq!(m.entry.id, "build_website");
        assert!(m.score > 0.08, "score {}", m.score);
    }

    #[test]
    fn test_developer_question() {
        let kb = KnowledgeBase::builtin();
        let m = kb.best_match("siapa pengembang aplikasi ini").unwrap();
        assert_eq!(m.entry.id, "who_dev");
    }

    #[test]
    fn test_unrelated_text_has_no_match() {
        let kb = KnowledgeBase::builtin();
        assert!(kb.best_match("zzzz qqqq").is_none());
        assert!(kb.best_match("").is_none());
    }

    #[test]
    fn test_scores_are_true_cosine() {
        let kb = KnowledgeBase::new(vec![
            KnowledgeEntry::new("long", &["alpha beta", "gamma delta epsilon"], "x"),
            KnowledgeEntry::new("short", &["alpha beta"], "y"),
        ]);
        // Both are triggered; normalized cosine prefers the tighter entry.
        let m = kb.best_match("alpha beta").unwrap();
        assert_eq!(m.entry.id, "short");
        assert!((m.score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_reply_text_does_not_trigger() {
        // "hari" and "saya" only appear in reply texts.
        let kb = KnowledgeBase::builtin();
        for msg in ["aku bingung hari ini", "saya sedih", "saya punya error di server"] {
            assert!(kb.best_match(msg).is_none(), "{msg} should not hit the knowledge base");
        }
    }

    #[test]
    fn test_partial_phrase_does_not_trigger() {
        let kb = KnowledgeBase::builtin();
        // "ini" alone is half of "siapa ini".
        assert!(kb.best_match("ini apa").is_none());
        assert_eq!(kb.best_match("eh siapa ini?").unwrap().entry.id, "whoareyou");
    }

    #[test]
    fn test_empty_base() {
        let kb = KnowledgeBase::default();
        assert!(kb.is_empty());
        assert!(kb.best_match("halo").is_none());
    }
}
