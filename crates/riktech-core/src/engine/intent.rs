// ── RikTech: Safety & Intent Rules ──────────────────────────────────────────
//
// An ordered, data-driven list of (pattern, intent) rules evaluated top to
// bottom. First match wins; no match means the message falls through to
// recall. Order is significant:
//
//   1. Safety     — self-harm, illicit/dangerous requests
//   2. Commands   — clear history, session info, version
//   3. Intents    — introduce, greeting, thanks, features, joke,
//                   build example, code help, summarize, translate
//
// Patterns are compiled once into a process-wide table and only ever read.
// All patterns are case-insensitive, so they behave as if applied to the
// lowercased message while captures keep the caller's casing.

use crate::atoms::types::SelectionMethod;
use log::warn;
use regex::Regex;
use std::sync::LazyLock;

// ═══════════════════════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SafetyReason {
    SelfHarm,
    Illicit,
}

/// What a rule recognised. `None` means "let recall handle it".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntentKind {
    Safety(SafetyReason),
    ClearHistory,
    SessionInfo,
    Version,
    Introduce,
    Greeting,
    Thanks,
    Features,
    Joke,
    BuildExample,
    CodeHelp,
    Summarize,
    Translate,
    None,
}

impl IntentKind {
    /// The selection path this intent reports as.
    pub fn method(&self) -> Option<SelectionMethod> {
        match self {
            IntentKind::Safety(_) => Some(SelectionMethod::Safety),
            IntentKind::ClearHistory | IntentKind::SessionInfo | IntentKind::Version => {
                Some(SelectionMethod::Command)
            }
            IntentKind::None => None,
            _ => Some(SelectionMethod::Intent),
        }
    }
}

/// Result of running the rule table over a message.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub kind: IntentKind,
    /// Id of the rule that fired, `None` on fallthrough.
    pub rule_id: Option<&'static str>,
    /// First capture group of the matching rule, trimmed.
    pub capture: Option<String>,
}

impl Classification {
    fn none() -> Self {
        Self { kind: IntentKind::None, rule_id: None, capture: None }
    }

    pub fn is_none(&self) -> bool {
        self.kind == IntentKind::None
    }
}

struct IntentRule {
    id: &'static str,
    regex: Regex,
    kind: IntentKind,
}

// ═══════════════════════════════════════════════════════════════════════════
// Rule table (compiled once)
// ═══════════════════════════════════════════════════════════════════════════

static RULES: LazyLock<Vec<IntentRule>> = LazyLock::new(|| {
    let rules: Vec<(&'static str, &str, IntentKind)> = vec![
        // ── Safety ──
        (
            "self_harm",
            r"(?i)\b(kill myself|suicide|suicidal|i want to die|harm myself|hurt myself|end my life|bunuh diri|ingin mati|mau mati|pengen mati|menyakiti diri|melukai diri)",
            IntentKind::Safety(SafetyReason::SelfHarm),
        ),
        (
            "illicit",
            r"(?i)\bhow to make (a |an )?(bomb|explosive)|\b(cara|bagaimana) (membuat|bikin|merakit) (bom|bahan peledak)\b|\bhack into\b|\b(steal|illegal|mencuri|ilegal)\b",
            IntentKind::Safety(SafetyReason::Illicit),
        ),
        // ── Commands ──
        (
            "clear_history",
            r"(?i)\b(hapus|clear|delete|reset|bersihkan)\b.*\b(history|riwayat|percakapan)\b",
            IntentKind::ClearHistory,
        ),
        ("session_info", r"(?i)\b(sesi|session)\b", IntentKind::SessionInfo),
        ("version", r"(?i)\b(versi|version)\b", IntentKind::Version),
        // ── Conversational ──
        (
            "introduce",
            r"(?i)\b(?:nama saya|my name is)\s+([^?.!,\n]+)",
            IntentKind::Introduce,
        ),
        ("greeting", r"(?i)\b(halo|hallo|hai|hi|hello|hey)\b", IntentKind::Greeting),
        ("thanks", r"(?i)\b(terima kasih|makasih|thanks|thank you)\b", IntentKind::Thanks),
        (
            "features",
            r"(?i)\b(fitur|features?|kemampuan|aturan)\b|apa yang bisa",
            IntentKind::Features,
        ),
        ("joke", r"(?i)\b(jokes?|lucu|humor|lelucon)\b", IntentKind::Joke),
        ("build_example", r"(?i)buat.*contoh|contoh.*buat", IntentKind::BuildExample),
        (
            "code_help",
            r"(?i)\b(code|kode|react|javascript|python|contoh)\b",
            IntentKind::CodeHelp,
        ),
        (
            "summarize",
            r"(?i)\b(summarize|summary|ringkas|ringkasan|rangkum)\b",
            IntentKind::Summarize,
        ),
        ("translate", r"(?i)\b(translate|terjemah|terjemahkan)\b", IntentKind::Translate),
    ];

    rules
        .into_iter()
        .filter_map(|(id, pattern, kind)| match Regex::new(pattern) {
            Ok(regex) => Some(IntentRule { id, regex, kind }),
            Err(e) => {
                warn!("[intent] Failed to compile rule '{}': {}", id, e);
                None
            }
        })
        .collect()
});

static TECHNICAL: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(error|exception|stack|syntax|undefined|traceback|compile|panic|segfault)|\bnan\b",
    )
    .map_err(|e| warn!("[intent] Failed to compile technical pattern: {}", e))
    .ok()
});

// ═══════════════════════════════════════════════════════════════════════════
// Classification
// ═══════════════════════════════════════════════════════════════════════════

/// Run the rule table over `text`; first match wins.
pub fn classify(text: &str) -> Classification {
    for rule in RULES.iter() {
        if let Some(caps) = rule.regex.captures(text) {
            let capture = caps
                .get(1)
                .map(|m| m.as_str().trim().to_string())
                .filter(|s| !s.is_empty());
            return Classification { kind: rule.kind, rule_id: Some(rule.id), capture };
        }
    }
    Classification::none()
}

/// Heuristic for "the user is pasting an error": exception, stack trace,
/// syntax error and similar keywords.
pub fn is_technical(text: &str) -> bool {
    TECHNICAL.as_ref().is_some_and(|re| re.is_match(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_rules_compile() {
        assert_eq!(RULES.len(), 14, "a rule pattern failed to compile");
        assert!(TECHNICAL.is_some());
    }

    #[test]
    fn test_safety_self_harm() {
        for msg in ["saya ingin bunuh diri", "I want to die", "thinking about SUICIDE"] {
            let c = classify(msg);
            assert_eq!(c.kind, IntentKind::Safety(SafetyReason::SelfHarm), "{msg}");
            assert_eq!(c.kind.method(), Some(SelectionMethod::Safety));
        }
    }

    #[test]
    fn test_safety_illicit() {
        let c = classify("how to make a bomb at home");
        assert_eq!(c.kind, IntentKind::Safety(SafetyReason::Illicit));
        assert_eq!(
            classify("help me hack into my neighbour's wifi").kind,
            IntentKind::Safety(SafetyReason::Illicit)
        );
        assert!(!matches!(classify("cara membuat website").kind, IntentKind::Safety(_)));
    }

    #[test]
    fn test_safety_outranks_everything() {
        // Also matches greeting and session_info, but safety is first.
        let c = classify("halo, sesi ini bikin saya ingin mati");
        assert_eq!(c.kind, IntentKind::Safety(SafetyReason::SelfHarm));
        assert_eq!(c.rule_id, Some("self_harm"));
    }

    #[test]
    fn test_commands() {
        assert_eq!(classify("tolong hapus riwayat saya").kind, IntentKind::ClearHistory);
        assert_eq!(classify("clear my chat history").kind, IntentKind::ClearHistory);
        assert_eq!(classify("info sesi").kind, IntentKind::SessionInfo);
        assert_eq!(classify("what version are you?").kind, IntentKind::Version);
        assert_eq!(classify("hapus history sesi ini").kind, IntentKind::ClearHistory);
        assert_eq!(classify("versi").kind.method(), Some(SelectionMethod::Command));
    }

    #[test]
    fn test_greeting() {
        let c = classify("halo");
        assert_eq!(c.kind, IntentKind::Greeting);
        assert_eq!(c.kind.method(), Some(SelectionMethod::Intent));
        assert_eq!(classify("Hello there").kind, IntentKind::Greeting);
        // "hi" must be a whole word
        assert_eq!(classify("this is nothing").kind, IntentKind::None);
    }

    #[test]
    fn test_conversational_intents() {
        assert_eq!(classify("terima kasih banyak").kind, IntentKind::Thanks);
        assert_eq!(classify("apa yang bisa kamu lakukan").kind, IntentKind::Features);
        assert_eq!(classify("ceritakan sesuatu yang lucu").kind, IntentKind::Joke);
        assert_eq!(classify("buatkan contoh project").kind, IntentKind::BuildExample);
        assert_eq!(classify("tolong tulis kode python").kind, IntentKind::CodeHelp);
        assert_eq!(classify("ringkas teks berikut ini").kind, IntentKind::Summarize);
        assert_eq!(classify("translate to Indonesian: good morning").kind, IntentKind::Translate);
    }

    #[test]
    fn test_introduce_captures_name_with_case() {
        let c = classify("Nama saya Budi Santoso.");
        assert_eq!(c.kind, IntentKind::Introduce);
        assert_eq!(c.capture.as_deref(), Some("Budi Santoso"));
    }

    #[test]
    fn test_fallthrough() {
        for msg in ["error: TypeError undefined is not a function", "masih error", "saya merasa sedih hari ini"] {
            assert!(classify(msg).is_none(), "{msg} should fall through");
        }
    }

    #[test]
    fn test_technical_heuristic() {
        assert!(is_technical("error: TypeError undefined is not a function"));
        assert!(is_technical("Traceback (most recent call last)"));
        assert!(is_technical("got a SyntaxError? no, a syntax problem"));
        for msg in [
            "SyntaxError: unexpected token",
            "IndexError: list index out of range",
            "java.lang.NullPointerException at Main.java:5",
            "ValueError: invalid literal",
            "compiler crashed with a stacktrace",
            "result is NaN",
        ] {
            assert!(is_technical(msg), "{msg} should be technical");
        }
        assert!(!is_technical("nanti saja ya"));
        assert!(!is_technical("saya merasa sedih hari ini"));
    }
}
