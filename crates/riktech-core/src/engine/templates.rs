// ── RikTech: Reply Templates ────────────────────────────────────────────────
//
// Fixed and lightly parameterised reply text for every non-recall path, plus
// the pluggable randomness used to rotate the empathetic fallbacks.

use super::intent::{IntentKind, SafetyReason};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const SAFETY_MESSAGE: &str = "Maaf, saya tidak bisa membantu permintaan tersebut. Jika Anda dalam bahaya atau berpikir menyakiti diri sendiri, tolong hubungi layanan darurat setempat (112) atau orang terdekat. Saya dapat mencoba menemani dan mencari sumber bantuan.";

pub const TECHNICAL_TRIAGE: &str = "Sepertinya Anda menemui masalah teknis. Coba langkah ini: (1) sebutkan platform & bahasa; (2) berikan potongan kode minimal yang mereproduksi error; (3) kirim juga pesan error lengkap. Saya akan bantu analisa baris per baris.";

pub const EMPATHY_TEMPLATES: [&str; 3] = [
    "Saya mendengar kamu. Ceritakan lebih lanjut — saya di sini untuk mendengarkan.",
    "Maaf kamu mengalami itu. Jika mau, jelaskan situasinya dari awal, saya bantu langkah demi langkah.",
    "Terima kasih sudah berbagi. Apa yang paling mengganggu dari masalah ini?",
];

pub const HISTORY_CLEARED: &str = "History percakapan Anda berhasil dihapus.";

pub const HISTORY_CLEAR_FAILED: &str = "Maaf, history percakapan Anda gagal dihapus. Silakan coba lagi nanti.";

const CODE_SNIPPET: &str = "function Greeting({ name }) {\n  return <div className=\"greeting\">Hai, {name}!</div>;\n}\nexport default Greeting;";

// ═══════════════════════════════════════════════════════════════════════════
// Randomness
// ═══════════════════════════════════════════════════════════════════════════

/// Source of template indices. Injected into the responder so tests can pin
/// the choice.
pub trait ReplyRng: Send {
    /// Index in `0..len`. `len` is always > 0.
    fn pick(&mut self, len: usize) -> usize;
}

impl ReplyRng for StdRng {
    fn pick(&mut self, len: usize) -> usize {
        self.gen_range(0..len)
    }
}

/// Deterministic rotation: 0, 1, 2, …, wrapping.
#[derive(Debug, Clone, Default)]
pub struct RoundRobin {
    next: usize,
}

impl ReplyRng for RoundRobin {
    fn pick(&mut self, len: usize) -> usize {
        let i = self.next % len;
        self.next = self.next.wrapping_add(1);
        i
    }
}

/// OS-seeded generator for production use.
pub fn entropy_rng() -> Box<dyn ReplyRng> {
    Box::new(StdRng::from_entropy())
}

pub fn pick_empathy(rng: &mut dyn ReplyRng) -> &'static str {
    EMPATHY_TEMPLATES[rng.pick(EMPATHY_TEMPLATES.len())]
}

// ═══════════════════════════════════════════════════════════════════════════
// Rule-driven replies
// ═══════════════════════════════════════════════════════════════════════════

/// Everything an intent template might need from the current request.
#[derive(Debug, Clone)]
pub struct TemplateContext<'a> {
    pub message: &'a str,
    pub session_id: &'a str,
    /// Turns in the session including the message being answered.
    pub turn_count: usize,
    pub capture: Option<&'a str>,
    pub version_label: &'a str,
    pub summary_chars: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub text: String,
    pub suggestions: Vec<String>,
}

impl Rendered {
    fn plain(text: impl Into<String>) -> Self {
        Self { text: text.into(), suggestions: Vec::new() }
    }

    fn with(text: impl Into<String>, suggestions: &[&str]) -> Self {
        Self {
            text: text.into(),
            suggestions: suggestions.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Reply for a matched rule. `IntentKind::None` has no template.
pub fn render(kind: IntentKind, ctx: &TemplateContext<'_>) -> Option<Rendered> {
    let rendered = match kind {
        IntentKind::Safety(SafetyReason::SelfHarm) | IntentKind::Safety(SafetyReason::Illicit) => {
            Rendered::plain(SAFETY_MESSAGE)
        }
        IntentKind::ClearHistory => Rendered::plain(HISTORY_CLEARED),
        IntentKind::SessionInfo => Rendered::plain(format!(
            "Session Anda: {}. Jumlah pesan: {}.",
            ctx.session_id, ctx.turn_count
        )),
        IntentKind::Version => Rendered::plain(ctx.version_label),
        IntentKind::Introduce => match ctx.capture {
            Some(name) => Rendered::plain(format!(
                "Terima kasih, {name}. Saya akan ingat nama itu untuk sesi ini."
            )),
            None => Rendered::plain("Senang berkenalan! Siapa nama Anda?"),
        },
        IntentKind::Greeting => Rendered::with(
            "Halo! Saya RikTech AI. Mau tanya tentang apa? (mis. kode, ringkasan, terjemah, atau minta fitur).",
            &["Tunjukkan fitur", "Buat contoh React small component", "Bantu ringkas teks"],
        ),
        IntentKind::Thanks => Rendered::plain("Sama-sama — senang membantu!"),
        IntentKind::Features => Rendered::plain(
            "Saya dapat: (1) menjawab pertanyaan umum, (2) membantu dengan contoh kode, (3) ringkasan teks sederhana, (4) deteksi intent, (5) history session lokal. Semua berjalan tanpa layanan eksternal.",
        ),
        IntentKind::Joke => Rendered::plain(
            "Kenapa programmer sering lupa hari ulang tahun? Karena mereka selalu menghitung dalam binary.",
        ),
        IntentKind::BuildExample => Rendered::plain(
            "Baik — saya bisa buatkan contoh struktur project sederhana (HTML/CSS/JS) atau contoh kode Next.js. Mau yang mana?",
        ),
        IntentKind::CodeHelp => Rendered::with(
            format!(
                "Saya bisa bantu contoh kode. Berikut contoh kecil komponen React functional untuk menampilkan greeting:\n\n{CODE_SNIPPET}"
            ),
            &["Jelaskan baris per baris", "Buat versi class component", "Tambahkan state"],
        ),
        IntentKind::Summarize => Rendered::with(
            format!("Ringkasan (sederhana):\n{}", truncate_chars(ctx.message.trim(), ctx.summary_chars)),
            &["Ringkas lagi (lebih pendek)", "Ekstrak poin penting"],
        ),
        IntentKind::Translate => {
            let lower = ctx.message.to_lowercase();
            if lower.contains("translate to indonesian") || lower.contains("translate to bahasa") {
                Rendered::plain("Terjemahan (sederhana): Saya mampu membantu terjemahan sederhana — tapi ini bukan penerjemah profesional. Silakan masukkan kalimat yang ingin diterjemahkan.")
            } else {
                Rendered::plain("Perintah translate diterima — sebutkan bahasa tujuan, contoh: \"translate to Indonesian: Hello world\"")
            }
        }
        IntentKind::None => return None,
    };
    Some(rendered)
}

/// First `max_chars` characters of `text`, with "..." appended when cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

/// Reply built from a recalled earlier message.
pub fn recall_reply(retrieved: &str) -> String {
    format!(
        "Saya menemukan percakapan mirip sebelumnya: \"{retrieved}\" — berdasarkan itu, saya sarankan: jelaskan sedikit detail lagi supaya saya bisa beri instruksi lebih tepat."
    )
}
