// ── Recall: Tokenizer ───────────────────────────────────────────────────────
//
// Single source of truth for turning free text into word tokens. Every other
// recall component (vectorizer, knowledge base, corpus) goes through here so
// a query and the documents it is scored against are always normalised the
// same way.
//
// Rules:
//   1. Lowercase.
//   2. Anything that is not an ASCII letter, ASCII digit or whitespace becomes
//      a space. Accented and non-Latin letters are dropped too.
//   3. Split on runs of whitespace, drop empties.

/// Normalise `text` into lowercase `[a-z0-9]+` tokens, in input order.
///
/// Order is preserved because term-frequency counting consumes the sequence.
/// Empty or whitespace-only input gives an empty vector.
pub fn tokenize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    cleaned.split_whitespace().map(str::to_string).collect()
}
