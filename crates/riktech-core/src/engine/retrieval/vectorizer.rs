// ── Recall: Vectorizer ──────────────────────────────────────────────────────
//
// Sparse term vectors in two flavours:
//   - normalized TF: raw counts divided by their Euclidean norm
//   - TF-IDF: count × ln(1 + N / (1 + df)), using a document-frequency table
//     computed once per corpus snapshot
//
// Weights are always ≥ 0. Vectorizing a query against a fixed corpus only
// consults the precomputed `DocumentFrequency`, never the documents.

use std::collections::{HashMap, HashSet};

/// Sparse token → weight map. Absent token means weight 0.
pub type TermVector = HashMap<String, f64>;

/// Raw occurrence counts per token.
pub fn term_counts<S: AsRef<str>>(tokens: &[S]) -> HashMap<String, usize> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for t in tokens {
        *counts.entry(t.as_ref().to_string()).or_default() += 1;
    }
    counts
}

/// Normalized term frequency: counts scaled to unit Euclidean length.
/// An empty token list gives an empty vector.
pub fn normalized_tf<S: AsRef<str>>(tokens: &[S]) -> TermVector {
    let counts = term_counts(tokens);
    let norm = counts.values().map(|&c| (c * c) as f64).sum::<f64>().sqrt();
    let divisor = if norm > 0.0 { norm } else { 1.0 };

    counts
        .into_iter()
        .map(|(t, c)| (t, c as f64 / divisor))
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════
// Document frequency
// ═══════════════════════════════════════════════════════════════════════════

/// For each token, the number of corpus documents containing it at least once,
/// plus the corpus size `N`.
#[derive(Debug, Clone, Default)]
pub struct DocumentFrequency {
    df: HashMap<String, usize>,
    docs: usize,
}

impl DocumentFrequency {
    /// Build from tokenized documents. O(total tokens).
    pub fn from_documents<S: AsRef<str>>(documents: &[Vec<S>]) -> Self {
        let mut df: HashMap<String, usize> = HashMap::new();
        for tokens in documents {
            let unique: HashSet<&str> = tokens.iter().map(|t| t.as_ref()).collect();
            for term in unique {
                *df.entry(term.to_string()).or_default() += 1;
            }
        }
        Self { df, docs: documents.len() }
    }

    /// Number of documents containing `term`; 0 when never seen.
    pub fn df(&self, term: &str) -> usize {
        self.df.get(term).copied().unwrap_or(0)
    }

    /// Corpus size N.
    pub fn corpus_size(&self) -> usize {
        self.docs
    }

    /// ln(1 + N / (1 + df(t))). Unseen terms get the largest weight.
    pub fn idf(&self, term: &str) -> f64 {
        let n = self.docs as f64;
        (1.0 + n / (1.0 + self.df(term) as f64)).ln()
    }

    /// TF-IDF vector for a token sequence against this table.
    pub fn tf_idf<S: AsRef<str>>(&self, tokens: &[S]) -> TermVector {
        term_counts(tokens)
            .into_iter()
            .map(|(t, c)| {
                let w = c as f64 * self.idf(&t);
                (t, w)
            })
            .collect()
    }
}
