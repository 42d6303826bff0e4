// RikTech Engine — Recall
//
// Small lexical retrieval layer used to pick replies.
//
// Module layout:
//   tokenizer   — text → lowercase [a-z0-9] tokens
//   vectorizer  — normalized TF, document-frequency table, TF-IDF
//   similarity  — cosine over sparse vectors
//   mod.rs      — `Corpus`: a TF-IDF snapshot with best-match lookup

pub mod similarity;
pub mod tokenizer;
pub mod vectorizer;

pub use similarity::cosine;
pub use tokenizer::tokenize;
pub use vectorizer::{normalized_tf, DocumentFrequency, TermVector};

/// Best-scoring document in a corpus.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub index: usize,
    pub score: f64,
}

/// Pick the highest score; ties keep the earliest index. Scores of 0 never
/// count as a match.
pub fn best_of(scores: impl IntoIterator<Item = f64>) -> Option<Match> {
    let mut best: Option<Match> = None;
    for (index, score) in scores.into_iter().enumerate() {
        let current = best.as_ref().map(|m| m.score).unwrap_or(0.0);
        if score > current {
            best = Some(Match { index, score });
        }
    }
    best
}

/// TF-IDF snapshot over a fixed list of documents.
///
/// The document-frequency table and document vectors are computed once in
/// [`Corpus::build`]; queries only need the table.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    documents: Vec<String>,
    vectors: Vec<TermVector>,
    df: DocumentFrequency,
}

impl Corpus {
    /// Build from raw documents. Blank documents (no tokens) are dropped.
    pub fn build<I, S>(documents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut kept = Vec::new();
        let mut tokenized = Vec::new();
        for doc in documents {
            let doc: String = doc.into();
            let toks = tokenize(&doc);
            if toks.is_empty() {
                continue;
            }
            kept.push(doc);
            tokenized.push(toks);
        }

        let df = DocumentFrequency::from_documents(&tokenized);
        let vectors = tokenized.iter().map(|t| df.tf_idf(t)).collect();

        Corpus { documents: kept, vectors, df }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn document(&self, index: usize) -> Option<&str> {
        self.documents.get(index).map(String::as_str)
    }

    pub fn document_frequency(&self) -> &DocumentFrequency {
        &self.df
    }

    /// Vectorize a query with this corpus's df table and N.
    pub fn vectorize(&self, text: &str) -> TermVector {
        self.df.tf_idf(&tokenize(text))
    }

    /// Cosine score of `text` against every document, in corpus order.
    pub fn scores(&self, text: &str) -> Vec<f64> {
        let q = self.vectorize(text);
        self.vectors.iter().map(|d| cosine(&q, d)).collect()
    }

    /// Most similar document, earliest wins on ties. `None` when nothing
    /// shares a token with the query.
    pub fn best_match(&self, text: &str) -> Option<Match> {
        best_of(self.scores(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_corpus_has_no_match() {
        let c = Corpus::build(Vec::<String>::new());
        assert!(c.is_empty());
        assert_eq!(c.best_match("anything"), None);
    }

    #[test]
    fn test_blank_documents_dropped() {
        let c = Corpus::build(["", "   ", "?!", "real text"]);
        assert_eq!(c.len(), 1);
        assert_eq!(c.document(0), Some("real text"));
    }

    #[test]
    fn test_best_match_picks_closest() {
        let c = Corpus::build([
            "cara deploy ke vercel",
            "error typeerror undefined is not a function",
            "resep nasi goreng",
        ]);
        let m = c.best_match("typeerror lagi").expect("should match");
        assert_eq!(m.index, 1);
        assert!(m.score > 0.0 && m.score <= 1.0);
    }

    #[test]
    fn test_no_shared_tokens_means_no_match() {
        let c = Corpus::build(["alpha beta", "gamma delta"]);
        assert_eq!(c.best_match("omega"), None);
    }

    #[test]
    fn test_tie_breaks_to_first_document() {
        // Three documents each containing "website" once: idf = ln(1.75) for all.
        let c = Corpus::build(["website", "website", "website"]);
        let idf = c.document_frequency().idf("website");
        assert!((idf - 1.75f64.ln()).abs() < 1e-12);

        let scores = c.scores("website");
        assert_eq!(scores.len(), 3);
        assert!(scores.iter().all(|s| (s - scores[0]).abs() < 1e-12), "{scores:?}");

        let m = c.best_match("website").unwrap();
        assert_eq!(m.index, 0, "ties must resolve to the first-seen document");
    }

    #[test]
    fn test_tie_with_different_filler_still_first_seen() {
        let c = Corpus::build(["website satu", "website dua", "website tiga"]);
        let m = c.best_match("website").unwrap();
        assert_eq!(m.index, 0);
    }

    #[test]
    fn test_best_of_ignores_zero_and_keeps_earliest() {
        assert_eq!(best_of([0.0, 0.0]), None);
        assert_eq!(best_of([0.2, 0.5, 0.5]), Some(Match { index: 1, score: 0.5 }));
    }

    #[test]
    fn test_query_vector_uses_snapshot_df() {
        let c = Corpus::build(["a b", "a c"]);
        let q = c.vectorize("a z");
        // a: df 2 of N 2 → ln(1 + 2/3); z unseen → ln(3)
        assert!((q["a"] - (1.0f64 + 2.0 / 3.0).ln()).abs() < 1e-12);
        assert!((q["z"] - 3f64.ln()).abs() < 1e-12);
    }
}
