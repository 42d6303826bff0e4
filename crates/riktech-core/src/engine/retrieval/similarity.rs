// ── Recall: Similarity ──────────────────────────────────────────────────────
//
// True cosine similarity over sparse term vectors. Every caller (history
// recall and knowledge base) uses this one definition, so longer documents do
// not win just by carrying more weight.

use super::vectorizer::TermVector;

/// Euclidean norm of a sparse vector.
pub fn norm(v: &TermVector) -> f64 {
    v.values().map(|w| w * w).sum::<f64>().sqrt()
}

/// Dot product over the tokens the two vectors share.
pub fn dot(a: &TermVector, b: &TermVector) -> f64 {
    // Walk the smaller map, look up in the larger.
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small
        .iter()
        .filter_map(|(t, w)| large.get(t).map(|x| w * x))
        .sum()
}

/// Cosine similarity. Returns 0.0 if either vector has zero norm.
/// For non-negative vectors the result lies in [0, 1].
pub fn cosine(a: &TermVector, b: &TermVector) -> f64 {
    let denom = norm(a) * norm(b);
    if denom < 1e-12 {
        return 0.0;
    }
    (dot(a, b) / denom).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vec_of(pairs: &[(&str, f64)]) -> TermVector {
        pairs.iter().map(|(t, w)| (t.to_string(), *w)).collect()
    }

    #[test]
    fn cosine_identical_vectors() {
        let v = vec_of(&[("a", 1.0), ("b", 2.0), ("c", 3.0)]);
        assert!((cosine(&v, &v) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn cosine_scaled_vector_is_still_one() {
        let a = vec_of(&[("a", 1.0), ("b", 2.0)]);
        let b = vec_of(&[("a", 10.0), ("b", 20.0)]);
        assert!((cosine(&a, &b) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn cosine_disjoint_vectors() {
        let a = vec_of(&[("a", 1.0)]);
        let b = vec_of(&[("b", 1.0)]);
        assert_eq!(cosine(&a, &b), 0.0);
    }

    #[test]
    fn cosine_zero_vector() {
        let a = vec_of(&[("a", 0.0), ("b", 0.0)]);
        let b = vec_of(&[("a", 1.0), ("b", 2.0)]);
        assert_eq!(cosine(&a, &b), 0.0);
        assert_eq!(cosine(&TermVector::new(), &b), 0.0);
        assert_eq!(cosine(&TermVector::new(), &TermVector::new()), 0.0);
    }

    #[test]
    fn cosine_partial_overlap_in_unit_range() {
        let a = vec_of(&[("a", 1.0), ("b", 1.0)]);
        let b = vec_of(&[("b", 1.0), ("c", 1.0)]);
        let s = cosine(&a, &b);
        assert!((s - 0.5).abs() < 1e-9, "got {s}");
    }

    #[test]
    fn dot_is_symmetric() {
        let a = vec_of(&[("a", 1.0), ("b", 2.0), ("c", 0.5)]);
        let b = vec_of(&[("b", 3.0)]);
        assert_eq!(dot(&a, &b), dot(&b, &a));
        assert_eq!(dot(&a, &b), 6.0);
    }
}
