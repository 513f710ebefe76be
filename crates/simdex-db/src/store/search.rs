//! Result ordering and hybrid rank fusion.
//!
//! Vector-only search ranks by the index's native ordering. Hybrid search
//! runs a vector query and a keyword (full-text) query, then fuses the two
//! ranked lists client-side with a deterministic policy:
//!
//! 1. candidates present in **both** lists outrank candidates present in
//!    only one;
//! 2. within a tier, ascending vector rank is the primary key (keyword-only
//!    candidates carry no vector rank and order last);
//! 3. descending keyword score breaks ties;
//! 4. ascending id makes the order total.
//!
//! The policy is stable under repeated identical queries.

use super::types::DistanceStrategy;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// A ranked hit from a single retrieval modality: item id plus the
/// backend-native score.
pub type RankedHit = (String, f32);

/// Comparator for backend-native scores under the given strategy:
/// descending similarity for cosine, ascending distance for euclidean.
pub fn compare_native(a: f32, b: f32, strategy: DistanceStrategy) -> Ordering {
    let ordering = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
    if strategy.higher_is_better() {
        ordering.reverse()
    } else {
        ordering
    }
}

#[derive(Debug, Default)]
struct Candidate {
    vector_rank: Option<usize>,
    vector_score: Option<f32>,
    keyword_score: Option<f32>,
}

/// Fuse a vector-ranked list and a keyword-ranked list into one ordered
/// result of at most `k` ids.
///
/// Both inputs are best-first. The carried score is the vector score when
/// the candidate appeared in the vector list, otherwise its keyword score.
pub fn fuse_hybrid(
    vector_hits: &[RankedHit],
    keyword_hits: &[RankedHit],
    k: usize,
) -> Vec<RankedHit> {
    let mut candidates: BTreeMap<&str, Candidate> = BTreeMap::new();

    for (rank, (id, score)) in vector_hits.iter().enumerate() {
        let entry = candidates.entry(id.as_str()).or_default();
        entry.vector_rank = Some(rank);
        entry.vector_score = Some(*score);
    }

    for (id, score) in keyword_hits {
        let entry = candidates.entry(id.as_str()).or_default();
        entry.keyword_score = Some(*score);
    }

    let mut fused: Vec<(&str, &Candidate)> =
        candidates.iter().map(|(id, c)| (*id, c)).collect();

    fused.sort_by(|(id_a, a), (id_b, b)| {
        let both_a = a.vector_rank.is_some() && a.keyword_score.is_some();
        let both_b = b.vector_rank.is_some() && b.keyword_score.is_some();

        both_b
            .cmp(&both_a)
            .then_with(|| {
                let rank_a = a.vector_rank.unwrap_or(usize::MAX);
                let rank_b = b.vector_rank.unwrap_or(usize::MAX);
                rank_a.cmp(&rank_b)
            })
            .then_with(|| {
                let kw_a = a.keyword_score.unwrap_or(f32::NEG_INFINITY);
                let kw_b = b.keyword_score.unwrap_or(f32::NEG_INFINITY);
                kw_b.partial_cmp(&kw_a).unwrap_or(Ordering::Equal)
            })
            .then_with(|| id_a.cmp(id_b))
    });

    fused
        .into_iter()
        .take(k)
        .map(|(id, candidate)| {
            let score = candidate
                .vector_score
                .or(candidate.keyword_score)
                .unwrap_or(0.0);
            (id.to_string(), score)
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(id: &str, score: f32) -> RankedHit {
        (id.to_string(), score)
    }

    #[test]
    fn test_compare_native() {
        assert_eq!(
            compare_native(0.9, 0.5, DistanceStrategy::Cosine),
            Ordering::Less
        );
        assert_eq!(
            compare_native(0.2, 1.5, DistanceStrategy::Euclidean),
            Ordering::Less
        );
    }

    #[test]
    fn test_both_modalities_rank_first() {
        // Fixture: 2 docs match text only, 2 match vector only, 1 matches both.
        let vector_hits = vec![hit("v1", 0.9), hit("both", 0.8), hit("v2", 0.7)];
        let keyword_hits = vec![hit("t1", 3.0), hit("both", 2.5), hit("t2", 2.0)];

        let fused = fuse_hybrid(&vector_hits, &keyword_hits, 5);
        let ids: Vec<&str> = fused.iter().map(|(id, _)| id.as_str()).collect();

        assert_eq!(ids[0], "both");
        // Vector-only candidates follow in vector order, then keyword-only
        // by keyword score.
        assert_eq!(ids, vec!["both", "v1", "v2", "t1", "t2"]);
    }

    #[test]
    fn test_carried_score_prefers_vector() {
        let fused = fuse_hybrid(&[hit("a", 0.9)], &[hit("a", 3.0), hit("b", 2.0)], 5);
        assert_eq!(fused[0], ("a".to_string(), 0.9));
        assert_eq!(fused[1], ("b".to_string(), 2.0));
    }

    #[test]
    fn test_truncates_to_k() {
        let vector_hits = vec![hit("a", 0.9), hit("b", 0.8), hit("c", 0.7)];
        let fused = fuse_hybrid(&vector_hits, &[], 2);
        assert_eq!(fused.len(), 2);
        assert_eq!(fused[0].0, "a");
    }

    #[test]
    fn test_deterministic_under_repetition() {
        let vector_hits = vec![hit("a", 0.5), hit("b", 0.5)];
        let keyword_hits = vec![hit("c", 1.0), hit("d", 1.0)];

        let first = fuse_hybrid(&vector_hits, &keyword_hits, 4);
        for _ in 0..10 {
            assert_eq!(fuse_hybrid(&vector_hits, &keyword_hits, 4), first);
        }
        // Equal keyword scores fall back to id order.
        let ids: Vec<&str> = first.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(fuse_hybrid(&[], &[], 10).is_empty());
    }
}
