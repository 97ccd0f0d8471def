//! Min-max normalization and weighted hybrid score fusion

use super::Candidate;

/// Min-max normalize scores into [0, 1].
///
/// A near-constant input (spread below 1e-9) maps everything to 0.5 so a
/// degenerate score list carries no ranking signal instead of amplifying
/// float noise. Empty in, empty out.
pub fn normalize(scores: &[f32]) -> Vec<f32> {
    if scores.is_empty() {
        return Vec::new();
    }
    let min = scores.iter().copied().fold(f32::INFINITY, f32::min);
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let spread = max - min;
    if spread < 1e-9 {
        return vec![0.5; scores.len()];
    }
    scores.iter().map(|s| (s - min) / spread).collect()
}

/// Convert an index distance (lower is better) to a similarity in (0, 1]
/// (higher is better).
pub fn distance_to_similarity(distance: f32) -> f32 {
    1.0 / (1.0 + distance.max(0.0))
}

/// Fuse vector distances with lexical scores and re-rank the candidates.
///
/// Both score sequences are aligned with `candidates` by index; all three
/// are truncated to the shortest length. `weight` is the vector share,
/// clamped to [0, 1]: 1.0 reproduces the vector ranking, 0.0 the lexical
/// ranking. Sets `fused_score` on every returned candidate and sorts
/// descending by it.
pub fn fuse(
    mut candidates: Vec<Candidate>,
    lexical_scores: &[f32],
    weight: f32,
) -> Vec<Candidate> {
    let len = candidates.len().min(lexical_scores.len());
    candidates.truncate(len);
    let weight = weight.clamp(0.0, 1.0);

    let vector_similarities: Vec<f32> = candidates
        .iter()
        .map(|c| distance_to_similarity(c.distance))
        .collect();
    let vector_norm = normalize(&vector_similarities);
    let lexical_norm = normalize(&lexical_scores[..len]);

    for (i, candidate) in candidates.iter_mut().enumerate() {
        candidate.fused_score = Some(weight * vector_norm[i] + (1.0 - weight) * lexical_norm[i]);
    }

    candidates.sort_by(|a, b| {
        b.fused_score
            .partial_cmp(&a.fused_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ChunkMetadata;

    fn candidate(text: &str, distance: f32) -> Candidate {
        Candidate {
            text: text.to_string(),
            distance,
            fused_score: None,
            rerank_score: None,
            metadata: ChunkMetadata::default(),
        }
    }

    #[test]
    fn normalize_bounds() {
        let out = normalize(&[3.0, 1.0, 2.0]);
        assert_eq!(out, vec![1.0, 0.0, 0.5]);
        for v in &out {
            assert!((0.0..=1.0).contains(v));
        }
    }

    #[test]
    fn normalize_constant_input_is_half() {
        assert_eq!(normalize(&[7.0, 7.0, 7.0]), vec![0.5, 0.5, 0.5]);
        assert_eq!(normalize(&[0.0]), vec![0.5]);
    }

    #[test]
    fn normalize_empty_is_empty() {
        assert!(normalize(&[]).is_empty());
    }

    #[test]
    fn similarity_inverts_distance() {
        assert_eq!(distance_to_similarity(0.0), 1.0);
        assert!(distance_to_similarity(1.0) < distance_to_similarity(0.5));
        assert!(distance_to_similarity(100.0) > 0.0);
    }

    #[test]
    fn full_vector_weight_reproduces_vector_ranking() {
        let candidates = vec![candidate("far", 2.0), candidate("near", 0.1)];
        // lexical strongly prefers "far", but w=1 ignores it
        let fused = fuse(candidates, &[10.0, 0.0], 1.0);
        assert_eq!(fused[0].text, "near");
    }

    #[test]
    fn zero_vector_weight_reproduces_lexical_ranking() {
        let candidates = vec![candidate("far", 2.0), candidate("near", 0.1)];
        let fused = fuse(candidates, &[10.0, 0.0], 0.0);
        assert_eq!(fused[0].text, "far");
    }

    #[test]
    fn fuse_truncates_to_shorter_side() {
        let candidates = vec![candidate("a", 0.1), candidate("b", 0.2), candidate("c", 0.3)];
        let fused = fuse(candidates, &[1.0, 0.5], 0.6);
        assert_eq!(fused.len(), 2);
    }

    #[test]
    fn fused_scores_are_set_and_sorted() {
        let candidates = vec![candidate("a", 0.5), candidate("b", 0.2), candidate("c", 0.9)];
        let fused = fuse(candidates, &[0.2, 0.9, 0.1], 0.6);
        for pair in fused.windows(2) {
            assert!(pair[0].fused_score.unwrap() >= pair[1].fused_score.unwrap());
        }
    }
}
