//! BM25-Okapi lexical scoring over a per-query candidate set
//!
//! Scores are computed fresh for every call: IDF comes from the supplied
//! candidates alone, so the same text can score differently under
//! different candidate populations. Nothing is cached between calls.

use std::collections::HashMap;

const K1: f32 = 1.5;
const B: f32 = 0.75;
/// Negative-IDF floor factor: terms appearing in more than half the
/// candidates get `EPSILON * average_idf` instead of a negative weight.
const EPSILON: f32 = 0.25;

/// Score each candidate against the query. Output is aligned with the
/// input; an empty candidate list yields an empty output.
pub fn bm25_scores(query: &str, candidates: &[String]) -> Vec<f32> {
    if candidates.is_empty() {
        return Vec::new();
    }

    let corpus: Vec<Vec<String>> = candidates.iter().map(|c| tokenize(c)).collect();
    let corpus_len = corpus.len() as f32;
    let avgdl = corpus.iter().map(|d| d.len() as f32).sum::<f32>() / corpus_len;

    // document frequency per term
    let mut doc_freq: HashMap<&str, usize> = HashMap::new();
    for doc in &corpus {
        let mut seen: Vec<&str> = Vec::new();
        for term in doc {
            if !seen.contains(&term.as_str()) {
                seen.push(term);
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }
    }

    // Okapi IDF with the rank-bm25 epsilon floor for common terms
    let mut idf: HashMap<&str, f32> = HashMap::new();
    let mut idf_sum = 0.0f32;
    let mut negative: Vec<&str> = Vec::new();
    for (&term, &freq) in &doc_freq {
        let value = ((corpus_len - freq as f32 + 0.5) / (freq as f32 + 0.5)).ln();
        idf.insert(term, value);
        idf_sum += value;
        if value < 0.0 {
            negative.push(term);
        }
    }
    let average_idf = idf_sum / idf.len().max(1) as f32;
    let floor = EPSILON * average_idf;
    for term in negative {
        idf.insert(term, floor);
    }

    let query_terms = tokenize(query);
    corpus
        .iter()
        .map(|doc| {
            let dl = doc.len() as f32;
            let mut term_freq: HashMap<&str, f32> = HashMap::new();
            for term in doc {
                *term_freq.entry(term).or_insert(0.0) += 1.0;
            }
            query_terms
                .iter()
                .map(|q| {
                    let f = term_freq.get(q.as_str()).copied().unwrap_or(0.0);
                    if f == 0.0 {
                        return 0.0;
                    }
                    let w = idf.get(q.as_str()).copied().unwrap_or(0.0);
                    w * (f * (K1 + 1.0)) / (f + K1 * (1.0 - B + B * dl / avgdl.max(f32::EPSILON)))
                })
                .sum()
        })
        .collect()
}

/// Lowercase whitespace tokenization, empty tokens dropped.
fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|t| t.to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn empty_candidates_give_empty_scores() {
        assert!(bm25_scores("anything", &[]).is_empty());
    }

    #[test]
    fn output_aligns_with_input() {
        let candidates = docs(&["alpha beta", "gamma delta", "alpha alpha"]);
        let scores = bm25_scores("alpha", &candidates);
        assert_eq!(scores.len(), 3);
    }

    #[test]
    fn matching_terms_outscore_non_matching() {
        let candidates = docs(&[
            "FastAPI is a Python web framework",
            "cats sleep most of the day",
            "the weather is nice today",
        ]);
        let scores = bm25_scores("python framework", &candidates);
        assert!(scores[0] > scores[1]);
        assert!(scores[0] > scores[2]);
        assert_eq!(scores[1], 0.0);
    }

    #[test]
    fn scoring_is_case_insensitive() {
        let candidates = docs(&["Rust Is Fast", "slow snail"]);
        let scores = bm25_scores("RUST", &candidates);
        assert!(scores[0] > 0.0);
        assert_eq!(scores[1], 0.0);
    }

    #[test]
    fn idf_depends_on_candidate_population() {
        // "shared" is rare in the first population, ubiquitous in the second
        let rare = docs(&["shared term here", "nothing else", "unrelated text"]);
        let common = docs(&["shared term here", "shared again", "shared once more"]);
        let rare_score = bm25_scores("shared", &rare)[0];
        let common_score = bm25_scores("shared", &common)[0];
        assert!(rare_score > common_score);
    }
}
