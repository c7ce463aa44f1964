use crate::core::error::{Error, Result};

/// Similarity assigned when either vector has zero magnitude (or the result
/// is NaN). Lower than any real cosine similarity.
pub const ZERO_MAGNITUDE_SIMILARITY: f32 = f32::NEG_INFINITY;

/// Winning candidate for one query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    pub index: usize,
    pub similarity: f32,
}

/// Cosine similarity of two equal-length vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return ZERO_MAGNITUDE_SIMILARITY;
    }

    let similarity = dot_product / (norm_a * norm_b);
    if similarity.is_nan() {
        ZERO_MAGNITUDE_SIMILARITY
    } else {
        similarity
    }
}

/// Index of the candidate most similar to `query`.
///
/// Ties resolve to the lowest index, so duplicate labels always map to the
/// first one in traversal order. If every candidate scores the sentinel,
/// index 0 wins.
pub fn best_match(query: &[f32], candidates: &[Vec<f32>]) -> Result<Match> {
    if candidates.is_empty() {
        return Err(Error::EmptyCandidateSet);
    }

    let mut best = Match {
        index: 0,
        similarity: ZERO_MAGNITUDE_SIMILARITY,
    };

    for (index, candidate) in candidates.iter().enumerate() {
        if candidate.len() != query.len() {
            return Err(Error::DimensionMismatch {
                expected: query.len(),
                actual: candidate.len(),
            });
        }

        let similarity = cosine_similarity(query, candidate);
        // Strictly greater: the first occurrence of the maximum is kept
        if similarity > best.similarity {
            best = Match { index, similarity };
        }
    }

    Ok(best)
}
