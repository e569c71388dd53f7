// Cosine similarity over topic embeddings.
//
// Two topics phrased differently ("app keeps crashing" vs "app crashes on
// launch") land close together in embedding space, so the angle between
// their vectors is what decides whether they are the same topic.
//
// Unlike a keyword overlap score, cosine keeps its sign here: opposite
// vectors score -1, and the clustering threshold is allowed to be negative.

use crate::error::{Result, TrendError};

use super::record::Embedding;

/// Cosine similarity between two embeddings, in [-1, 1].
///
/// Fails if the dimensions differ. A zero-magnitude vector has no direction,
/// so any comparison involving one scores 0.0 instead of dividing by zero.
pub fn cosine_similarity(a: &Embedding, b: &Embedding) -> Result<f64> {
    cosine_similarity_slices(a.as_slice(), b.as_slice())
}

/// Same as [`cosine_similarity`] on raw slices.
pub fn cosine_similarity_slices(a: &[f64], b: &[f64]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(TrendError::DimensionMismatch {
            expected: a.len(),
            found: b.len(),
        });
    }

    let scale_a = max_abs(a);
    let scale_b = max_abs(b);
    if scale_a == 0.0 || scale_b == 0.0 {
        return Ok(0.0);
    }

    // Scale each side to a max component of 1 so neither tiny nor huge
    // vectors underflow or overflow in the products below
    let dot: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (x / scale_a) * (y / scale_b))
        .sum();
    let mag_a = scaled_norm(a, scale_a);
    let mag_b = scaled_norm(b, scale_b);

    let sim = dot / mag_a / mag_b;
    if sim.is_nan() {
        // Only reachable with NaN or infinite components
        return Ok(0.0);
    }
    // Rounding can push identical vectors a hair past 1.0
    Ok(sim.clamp(-1.0, 1.0))
}

fn max_abs(values: &[f64]) -> f64 {
    values.iter().fold(0.0_f64, |acc, x| acc.max(x.abs()))
}

/// Euclidean norm of `values / scale`. Always >= 1 when `scale` is the max component.
fn scaled_norm(values: &[f64], scale: f64) -> f64 {
    values
        .iter()
        .map(|x| {
            let s = x / scale;
            s * s
        })
        .sum::<f64>()
        .sqrt()
}

/// Component-wise mean of a set of embeddings.
///
/// Used by the centroid representative policy. An empty set has no
/// dimension to speak of and yields an empty embedding.
pub fn mean_embedding(embeddings: &[&Embedding]) -> Result<Embedding> {
    let Some(first) = embeddings.first() else {
        return Ok(Embedding::from(Vec::new()));
    };

    let dim = first.dim();
    let n = embeddings.len() as f64;
    let mut mean = vec![0.0_f64; dim];

    for emb in embeddings {
        if emb.dim() != dim {
            return Err(TrendError::DimensionMismatch {
                expected: dim,
                found: emb.dim(),
            });
        }
        for (acc, &val) in mean.iter_mut().zip(emb.as_slice()) {
            *acc += val;
        }
    }

    for val in &mut mean {
        *val /= n;
    }

    Ok(Embedding::from(mean))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emb(values: &[f64]) -> Embedding {
        Embedding::from(values.to_vec())
    }

    #[test]
    fn test_cosine_identical() {
        let a = emb(&[1.0, 2.0, 3.0]);
        let sim = cosine_similarity(&a, &a).unwrap();
        assert!((sim - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_cosine_orthogonal() {
        let sim = cosine_similarity(&emb(&[1.0, 0.0, 0.0]), &emb(&[0.0, 1.0, 0.0])).unwrap();
        assert!(sim.abs() < 1e-10);
    }

    #[test]
    fn test_cosine_proportional() {
        // Same direction, different magnitudes
        let sim = cosine_similarity(&emb(&[1.0, 2.0, 3.0]), &emb(&[2.0, 4.0, 6.0])).unwrap();
        assert!((sim - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_cosine_opposite_is_negative() {
        let sim = cosine_similarity(&emb(&[1.0, 0.0]), &emb(&[-1.0, 0.0])).unwrap();
        assert!((sim + 1.0).abs() < 1e-10, "Opposite vectors should be -1.0, got {sim}");
    }

    #[test]
    fn test_cosine_zero_vector() {
        let sim = cosine_similarity(&emb(&[0.0, 0.0, 0.0]), &emb(&[1.0, 2.0, 3.0])).unwrap();
        assert_eq!(sim, 0.0);
    }

    #[test]
    fn test_cosine_both_zero() {
        let z = emb(&[0.0, 0.0]);
        assert_eq!(cosine_similarity(&z, &z).unwrap(), 0.0);
    }

    #[test]
    fn test_cosine_tiny_norm_identical() {
        let a = emb(&[1e-8, 1e-8]);
        let sim = cosine_similarity(&a, &a).unwrap();
        assert!((sim - 1.0).abs() < 1e-10, "Tiny identical vectors should be 1.0, got {sim}");

        let sub = emb(&[1e-300, -2e-300]);
        let sim = cosine_similarity(&sub, &sub).unwrap();
        assert!((sim - 1.0).abs() < 1e-10, "got {sim}");
    }

    #[test]
    fn test_cosine_huge_norm_stays_bounded() {
        let a = emb(&[1e200, 1e200]);
        let sim = cosine_similarity(&a, &a).unwrap();
        assert!((sim - 1.0).abs() < 1e-10, "Huge identical vectors should be 1.0, got {sim}");

        let b = emb(&[-1e200, -1e200]);
        let sim = cosine_similarity(&a, &b).unwrap();
        assert!((sim + 1.0).abs() < 1e-10, "got {sim}");

        let mixed = cosine_similarity(&a, &emb(&[1e-200, 0.0])).unwrap();
        assert!((-1.0..=1.0).contains(&mixed));
        assert!((mixed - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-10);
    }

    #[test]
    fn test_cosine_mismatched_dimensions() {
        let err = cosine_similarity(&emb(&[1.0, 2.0]), &emb(&[1.0, 2.0, 3.0])).unwrap_err();
        assert_eq!(
            err,
            TrendError::DimensionMismatch {
                expected: 2,
                found: 3
            }
        );
    }

    #[test]
    fn test_cosine_is_symmetric() {
        let a = emb(&[1.0, 3.0, -2.0, 0.5]);
        let b = emb(&[2.0, -1.0, 4.0, 0.0]);
        let ab = cosine_similarity(&a, &b).unwrap();
        let ba = cosine_similarity(&b, &a).unwrap();
        assert!((ab - ba).abs() < 1e-12, "Cosine should be symmetric");
        assert!((-1.0..=1.0).contains(&ab));
    }

    #[test]
    fn test_mean_embedding_multiple() {
        let a = emb(&[1.0, 0.0, 0.0]);
        let b = emb(&[0.0, 1.0, 0.0]);
        let mean = mean_embedding(&[&a, &b]).unwrap();
        assert_eq!(mean.as_slice(), &[0.5, 0.5, 0.0]);
    }

    #[test]
    fn test_mean_embedding_empty() {
        let mean = mean_embedding(&[]).unwrap();
        assert_eq!(mean.dim(), 0);
    }

    #[test]
    fn test_mean_embedding_mixed_dims() {
        let a = emb(&[1.0, 0.0]);
        let b = emb(&[1.0, 0.0, 0.0]);
        assert!(matches!(
            mean_embedding(&[&a, &b]),
            Err(TrendError::DimensionMismatch { .. })
        ));
    }
}
