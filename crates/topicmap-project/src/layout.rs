//! Stochastic gradient layout of the membership graph in two dimensions.
use rand::rngs::StdRng;
use rand::Rng;

use crate::fuzzy::Edge;

const INIT_RANGE: f32 = 10.0;
const NEGATIVE_SAMPLE_RATE: f32 = 5.0;
const REPULSION_STRENGTH: f32 = 1.0;
const GRADIENT_CLIP: f32 = 4.0;

/// Curve and schedule parameters for [`optimize`].
#[derive(Debug, Clone, Copy)]
pub struct LayoutParams {
    pub a: f32,
    pub b: f32,
    pub n_epochs: usize,
}

/// Uniform random start positions in `[-10, 10]^2`.
pub fn random_init(n: usize, rng: &mut StdRng) -> Vec<[f32; 2]> {
    (0..n)
        .map(|_| [rng.gen_range(-INIT_RANGE..=INIT_RANGE), rng.gen_range(-INIT_RANGE..=INIT_RANGE)])
        .collect()
}

fn clip(v: f32) -> f32 {
    v.clamp(-GRADIENT_CLIP, GRADIENT_CLIP)
}

fn dist_sq(p: [f32; 2], q: [f32; 2]) -> f32 {
    (p[0] - q[0]).powi(2) + (p[1] - q[1]).powi(2)
}

/// Run the attractive/repulsive epochs over `embedding` in place.
///
/// Edges lighter than `max_weight / n_epochs` are never sampled. Every other
/// edge is sampled once per `max_weight / weight` epochs and followed by
/// `NEGATIVE_SAMPLE_RATE` random repulsive samples per positive sample.
pub fn optimize(embedding: &mut [[f32; 2]], edges: &[Edge], params: LayoutParams, rng: &mut StdRng) {
    let n = embedding.len();
    if n == 0 || edges.is_empty() || params.n_epochs == 0 {
        return;
    }
    let max_weight = edges.iter().map(|e| e.weight).fold(0f32, f32::max);
    let cutoff = max_weight / params.n_epochs as f32;
    let active: Vec<&Edge> = edges.iter().filter(|e| e.weight >= cutoff && e.weight > 0.0).collect();

    let epochs_per_sample: Vec<f32> = active.iter().map(|e| max_weight / e.weight).collect();
    let epochs_per_negative: Vec<f32> = epochs_per_sample.iter().map(|e| e / NEGATIVE_SAMPLE_RATE).collect();
    let mut next_sample = epochs_per_sample.clone();
    let mut next_negative = epochs_per_negative.clone();
    let (a, b) = (params.a, params.b);

    for epoch in 0..params.n_epochs {
        let epoch_f = epoch as f32;
        let alpha = 1.0 - epoch_f / params.n_epochs as f32;

        for (i, edge) in active.iter().enumerate() {
            if next_sample[i] > epoch_f {
                continue;
            }
            let (j, k) = (edge.head, edge.tail);
            let d2 = dist_sq(embedding[j], embedding[k]);
            let coeff = if d2 > 0.0 {
                -2.0 * a * b * d2.powf(b - 1.0) / (a * d2.powf(b) + 1.0)
            } else {
                0.0
            };
            for d in 0..2 {
                let grad = clip(coeff * (embedding[j][d] - embedding[k][d]));
                embedding[j][d] += grad * alpha;
                embedding[k][d] -= grad * alpha;
            }
            next_sample[i] += epochs_per_sample[i];

            let n_neg = ((epoch_f - next_negative[i]) / epochs_per_negative[i]).max(0.0) as usize;
            for _ in 0..n_neg {
                let other = rng.gen_range(0..n);
                if other == j {
                    continue;
                }
                let d2 = dist_sq(embedding[j], embedding[other]);
                let coeff = if d2 > 0.0 {
                    2.0 * REPULSION_STRENGTH * b / ((0.001 + d2) * (a * d2.powf(b) + 1.0))
                } else {
                    0.0
                };
                for d in 0..2 {
                    let grad = if coeff > 0.0 {
                        clip(coeff * (embedding[j][d] - embedding[other][d]))
                    } else {
                        GRADIENT_CLIP
                    };
                    embedding[j][d] += grad * alpha;
                }
            }
            next_negative[i] += n_neg as f32 * epochs_per_negative[i];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn init_is_bounded_and_seeded() {
        let first = random_init(50, &mut StdRng::seed_from_u64(7));
        let second = random_init(50, &mut StdRng::seed_from_u64(7));
        assert_eq!(first, second);
        assert!(first.iter().flatten().all(|v| v.abs() <= INIT_RANGE));
    }

    #[test]
    fn attraction_pulls_connected_points_together() {
        let mut embedding = vec![[-5.0, 0.0], [5.0, 0.0]];
        let edges = vec![
            Edge { head: 0, tail: 1, weight: 1.0 },
            Edge { head: 1, tail: 0, weight: 1.0 },
        ];
        let before = dist_sq(embedding[0], embedding[1]);
        let params = LayoutParams { a: 1.577, b: 0.895, n_epochs: 50 };
        optimize(&mut embedding, &edges, params, &mut StdRng::seed_from_u64(1));
        assert!(dist_sq(embedding[0], embedding[1]) < before);
        assert!(embedding.iter().flatten().all(|v| v.is_finite()));
    }
}
