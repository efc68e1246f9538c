//! Fuzzy simplicial set over the kNN graph.
use std::collections::BTreeMap;

const SMOOTH_K_TOLERANCE: f32 = 1e-5;
const MIN_K_DIST_SCALE: f32 = 1e-3;
const BINARY_SEARCH_STEPS: usize = 64;

/// A weighted directed edge of the symmetric membership graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub head: usize,
    pub tail: usize,
    pub weight: f32,
}

/// Per-point normalisation: `rho` is the distance to the nearest non-identical
/// neighbour, `sigma` is chosen so the neighbour memberships sum to `log2(k)`.
pub fn smooth_knn_dist(knn: &[Vec<(usize, f32)>], k: usize) -> (Vec<f32>, Vec<f32>) {
    let target = (k.max(1) as f32).log2();
    let all: Vec<f32> = knn.iter().flatten().map(|(_, d)| *d).collect();
    let mean_distances = if all.is_empty() { 0.0 } else { all.iter().sum::<f32>() / all.len() as f32 };

    let mut sigmas = Vec::with_capacity(knn.len());
    let mut rhos = Vec::with_capacity(knn.len());
    for row in knn {
        let rho = row.iter().map(|(_, d)| *d).find(|d| *d > 0.0).unwrap_or(0.0);
        let (mut lo, mut hi, mut mid) = (0f32, f32::INFINITY, 1f32);
        for _ in 0..BINARY_SEARCH_STEPS {
            let psum: f32 = row
                .iter()
                .map(|(_, d)| {
                    let d = d - rho;
                    if d > 0.0 { (-d / mid).exp() } else { 1.0 }
                })
                .sum();
            if (psum - target).abs() < SMOOTH_K_TOLERANCE {
                break;
            }
            if psum > target {
                hi = mid;
                mid = (lo + hi) / 2.0;
            } else {
                lo = mid;
                mid = if hi.is_infinite() { mid * 2.0 } else { (lo + hi) / 2.0 };
            }
        }
        let mean_ith = if row.is_empty() { 0.0 } else { row.iter().map(|(_, d)| *d).sum::<f32>() / row.len() as f32 };
        let floor = if rho > 0.0 { MIN_K_DIST_SCALE * mean_ith } else { MIN_K_DIST_SCALE * mean_distances };
        sigmas.push(mid.max(floor));
        rhos.push(rho);
    }
    (sigmas, rhos)
}

/// Symmetric fuzzy union `w_ij + w_ji - w_ij * w_ji` of the directed
/// memberships, listed in both directions ordered by `(head, tail)`.
pub fn fuzzy_simplicial_set(knn: &[Vec<(usize, f32)>], k: usize) -> Vec<Edge> {
    let (sigmas, rhos) = smooth_knn_dist(knn, k);
    let mut directed: BTreeMap<(usize, usize), f32> = BTreeMap::new();
    for (i, row) in knn.iter().enumerate() {
        for &(j, d) in row {
            let w = if d - rhos[i] <= 0.0 || sigmas[i] == 0.0 { 1.0 } else { (-(d - rhos[i]) / sigmas[i]).exp() };
            directed.insert((i, j), w);
        }
    }
    let mut symmetric: BTreeMap<(usize, usize), f32> = BTreeMap::new();
    for (&(i, j), &w_ij) in &directed {
        let w_ji = directed.get(&(j, i)).copied().unwrap_or(0.0);
        let w = w_ij + w_ji - w_ij * w_ji;
        symmetric.insert((i, j), w);
        symmetric.insert((j, i), w);
    }
    symmetric
        .into_iter()
        .filter(|(_, w)| *w > 0.0)
        .map(|((head, tail), weight)| Edge { head, tail, weight })
        .collect()
}
