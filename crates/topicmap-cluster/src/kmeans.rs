//! Centroid clustering with k-means++ seeding and automatic `k`.
use rand::rngs::StdRng;
use rand::Rng;
use topicmap_core::types::Coordinate;

pub const FINAL_ITERATIONS: usize = 100;
pub const SWEEP_ITERATIONS: usize = 50;
const MAX_ELBOW_K: usize = 30;
const ELBOW_INFLATION: f64 = 1.2;

/// Result of one Lloyd run.
#[derive(Debug, Clone)]
pub struct KMeansFit {
    pub assignments: Vec<usize>,
    pub centroids: Vec<Coordinate>,
    pub inertia: f64,
    pub iterations: usize,
}

fn sq_dist(a: &Coordinate, b: &Coordinate) -> f64 {
    let dx = f64::from(a.x) - f64::from(b.x);
    let dy = f64::from(a.y) - f64::from(b.y);
    dx * dx + dy * dy
}

fn nearest(point: &Coordinate, centroids: &[Coordinate]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (c, centroid) in centroids.iter().enumerate() {
        let d = sq_dist(point, centroid);
        if d < best.1 {
            best = (c, d);
        }
    }
    best
}

/// k-means++ seeding: first centre uniformly, each further centre with
/// probability proportional to its squared distance from the nearest chosen
/// centre. Falls back to a uniform pick once every point coincides with a
/// centre.
pub fn kmeans_plus_plus(points: &[Coordinate], k: usize, rng: &mut StdRng) -> Vec<Coordinate> {
    let mut centroids = Vec::with_capacity(k);
    if points.is_empty() || k == 0 {
        return centroids;
    }
    centroids.push(points[rng.gen_range(0..points.len())]);
    let mut weights: Vec<f64> = points.iter().map(|p| sq_dist(p, &centroids[0])).collect();
    while centroids.len() < k {
        let total: f64 = weights.iter().sum();
        let pick = if total > 0.0 {
            let target = rng.gen::<f64>() * total;
            let mut acc = 0.0;
            let mut chosen = points.len() - 1;
            for (i, w) in weights.iter().enumerate() {
                acc += w;
                if acc > target && *w > 0.0 {
                    chosen = i;
                    break;
                }
            }
            chosen
        } else {
            rng.gen_range(0..points.len())
        };
        let centre = points[pick];
        for (w, p) in weights.iter_mut().zip(points) {
            *w = w.min(sq_dist(p, &centre));
        }
        centroids.push(centre);
    }
    centroids
}

/// Lloyd iterations from k-means++ seeds until assignments stop changing or
/// `max_iter` is reached. Ties go to the lower centroid index; a centroid
/// that loses all members stays where it was.
pub fn kmeans(points: &[Coordinate], k: usize, max_iter: usize, rng: &mut StdRng) -> KMeansFit {
    let mut centroids = kmeans_plus_plus(points, k, rng);
    if centroids.is_empty() {
        return KMeansFit { assignments: vec![0; points.len()], centroids, inertia: 0.0, iterations: 0 };
    }
    let mut assignments = vec![usize::MAX; points.len()];
    let mut iterations = 0;

    for _ in 0..max_iter {
        iterations += 1;
        let mut changed = false;
        for (slot, p) in assignments.iter_mut().zip(points) {
            let (c, _) = nearest(p, &centroids);
            if *slot != c {
                *slot = c;
                changed = true;
            }
        }
        if !changed {
            break;
        }
        let mut sums = vec![(0f64, 0f64, 0usize); centroids.len()];
        for (&c, p) in assignments.iter().zip(points) {
            sums[c].0 += f64::from(p.x);
            sums[c].1 += f64::from(p.y);
            sums[c].2 += 1;
        }
        for (centroid, (sx, sy, count)) in centroids.iter_mut().zip(sums) {
            if count > 0 {
                *centroid = Coordinate::new((sx / count as f64) as f32, (sy / count as f64) as f32);
            }
        }
    }

    let inertia = points.iter().map(|p| nearest(p, &centroids).1).sum();
    KMeansFit { assignments, centroids, inertia, iterations }
}

/// Automatic cluster count for `n` points.
///
/// Small corpora use fixed ratios; from 200 points on, the elbow of the
/// inertia curve over `k = 2..=min(30, sqrt n)` is inflated by 20%.
pub fn auto_k(points: &[Coordinate], rng: &mut StdRng) -> usize {
    let n = points.len();
    let nf = n as f64;
    let k = if n < 10 {
        (n / 2).min(3)
    } else if n < 50 {
        (n / 4).min(8)
    } else if n < 200 {
        ((1.5 * nf.sqrt()).floor() as usize).min(15)
    } else {
        elbow_k(points, rng)
    };
    k.clamp(1, n.max(1))
}

fn elbow_k(points: &[Coordinate], rng: &mut StdRng) -> usize {
    let upper = ((points.len() as f64).sqrt().floor() as usize).min(MAX_ELBOW_K);
    let candidates: Vec<usize> = (2..=upper).collect();
    let inertias: Vec<f64> = candidates
        .iter()
        .map(|&k| kmeans(points, k, SWEEP_ITERATIONS, rng).inertia)
        .collect();
    pick_elbow(&candidates, &inertias, upper)
}

/// Chooses `k` from an inertia curve: the interior candidate with the largest
/// second difference (lowest `k` on ties), inflated by 20% and capped at
/// `upper`.
pub fn pick_elbow(candidates: &[usize], inertias: &[f64], upper: usize) -> usize {
    let mut elbow = candidates.first().copied().unwrap_or(2);
    let mut best = f64::NEG_INFINITY;
    for i in 1..inertias.len().saturating_sub(1) {
        let second = inertias[i - 1] - 2.0 * inertias[i] + inertias[i + 1];
        if second > best {
            best = second;
            elbow = candidates[i];
        }
    }
    let inflated = ((elbow as f64) * ELBOW_INFLATION).round() as usize;
    tracing::debug!(elbow, inflated, upper, "elbow heuristic");
    inflated.min(upper)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn blobs() -> Vec<Coordinate> {
        let mut points = Vec::new();
        for (cx, cy) in [(0.0, 0.0), (20.0, 0.0), (0.0, 20.0)] {
            for i in 0..5 {
                let t = i as f32 * 0.1;
                points.push(Coordinate::new(cx + t, cy - t));
            }
        }
        points
    }

    #[test]
    fn seeding_picks_distinct_points() {
        let points = blobs();
        let seeds = kmeans_plus_plus(&points, 3, &mut StdRng::seed_from_u64(3));
        assert_eq!(seeds.len(), 3);
        for (i, a) in seeds.iter().enumerate() {
            for b in &seeds[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn seeding_falls_back_when_points_coincide() {
        let points = vec![Coordinate::new(1.0, 1.0); 4];
        let seeds = kmeans_plus_plus(&points, 3, &mut StdRng::seed_from_u64(3));
        assert_eq!(seeds.len(), 3);
    }

    #[test]
    fn recovers_separated_blobs() {
        let points = blobs();
        let fit = kmeans(&points, 3, FINAL_ITERATIONS, &mut StdRng::seed_from_u64(42));
        for group in fit.assignments.chunks(5) {
            assert!(group.iter().all(|&c| c == group[0]));
        }
        let mut firsts: Vec<usize> = fit.assignments.chunks(5).map(|g| g[0]).collect();
        firsts.sort_unstable();
        firsts.dedup();
        assert_eq!(firsts.len(), 3);
        assert!(fit.inertia < 5.0);
    }

    #[test]
    fn auto_k_follows_size_bands() {
        let mut rng = StdRng::seed_from_u64(1);
        let pts = |n: usize| (0..n).map(|i| Coordinate::new(i as f32, 0.0)).collect::<Vec<_>>();
        assert_eq!(auto_k(&pts(1), &mut rng), 1);
        assert_eq!(auto_k(&pts(4), &mut rng), 2);
        assert_eq!(auto_k(&pts(9), &mut rng), 3);
        assert_eq!(auto_k(&pts(20), &mut rng), 5);
        assert_eq!(auto_k(&pts(49), &mut rng), 8);
        assert_eq!(auto_k(&pts(100), &mut rng), 15);
        assert_eq!(auto_k(&pts(64), &mut rng), 12);
    }

    #[test]
    fn elbow_stays_within_bounds() {
        let mut rng = StdRng::seed_from_u64(9);
        let points: Vec<Coordinate> = (0..400)
            .map(|i| Coordinate::new((i % 4) as f32 * 50.0 + (i % 7) as f32 * 0.1, (i / 100) as f32 * 0.1))
            .collect();
        let k = auto_k(&points, &mut rng);
        assert!((2..=20).contains(&k), "k = {k}");
    }

    #[test]
    fn elbow_sits_at_the_sharpest_bend() {
        let candidates: Vec<usize> = (2..=10).collect();
        let inertias = [100.0, 60.0, 20.0, 15.0, 12.0, 10.0, 9.0, 8.0, 7.0];
        // Second differences peak at k = 4; 4 * 1.2 rounds to 5.
        assert_eq!(pick_elbow(&candidates, &inertias, 10), 5);
    }

    #[test]
    fn elbow_inflation_is_capped() {
        let candidates: Vec<usize> = (2..=9).collect();
        let inertias = [100.0, 95.0, 90.0, 85.0, 80.0, 75.0, 20.0, 19.0];
        // Bend at k = 8 inflates to 10, above the upper bound.
        assert_eq!(pick_elbow(&candidates, &inertias, 9), 9);
    }

    #[test]
    fn flat_curve_takes_the_lowest_interior_k() {
        let candidates: Vec<usize> = (2..=6).collect();
        let inertias = [80.0, 70.0, 60.0, 50.0, 40.0];
        assert_eq!(pick_elbow(&candidates, &inertias, 6), 4);
    }
}
