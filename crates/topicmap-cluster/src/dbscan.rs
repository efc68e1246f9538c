//! Density clustering over 2D coordinates.
use std::collections::VecDeque;

use topicmap_core::types::{ClusterId, Coordinate, NOISE};

const EPS_PERCENTILE: usize = 70;
const EPS_TIGHTENING: f32 = 0.85;
/// Below this many points the percentile rule is skipped.
const SMALL_CORPUS: usize = 10;

/// Automatic neighbourhood radius from the sorted `(min_pts - 1)`-th nearest
/// neighbour distances: the 70th percentile scaled by 0.85, or the largest
/// value for corpora under ten points.
pub fn auto_eps(points: &[Coordinate], min_pts: usize) -> f32 {
    let rank = min_pts.saturating_sub(1).max(1);
    let mut k_distances: Vec<f32> = points
        .iter()
        .enumerate()
        .filter_map(|(i, p)| {
            let mut dists: Vec<f32> = points
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, q)| p.distance(q))
                .collect();
            if dists.is_empty() {
                return None;
            }
            dists.sort_by(f32::total_cmp);
            Some(dists[rank.min(dists.len()) - 1])
        })
        .collect();
    if k_distances.is_empty() {
        return 0.0;
    }
    k_distances.sort_by(f32::total_cmp);
    let len = k_distances.len();
    if points.len() < SMALL_CORPUS {
        return k_distances[len - 1];
    }
    let idx = (len * EPS_PERCENTILE / 100).min(len - 1);
    k_distances[idx] * EPS_TIGHTENING
}

fn region(points: &[Coordinate], i: usize, eps: f32) -> Vec<usize> {
    (0..points.len())
        .filter(|&j| points[i].distance(&points[j]) <= eps)
        .collect()
}

/// DBSCAN with breadth-first expansion in index order.
///
/// A point whose `eps`-neighbourhood (itself included) holds at least
/// `min_pts` points is a core point. Points reachable from no core point are
/// labelled `-1`. Cluster ids are assigned in discovery order.
pub fn dbscan(points: &[Coordinate], eps: f32, min_pts: usize) -> Vec<ClusterId> {
    let mut labels: Vec<Option<ClusterId>> = vec![None; points.len()];
    let mut next: ClusterId = 0;

    for i in 0..points.len() {
        if labels[i].is_some() {
            continue;
        }
        let neighbours = region(points, i, eps);
        if neighbours.len() < min_pts {
            labels[i] = Some(NOISE);
            continue;
        }
        let cluster = next;
        next += 1;
        labels[i] = Some(cluster);
        let mut queue: VecDeque<usize> = neighbours.into_iter().collect();
        while let Some(j) = queue.pop_front() {
            match labels[j] {
                Some(NOISE) => labels[j] = Some(cluster),
                Some(_) => {}
                None => {
                    labels[j] = Some(cluster);
                    let reach = region(points, j, eps);
                    if reach.len() >= min_pts {
                        queue.extend(reach);
                    }
                }
            }
        }
    }
    labels.into_iter().map(|l| l.unwrap_or(NOISE)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(xs: &[f32]) -> Vec<Coordinate> {
        xs.iter().map(|&x| Coordinate::new(x, 0.0)).collect()
    }

    #[test]
    fn two_groups_and_an_outlier() {
        let points = line(&[0.0, 0.5, 1.0, 10.0, 10.5, 11.0, 50.0]);
        assert_eq!(dbscan(&points, 0.6, 2), vec![0, 0, 0, 1, 1, 1, -1]);
    }

    #[test]
    fn border_points_join_the_first_cluster_reaching_them() {
        // 1.0 is reached from the core at 0.2 but has too few neighbours itself.
        let points = line(&[0.0, 0.1, 0.2, 1.0]);
        assert_eq!(dbscan(&points, 0.85, 3), vec![0, 0, 0, 0]);
        assert_eq!(dbscan(&points, 0.5, 3), vec![0, 0, 0, -1]);
    }

    #[test]
    fn small_corpus_uses_largest_k_distance() {
        let points = line(&[0.0, 1.0, 5.0, 7.0]);
        assert_eq!(auto_eps(&points, 2), 2.0);
        assert_eq!(dbscan(&points, auto_eps(&points, 2), 2), vec![0, 0, 1, 1]);
    }

    #[test]
    fn larger_corpus_uses_tightened_percentile() {
        let xs: Vec<f32> = (0..10).map(|i| (i * i) as f32).collect();
        let points = line(&xs);
        // nearest-neighbour distances sorted: 1,1,3,5,7,9,11,13,15,17; index 7 -> 13
        let eps = auto_eps(&points, 2);
        assert!((eps - 13.0 * 0.85).abs() < 1e-4);
    }

    #[test]
    fn single_point_is_noise_with_default_min_pts() {
        let points = line(&[3.0]);
        assert_eq!(auto_eps(&points, 2), 0.0);
        assert_eq!(dbscan(&points, 0.0, 2), vec![-1]);
        assert_eq!(dbscan(&points, 0.0, 1), vec![0]);
    }
}
