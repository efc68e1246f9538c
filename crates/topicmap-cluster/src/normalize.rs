use std::collections::BTreeMap;

use topicmap_core::types::{ClusterId, NOISE};

/// Member count per non-noise cluster id.
pub fn cluster_sizes(assignments: &[ClusterId]) -> BTreeMap<ClusterId, usize> {
    let mut sizes = BTreeMap::new();
    for &id in assignments.iter().filter(|&&id| id != NOISE) {
        *sizes.entry(id).or_insert(0) += 1;
    }
    sizes
}

/// Renumber clusters so that id 0 is the largest, 1 the next largest and so
/// on. Equal sizes keep their original relative order. Noise stays `-1`.
pub fn normalize_clusters(assignments: &[ClusterId]) -> Vec<ClusterId> {
    let mut ranked: Vec<(ClusterId, usize)> = cluster_sizes(assignments).into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    let remap: BTreeMap<ClusterId, ClusterId> = ranked
        .iter()
        .zip(0..)
        .map(|(&(old, _), new)| (old, new))
        .collect();
    assignments
        .iter()
        .map(|id| remap.get(id).copied().unwrap_or(NOISE))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn largest_cluster_becomes_zero() {
        let out = normalize_clusters(&[2, 2, 0, 1, 1, 1, -1]);
        assert_eq!(out, vec![1, 1, 2, 0, 0, 0, -1]);
    }

    #[test]
    fn ties_keep_original_order() {
        assert_eq!(normalize_clusters(&[5, 3, 5, 3]), vec![1, 0, 1, 0]);
    }

    #[test]
    fn ids_become_contiguous() {
        let out = normalize_clusters(&[10, 40, 40, -1, 7]);
        assert_eq!(out, vec![2, 0, 0, -1, 1]);
    }

    #[test]
    fn all_noise_is_untouched() {
        assert_eq!(normalize_clusters(&[-1, -1]), vec![-1, -1]);
        assert!(normalize_clusters(&[]).is_empty());
    }
}
