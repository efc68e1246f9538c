use topicmap_core::config::Metric;

/// Distance between two embedding vectors under `metric`.
///
/// Cosine distance of a zero vector is 1 against anything non-zero and 0
/// against another zero vector.
pub fn distance(a: &[f32], b: &[f32], metric: Metric) -> f32 {
    match metric {
        Metric::Euclidean => a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum::<f32>().sqrt(),
        Metric::Cosine => {
            let (mut dot, mut na, mut nb) = (0f32, 0f32, 0f32);
            for (x, y) in a.iter().zip(b) {
                dot += x * y;
                na += x * x;
                nb += y * y;
            }
            if na == 0.0 && nb == 0.0 {
                return 0.0;
            }
            if na == 0.0 || nb == 0.0 {
                return 1.0;
            }
            (1.0 - dot / (na.sqrt() * nb.sqrt())).max(0.0)
        }
    }
}

/// Exact `k` nearest neighbours of every point, self excluded, ordered by
/// distance then index.
pub fn exact_knn(data: &[Vec<f32>], k: usize, metric: Metric) -> Vec<Vec<(usize, f32)>> {
    (0..data.len())
        .map(|i| {
            let mut row: Vec<(usize, f32)> = (0..data.len())
                .filter(|&j| j != i)
                .map(|j| (j, distance(&data[i], &data[j], metric)))
                .collect();
            row.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
            row.truncate(k);
            row
        })
        .collect()
}
