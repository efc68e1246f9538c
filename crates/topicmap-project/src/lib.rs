#![deny(warnings, dead_code, unused_variables, unused_imports)]

//! UMAP-style projection of embedding vectors onto the plane.

pub mod curve;
pub mod fuzzy;
pub mod knn;
pub mod layout;

use rand::rngs::StdRng;
use rand::SeedableRng;
use topicmap_core::config::ProjectionConfig;
use topicmap_core::types::{Coordinate, EmbeddingVector};
use topicmap_core::{Error, Result};

pub use curve::find_ab_params;
pub use fuzzy::{fuzzy_simplicial_set, smooth_knn_dist, Edge};
pub use knn::{distance, exact_knn};
pub use layout::{optimize, random_init, LayoutParams};

const DEFAULT_NEIGHBORS: usize = 15;
const LARGE_CORPUS: usize = 10_000;

/// Neighbourhood size used for `n` points: the configured value (or 15),
/// capped at `n - 1`.
pub fn effective_neighbors(config: &ProjectionConfig, n: usize) -> usize {
    config.n_neighbors.unwrap_or(DEFAULT_NEIGHBORS).min(n.saturating_sub(1)).max(1)
}

/// Epoch count used for `n` points.
pub fn effective_epochs(config: &ProjectionConfig, n: usize) -> usize {
    config.n_epochs.unwrap_or(if n <= LARGE_CORPUS { 500 } else { 200 })
}

/// Project `embeddings` to 2D coordinates, index-aligned with the input.
///
/// Identical input and configuration always yield identical output; all
/// randomness comes from a `StdRng` seeded with `config.seed`.
///
/// # Errors
///
/// `ProjectionPrecondition` for fewer than two points and `InvalidInput` when
/// the vectors disagree in length.
pub fn project(embeddings: &[EmbeddingVector], config: &ProjectionConfig) -> Result<Vec<Coordinate>> {
    let n = embeddings.len();
    if n < 2 {
        return Err(Error::ProjectionPrecondition { points: n });
    }
    let dim = embeddings[0].len();
    if let Some(bad) = embeddings.iter().position(|v| v.len() != dim) {
        return Err(Error::InvalidInput(format!(
            "embedding {bad} has {} dimensions, expected {dim}",
            embeddings[bad].len()
        )));
    }

    let k = effective_neighbors(config, n);
    let n_epochs = effective_epochs(config, n);
    let (a, b) = find_ab_params(config.spread, config.min_dist);
    tracing::info!(points = n, dim, n_neighbors = k, n_epochs, "projecting embeddings");

    let knn = exact_knn(embeddings, k, config.metric);
    let edges = fuzzy_simplicial_set(&knn, k);
    tracing::debug!(edges = edges.len(), a, b, "built membership graph");

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut layout = random_init(n, &mut rng);
    optimize(&mut layout, &edges, LayoutParams { a, b, n_epochs }, &mut rng);

    Ok(layout.into_iter().map(|[x, y]| Coordinate::new(x, y)).collect())
}
