#![deny(warnings, dead_code, unused_variables, unused_imports)]

//! Clustering of projected coordinates into topics.

pub mod dbscan;
pub mod kmeans;
pub mod normalize;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use topicmap_core::config::{ClusterMethod, ClusteringConfig};
use topicmap_core::types::{ClusterId, Coordinate, NOISE};
use topicmap_core::{Error, Result};

pub use dbscan::{auto_eps, dbscan};
pub use kmeans::{auto_k, kmeans, kmeans_plus_plus, pick_elbow, KMeansFit};
pub use normalize::{cluster_sizes, normalize_clusters};

/// Assignments plus the parameters that produced them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Clustering {
    pub assignments: Vec<ClusterId>,
    pub method: ClusterMethod,
    pub n_clusters: usize,
    pub noise: usize,
    /// Cluster count used by k-means.
    pub k: Option<usize>,
    /// Neighbourhood radius used by DBSCAN.
    pub eps: Option<f32>,
}

impl Clustering {
    fn from_assignments(assignments: Vec<ClusterId>, method: ClusterMethod, k: Option<usize>, eps: Option<f32>) -> Self {
        let n_clusters = cluster_sizes(&assignments).len();
        let noise = assignments.iter().filter(|&&id| id == NOISE).count();
        Self { assignments, method, n_clusters, noise, k, eps }
    }
}

/// A clustering strategy over 2D coordinates. Implementations are total
/// over non-empty input.
pub trait Clusterer: Send + Sync {
    fn method(&self) -> ClusterMethod;

    /// Raw, not yet normalised, assignments.
    fn cluster(&self, points: &[Coordinate]) -> Clustering;
}

/// k-means; never produces noise.
pub struct KMeansClusterer {
    k: Option<usize>,
    seed: u64,
}

impl KMeansClusterer {
    pub fn new(k: Option<usize>, seed: u64) -> Self {
        Self { k, seed }
    }
}

impl Clusterer for KMeansClusterer {
    fn method(&self) -> ClusterMethod {
        ClusterMethod::KMeans
    }

    fn cluster(&self, points: &[Coordinate]) -> Clustering {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let k = match self.k {
            Some(k) => k.clamp(1, points.len().max(1)),
            None => auto_k(points, &mut rng),
        };
        let fit = kmeans(points, k, kmeans::FINAL_ITERATIONS, &mut rng);
        tracing::debug!(k, iterations = fit.iterations, inertia = fit.inertia, "k-means finished");
        let assignments = fit
            .assignments
            .iter()
            .map(|&c| ClusterId::try_from(c).unwrap_or(NOISE))
            .collect();
        Clustering::from_assignments(assignments, ClusterMethod::KMeans, Some(k), None)
    }
}

/// DBSCAN; unreachable points are labelled `-1`.
pub struct DbscanClusterer {
    eps: Option<f32>,
    min_pts: usize,
}

impl DbscanClusterer {
    pub fn new(eps: Option<f32>, min_pts: usize) -> Self {
        Self { eps, min_pts: min_pts.max(1) }
    }
}

impl Clusterer for DbscanClusterer {
    fn method(&self) -> ClusterMethod {
        ClusterMethod::Dbscan
    }

    fn cluster(&self, points: &[Coordinate]) -> Clustering {
        let eps = self.eps.unwrap_or_else(|| auto_eps(points, self.min_pts));
        tracing::debug!(eps, min_pts = self.min_pts, auto = self.eps.is_none(), "dbscan parameters");
        let assignments = dbscan(points, eps, self.min_pts);
        Clustering::from_assignments(assignments, ClusterMethod::Dbscan, None, Some(eps))
    }
}

/// Strategy selected by `config.method`.
pub fn clusterer_for(config: &ClusteringConfig) -> Box<dyn Clusterer> {
    match config.method {
        ClusterMethod::KMeans => Box::new(KMeansClusterer::new(config.k, config.seed)),
        ClusterMethod::Dbscan => Box::new(DbscanClusterer::new(config.eps, config.min_pts)),
    }
}

/// Cluster `points` with the configured strategy and renumber the result so
/// the largest cluster is id 0.
///
/// # Errors
///
/// `InvalidInput` when `points` is empty.
pub fn cluster(points: &[Coordinate], config: &ClusteringConfig) -> Result<Clustering> {
    if points.is_empty() {
        return Err(Error::InvalidInput("cannot cluster an empty point set".into()));
    }
    let clusterer = clusterer_for(config);
    let raw = clusterer.cluster(points);
    let assignments = normalize_clusters(&raw.assignments);
    let clustering = Clustering { assignments, ..raw };
    tracing::info!(
        method = ?clusterer.method(),
        points = points.len(),
        clusters = clustering.n_clusters,
        noise = clustering.noise,
        "clustered points"
    );
    Ok(clustering)
}
