#![deny(warnings, dead_code, unused_variables, unused_imports)]

//! Runs embedding, projection, clustering and labelling as one pipeline.

mod map;

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use topicmap_cluster::{cluster, cluster_sizes};
use topicmap_core::config::TopicMapConfig;
use topicmap_core::types::Document;
use topicmap_core::Result;
use topicmap_embed::EmbeddingProvider;
use topicmap_project::project;
use topicmap_topics::{extract_keywords, label_topics, topic_info, DEFAULT_REPRESENTATIVES};

pub use map::TopicMap;

/// Pipeline stage reported alongside progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Embedding,
    Projection,
    Clustering,
    Labeling,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Embedding, Stage::Projection, Stage::Clustering, Stage::Labeling];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Embedding => "embedding",
            Stage::Projection => "projection",
            Stage::Clustering => "clustering",
            Stage::Labeling => "labeling",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Pipeline context. Owns the embedding provider, so the model and any
/// known-broken tiers carry over between runs of the same mapper.
pub struct TopicMapper {
    config: TopicMapConfig,
    provider: Arc<EmbeddingProvider>,
}

impl TopicMapper {
    pub fn new(config: TopicMapConfig) -> Self {
        let provider = Arc::new(EmbeddingProvider::new(&config.embedding));
        Self { config, provider }
    }

    /// Share an existing provider, e.g. between mappers with different
    /// clustering settings.
    pub fn with_provider(config: TopicMapConfig, provider: Arc<EmbeddingProvider>) -> Self { Self { config, provider } }

    pub fn config(&self) -> &TopicMapConfig { &self.config }

    pub fn provider(&self) -> &Arc<EmbeddingProvider> { &self.provider }

    /// Run every stage in order over `documents`.
    ///
    /// `progress` sees fine-grained fractions during embedding and a 0.0 /
    /// 1.0 pair around every other stage. Nothing is returned until the last
    /// stage completes.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for an empty document list and `ProjectionPrecondition`
    /// for a single document.
    pub async fn run(&self, documents: &[Document], progress: &(dyn Fn(Stage, f32) + Send + Sync)) -> Result<TopicMap> {
        let started = Instant::now();
        tracing::info!(docs = documents.len(), method = ?self.config.clustering.method, "topic map run started");

        let on_embed = |fraction: f32| progress(Stage::Embedding, fraction);
        let embeddings = self.provider.embed(documents, &on_embed).await?;
        tokio::task::yield_now().await;

        progress(Stage::Projection, 0.0);
        let coordinates = project(&embeddings.vectors, &self.config.projection)?;
        progress(Stage::Projection, 1.0);
        tokio::task::yield_now().await;

        progress(Stage::Clustering, 0.0);
        let clustering = cluster(&coordinates, &self.config.clustering)?;
        progress(Stage::Clustering, 1.0);
        let sizes: Vec<usize> = cluster_sizes(&clustering.assignments).into_values().collect();
        tracing::info!(?sizes, noise = clustering.noise, k = ?clustering.k, eps = ?clustering.eps, "topic sizes");
        tokio::task::yield_now().await;

        progress(Stage::Labeling, 0.0);
        let keywords = extract_keywords(documents, &clustering.assignments, self.config.topics.top_n);
        let labels = label_topics(&keywords);
        let topics = topic_info(
            documents,
            &coordinates,
            &clustering.assignments,
            &keywords,
            &labels,
            DEFAULT_REPRESENTATIVES,
        );
        progress(Stage::Labeling, 1.0);

        tracing::info!(
            topics = keywords.len(),
            tier = %embeddings.tier,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "topic map run finished"
        );
        Ok(TopicMap {
            embeddings: embeddings.vectors,
            embedding_tier: embeddings.tier,
            coordinates,
            assignments: clustering.assignments,
            keywords,
            labels,
            topics,
            method: clustering.method,
        })
    }
}
