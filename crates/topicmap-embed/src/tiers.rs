//! The strategies the cascade walks through, best first.
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use topicmap_core::config::{EmbeddingConfig, LexicalWeighting};
use topicmap_core::types::EmbeddingTier;

use crate::error::TierError;
use crate::lexical::LexicalEmbedder;
use crate::model::SentenceModel;
use crate::progress::ProgressSink;

/// One embedding strategy. Implementations own their batching and report
/// progress through the sink.
#[async_trait]
pub trait EmbedTier: Send + Sync {
    fn kind(&self) -> EmbeddingTier;

    async fn try_embed(&self, documents: &[String], progress: &ProgressSink<'_>) -> Result<Vec<Vec<f32>>, TierError>;
}

/// Sentence model executed on the caller's own task.
pub struct InProcessTier {
    config: EmbeddingConfig,
    model: OnceCell<Arc<SentenceModel>>,
}

impl InProcessTier {
    pub fn new(config: EmbeddingConfig) -> Self { Self { config, model: OnceCell::new() } }

    async fn model(&self) -> Result<&Arc<SentenceModel>, TierError> {
        self.model
            .get_or_try_init(|| async { SentenceModel::load(&self.config, |_| {}).map(Arc::new) })
            .await
    }
}

#[async_trait]
impl EmbedTier for InProcessTier {
    fn kind(&self) -> EmbeddingTier { EmbeddingTier::InProcess }

    async fn try_embed(&self, documents: &[String], progress: &ProgressSink<'_>) -> Result<Vec<Vec<f32>>, TierError> {
        let model = self.model().await?;
        let batches: Vec<&[String]> = documents.chunks(self.config.batch_size.max(1)).collect();
        let mut vectors = Vec::with_capacity(documents.len());
        for (i, batch) in batches.iter().enumerate() {
            let texts: Vec<&str> = batch.iter().map(String::as_str).collect();
            vectors.extend(model.embed_batch(&texts)?);
            progress.report_batches(i + 1, batches.len());
            tokio::task::yield_now().await;
        }
        Ok(vectors)
    }
}

/// BM25 / TF-IDF vectors over the corpus vocabulary. Cannot fail.
pub struct LexicalTier {
    weighting: LexicalWeighting,
}

impl LexicalTier {
    pub fn new(weighting: LexicalWeighting) -> Self { Self { weighting } }
}

#[async_trait]
impl EmbedTier for LexicalTier {
    fn kind(&self) -> EmbeddingTier { EmbeddingTier::Lexical }

    async fn try_embed(&self, documents: &[String], progress: &ProgressSink<'_>) -> Result<Vec<Vec<f32>>, TierError> {
        let vectors = LexicalEmbedder::fit_embed(documents, self.weighting);
        progress.report(1.0);
        Ok(vectors)
    }
}
