use std::collections::BTreeSet;
use std::sync::Mutex;
use std::time::Instant;

use topicmap_core::config::EmbeddingConfig;
use topicmap_core::error::{Error, Result};
use topicmap_core::types::{EmbeddingTier, EmbeddingVector};

use crate::error::TierError;
use crate::progress::ProgressSink;
use crate::tiers::{EmbedTier, InProcessTier, LexicalTier};
use crate::worker::OffloadedTier;

/// Vectors for one corpus plus the tier that produced them.
#[derive(Debug, Clone)]
pub struct Embeddings {
    pub vectors: Vec<EmbeddingVector>,
    pub dim: usize,
    pub tier: EmbeddingTier,
}

/// Ordered fallback cascade. A tier that fails once is remembered as broken
/// for the lifetime of the provider and skipped on later calls.
pub struct EmbeddingProvider {
    tiers: Vec<Box<dyn EmbedTier>>,
    broken: Mutex<BTreeSet<EmbeddingTier>>,
}

impl EmbeddingProvider {
    pub fn new(config: &EmbeddingConfig) -> Self {
        let mut tiers: Vec<Box<dyn EmbedTier>> = Vec::new();
        if config.semantic {
            if config.offload { tiers.push(Box::new(OffloadedTier::new(config.clone()))); }
            tiers.push(Box::new(InProcessTier::new(config.clone())));
        }
        Self::with_tiers(tiers, LexicalTier::new(config.lexical))
    }

    /// Custom strategies tried in order before the lexical fallback.
    pub fn with_tiers(mut tiers: Vec<Box<dyn EmbedTier>>, fallback: LexicalTier) -> Self {
        tiers.push(Box::new(fallback));
        Self { tiers, broken: Mutex::new(BTreeSet::new()) }
    }

    /// Tiers that failed earlier and will be skipped.
    pub fn broken_tiers(&self) -> Vec<EmbeddingTier> { self.lock_broken().iter().copied().collect() }

    fn lock_broken(&self) -> std::sync::MutexGuard<'_, BTreeSet<EmbeddingTier>> {
        self.broken.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Embed every document. Fails only on an empty document list.
    pub async fn embed(&self, documents: &[String], on_progress: &(dyn Fn(f32) + Send + Sync)) -> Result<Embeddings> {
        if documents.is_empty() {
            return Err(Error::InvalidInput("document list is empty".into()));
        }
        let progress = ProgressSink::new(on_progress);
        for tier in &self.tiers {
            let kind = tier.kind();
            if self.lock_broken().contains(&kind) { continue; }
            let started = Instant::now();
            let outcome = match tier.try_embed(documents, &progress).await {
                Ok(vectors) => check_shape(documents.len(), vectors),
                Err(e) => Err(e),
            };
            match outcome {
                Ok((vectors, dim)) => {
                    progress.report(1.0);
                    tracing::info!(tier = %kind, docs = documents.len(), dim, elapsed_ms = started.elapsed().as_millis() as u64, "embeddings ready");
                    return Ok(Embeddings { vectors, dim, tier: kind });
                }
                Err(e) => {
                    tracing::warn!(tier = %kind, error = %e, "embedding tier failed; falling back");
                    self.lock_broken().insert(kind);
                }
            }
        }
        Err(Error::Operation("every embedding tier failed".into()))
    }
}

fn check_shape(expected: usize, vectors: Vec<Vec<f32>>) -> std::result::Result<(Vec<Vec<f32>>, usize), TierError> {
    if vectors.len() != expected {
        return Err(TierError::Count { expected, got: vectors.len() });
    }
    let dim = vectors.first().map(Vec::len).unwrap_or(0);
    if let Some(bad) = vectors.iter().find(|v| v.len() != dim) {
        return Err(TierError::Dimension { first: dim, other: bad.len() });
    }
    Ok((vectors, dim))
}
