use thiserror::Error;

/// Failure inside one tier of the embedding cascade. Never surfaced to
/// pipeline callers; the cascade logs it and moves to the next tier.
#[derive(Debug, Error)]
pub enum TierError {
    #[error("model directory not found: {0}")]
    ModelMissing(String),

    #[error("model load failed: {0}")]
    ModelLoad(String),

    #[error("tokenization failed: {0}")]
    Tokenize(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error(transparent)]
    Candle(#[from] candle_core::Error),

    #[error("worker thread could not be started: {0}")]
    WorkerSpawn(String),

    #[error("worker channel closed")]
    WorkerDisconnected,

    #[error("unexpected worker message: {0}")]
    Protocol(String),

    #[error("tier is marked degraded")]
    Degraded,

    #[error("tier returned {got} vectors for {expected} documents")]
    Count { expected: usize, got: usize },

    #[error("tier returned vectors of mixed dimension ({first} vs {other})")]
    Dimension { first: usize, other: usize },
}
