//! topicmap-embed
//!
//! Turns documents into vectors through a cascade of strategies: the
//! sentence model on a worker thread, the same model in-process, then
//! corpus-local BM25 / TF-IDF vectors. See [`EmbeddingProvider`].

pub mod device;
pub mod error;
pub mod lexical;
pub mod model;
pub mod pool;
pub mod progress;
pub mod provider;
pub mod tiers;
pub mod tokenize;
pub mod worker;

pub use error::TierError;
pub use lexical::LexicalEmbedder;
pub use model::{SentenceBackend, SentenceModel};
pub use pool::masked_mean_l2;
pub use progress::ProgressSink;
pub use provider::{EmbeddingProvider, Embeddings};
pub use tiers::{EmbedTier, InProcessTier, LexicalTier};
pub use worker::{ModelLoader, OffloadedTier, WorkerState};
