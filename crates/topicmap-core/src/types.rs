//! Domain types shared by every pipeline stage.
//!
//! All per-document data is index-aligned with the input document list:
//! position `i` in any of these sequences belongs to document `i`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An input text. Its position in the input slice is its identity.
pub type Document = String;

/// Dense vector for one document; all vectors of a run share one length.
pub type EmbeddingVector = Vec<f32>;

/// Cluster identifier. Non-negative ids are real clusters, [`NOISE`] marks
/// unclustered points.
pub type ClusterId = i32;

/// Sentinel cluster id for points no density cluster reached.
pub const NOISE: ClusterId = -1;

/// Label reserved for [`NOISE`].
pub const OUTLIERS_LABEL: &str = "Outliers";

/// A 2D position produced by the projector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f32,
    pub y: f32,
}

impl Coordinate {
    pub fn new(x: f32, y: f32) -> Self { Self { x, y } }

    pub fn distance(&self, other: &Coordinate) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// One discriminative term (1-3 word n-gram) of a topic with its c-TF-IDF score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredTerm {
    pub term: String,
    pub score: f32,
}

impl ScoredTerm {
    /// Number of words in the term.
    pub fn arity(&self) -> usize { self.term.split(' ').count() }

    pub fn is_phrase(&self) -> bool { self.arity() > 1 }
}

/// Keywords of a topic ordered by descending score.
pub type TopicKeywordSet = Vec<ScoredTerm>;

/// Keyword sets keyed by real cluster id.
pub type TopicKeywords = BTreeMap<ClusterId, TopicKeywordSet>;

/// Labels keyed by cluster id, [`NOISE`] included.
pub type TopicLabels = BTreeMap<ClusterId, String>;

/// Which strategy of the embedding cascade produced a set of vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingTier {
    /// Sentence model running on a dedicated worker thread.
    Offloaded,
    /// Same model executed on the caller's task.
    InProcess,
    /// Corpus-local BM25 / TF-IDF term vectors.
    Lexical,
}

impl EmbeddingTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbeddingTier::Offloaded => "offloaded",
            EmbeddingTier::InProcess => "in_process",
            EmbeddingTier::Lexical => "lexical",
        }
    }
}

impl std::fmt::Display for EmbeddingTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.as_str()) }
}
