use serde::Serialize;
use topicmap_core::config::ClusterMethod;
use topicmap_core::types::{ClusterId, Coordinate, EmbeddingTier, EmbeddingVector, TopicKeywords, TopicLabels};
use topicmap_topics::TopicInfo;

/// Everything one run produces, index-aligned with the input documents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicMap {
    pub embeddings: Vec<EmbeddingVector>,
    pub embedding_tier: EmbeddingTier,
    pub coordinates: Vec<Coordinate>,
    pub assignments: Vec<ClusterId>,
    pub keywords: TopicKeywords,
    pub labels: TopicLabels,
    pub topics: Vec<TopicInfo>,
    pub method: ClusterMethod,
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let (mut dot, mut na, mut nb) = (0f32, 0f32, 0f32);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    if na == 0.0 || nb == 0.0 { 0.0 } else { dot / (na.sqrt() * nb.sqrt()) }
}

impl TopicMap {
    pub fn len(&self) -> usize { self.assignments.len() }

    pub fn is_empty(&self) -> bool { self.assignments.is_empty() }

    /// Number of real (non-noise) topics.
    pub fn topic_count(&self) -> usize { self.keywords.len() }

    /// Label of the topic document `index` belongs to.
    pub fn label_of(&self, index: usize) -> Option<&str> {
        let id = self.assignments.get(index)?;
        self.labels.get(id).map(String::as_str)
    }

    /// The `top_k` documents most similar to document `index` by cosine
    /// similarity of their embeddings, best first, ties by index. Empty for
    /// an out-of-range index.
    pub fn most_similar(&self, index: usize, top_k: usize) -> Vec<(usize, f32)> {
        let Some(query) = self.embeddings.get(index) else {
            return Vec::new();
        };
        let mut scored: Vec<(usize, f32)> = self
            .embeddings
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(i, v)| (i, cosine(query, v)))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.truncate(top_k);
        scored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn map() -> TopicMap {
        TopicMap {
            embeddings: vec![vec![1.0, 0.0], vec![0.9, 0.1], vec![0.0, 1.0], vec![0.0, 0.0]],
            embedding_tier: EmbeddingTier::Lexical,
            coordinates: vec![Coordinate::new(0.0, 0.0); 4],
            assignments: vec![0, 0, 1, -1],
            keywords: BTreeMap::new(),
            labels: BTreeMap::from([(0, "Topic 0: a".to_string()), (-1, "Outliers".to_string())]),
            topics: Vec::new(),
            method: ClusterMethod::Dbscan,
        }
    }

    #[test]
    fn most_similar_ranks_by_cosine() {
        let hits = map().most_similar(0, 2);
        assert_eq!(hits.iter().map(|h| h.0).collect::<Vec<_>>(), vec![1, 2]);
        assert!(map().most_similar(9, 2).is_empty());
    }

    #[test]
    fn zero_vector_scores_zero() {
        let hits = map().most_similar(3, 3);
        assert!(hits.iter().all(|h| h.1 == 0.0));
        assert_eq!(hits.iter().map(|h| h.0).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn label_lookup() {
        let m = map();
        assert_eq!(m.label_of(3), Some("Outliers"));
        assert_eq!(m.label_of(2), None);
    }
}
