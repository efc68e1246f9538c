use serde::Serialize;
use topicmap_core::types::{ClusterId, Coordinate, Document, TopicKeywordSet, TopicKeywords, TopicLabels, NOISE};

use crate::cluster_members;

pub const DEFAULT_REPRESENTATIVES: usize = 3;

/// Per-topic overview row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicInfo {
    pub id: ClusterId,
    pub size: usize,
    pub label: String,
    pub keywords: TopicKeywordSet,
    pub representative_docs: Vec<Document>,
}

fn centroid(points: &[Coordinate]) -> Coordinate {
    let n = points.len().max(1) as f32;
    let (sx, sy) = points.iter().fold((0.0, 0.0), |(x, y), p| (x + p.x, y + p.y));
    Coordinate::new(sx / n, sy / n)
}

/// One row per topic, ordered by id with outliers last. Representative
/// documents are the `n_repr` members nearest the topic's 2D centroid.
pub fn topic_info(
    documents: &[Document],
    coordinates: &[Coordinate],
    assignments: &[ClusterId],
    keywords: &TopicKeywords,
    labels: &TopicLabels,
    n_repr: usize,
) -> Vec<TopicInfo> {
    let members = cluster_members(assignments);
    let mut rows: Vec<TopicInfo> = members
        .iter()
        .map(|(&id, indices)| {
            let points: Vec<Coordinate> = indices.iter().filter_map(|&i| coordinates.get(i).copied()).collect();
            let center = centroid(&points);
            let mut ranked: Vec<(usize, f32)> = indices
                .iter()
                .filter_map(|&i| coordinates.get(i).map(|c| (i, c.distance(&center))))
                .collect();
            ranked.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
            TopicInfo {
                id,
                size: indices.len(),
                label: labels.get(&id).cloned().unwrap_or_else(|| format!("Topic {id}")),
                keywords: keywords.get(&id).cloned().unwrap_or_default(),
                representative_docs: ranked
                    .into_iter()
                    .take(n_repr)
                    .filter_map(|(i, _)| documents.get(i).cloned())
                    .collect(),
            }
        })
        .collect();
    rows.sort_by_key(|row| (row.id == NOISE, row.id));
    rows
}
