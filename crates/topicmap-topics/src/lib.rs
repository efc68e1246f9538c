#![deny(warnings, dead_code, unused_variables, unused_imports)]

//! Keywords, labels and summaries for clustered documents.

pub mod ctfidf;
pub mod label;
pub mod summary;

use std::collections::BTreeMap;

use topicmap_core::types::ClusterId;

pub use ctfidf::{class_terms, extract_keywords, phrase_boost, DEFAULT_TOP_N};
pub use label::{label_for, label_topics};
pub use summary::{topic_info, TopicInfo, DEFAULT_REPRESENTATIVES};

/// Document indices per cluster id (noise included), in input order.
pub fn cluster_members(assignments: &[ClusterId]) -> BTreeMap<ClusterId, Vec<usize>> {
    let mut members: BTreeMap<ClusterId, Vec<usize>> = BTreeMap::new();
    for (i, &id) in assignments.iter().enumerate() {
        members.entry(id).or_default().push(i);
    }
    members
}
