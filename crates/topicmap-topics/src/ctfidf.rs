//! Class-based TF-IDF: every cluster is scored as one pseudo-document.
use std::collections::{BTreeMap, BTreeSet};

use topicmap_core::text::{ngrams, tokenize};
use topicmap_core::types::{ClusterId, Document, ScoredTerm, TopicKeywords, NOISE};

pub const DEFAULT_TOP_N: usize = 10;

/// Multiplier favouring multi-word terms.
pub fn phrase_boost(arity: usize) -> f64 {
    match arity {
        0 | 1 => 1.0,
        2 => 1.5,
        _ => 2.0,
    }
}

/// Unigrams, bigrams and trigrams of a class text, in that order.
pub fn class_terms(text: &str) -> Vec<String> {
    let tokens = tokenize(text);
    let mut terms = ngrams(&tokens, 2);
    terms.extend(ngrams(&tokens, 3));
    let mut all = tokens;
    all.append(&mut terms);
    all
}

/// Concatenate the documents of every real cluster in input order.
fn class_texts(documents: &[Document], assignments: &[ClusterId]) -> BTreeMap<ClusterId, String> {
    let mut classes: BTreeMap<ClusterId, Vec<&str>> = BTreeMap::new();
    for (doc, &id) in documents.iter().zip(assignments) {
        if id != NOISE {
            classes.entry(id).or_default().push(doc.as_str());
        }
    }
    classes.into_iter().map(|(id, docs)| (id, docs.join(" "))).collect()
}

/// Top `top_n` c-TF-IDF terms per real cluster.
///
/// Score is `tf * ln((K + 1) / (classes_with_term + 1)) * phrase_boost`, with
/// `tf` the term count over the class's total term count. Terms are ordered
/// by score, then raw count (both descending), then alphabetically. Noise
/// documents take no part in scoring.
pub fn extract_keywords(documents: &[Document], assignments: &[ClusterId], top_n: usize) -> TopicKeywords {
    let classes = class_texts(documents, assignments);
    let counts: BTreeMap<ClusterId, BTreeMap<String, usize>> = classes
        .iter()
        .map(|(&id, text)| {
            let mut counts = BTreeMap::new();
            for term in class_terms(text) {
                *counts.entry(term).or_insert(0) += 1;
            }
            (id, counts)
        })
        .collect();

    let mut class_frequency: BTreeMap<&str, usize> = BTreeMap::new();
    for terms in counts.values() {
        for term in terms.keys() {
            *class_frequency.entry(term.as_str()).or_insert(0) += 1;
        }
    }
    let k = counts.len() as f64;

    let mut keywords = TopicKeywords::new();
    for (&id, terms) in &counts {
        let total: usize = terms.values().sum();
        // Ranked on the published f32 score so ties visible to callers
        // fall through to count and term.
        let mut scored: Vec<(&str, usize, f32)> = terms
            .iter()
            .map(|(term, &count)| {
                let tf = count as f64 / total as f64;
                let cf = class_frequency.get(term.as_str()).copied().unwrap_or(0) as f64;
                let icf = ((k + 1.0) / (cf + 1.0)).ln();
                let arity = term.split(' ').count();
                (term.as_str(), count, (tf * icf * phrase_boost(arity)) as f32)
            })
            .collect();
        scored.sort_by(|a, b| b.2.total_cmp(&a.2).then(b.1.cmp(&a.1)).then(a.0.cmp(b.0)));
        let set = scored
            .into_iter()
            .take(top_n)
            .map(|(term, _, score)| ScoredTerm { term: term.to_string(), score })
            .collect();
        keywords.insert(id, set);
    }

    // Clusters whose documents yield no terms still get an (empty) entry.
    let ids: BTreeSet<ClusterId> = assignments.iter().copied().filter(|&id| id != NOISE).collect();
    for id in ids {
        keywords.entry(id).or_default();
    }
    tracing::debug!(clusters = keywords.len(), top_n, "extracted topic keywords");
    keywords
}
