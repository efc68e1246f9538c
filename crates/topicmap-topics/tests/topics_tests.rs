use std::collections::BTreeSet;

use topicmap_core::types::{Coordinate, NOISE, OUTLIERS_LABEL};
use topicmap_topics::{extract_keywords, label_topics, topic_info, DEFAULT_REPRESENTATIVES};

fn corpus() -> (Vec<String>, Vec<i32>) {
    let docs = vec![
        "solar panel battery storage".to_string(),
        "solar panel inverter wiring".to_string(),
        "tomato seedlings garden soil".to_string(),
        "garden soil compost tomato".to_string(),
        "random unrelated words".to_string(),
    ];
    (docs, vec![0, 0, 1, 1, NOISE])
}

#[test]
fn noise_is_excluded_from_keywords() {
    let (docs, assignments) = corpus();
    let keywords = extract_keywords(&docs, &assignments, 10);
    assert_eq!(keywords.keys().copied().collect::<Vec<_>>(), vec![0, 1]);
    for set in keywords.values() {
        assert!(set.iter().all(|t| !t.term.contains("unrelated")));
    }
}

#[test]
fn keywords_are_ordered_unique_and_capped() {
    let (docs, assignments) = corpus();
    let keywords = extract_keywords(&docs, &assignments, 5);
    for set in keywords.values() {
        assert!(set.len() <= 5);
        assert!(set.windows(2).all(|w| w[0].score >= w[1].score));
        let unique: BTreeSet<&str> = set.iter().map(|t| t.term.as_str()).collect();
        assert_eq!(unique.len(), set.len());
    }
}

#[test]
fn repeated_phrase_leads_its_topic() {
    let (docs, assignments) = corpus();
    let keywords = extract_keywords(&docs, &assignments, 10);
    // "solar panel": 2 of 21 terms in class 0 (8 words, 7 bigrams, 6 trigrams), boost 1.5
    assert_eq!(keywords[&0][0].term, "solar panel");
    let expected = (2.0f64 / 21.0 * (3.0f64 / 2.0).ln() * 1.5) as f32;
    assert!((keywords[&0][0].score - expected).abs() < 1e-6);
    assert_eq!(keywords[&1][0].term, "garden soil");
}

#[test]
fn labels_cover_every_topic_and_outliers() {
    let (docs, assignments) = corpus();
    let keywords = extract_keywords(&docs, &assignments, 10);
    let labels = label_topics(&keywords);
    assert_eq!(labels[&NOISE], OUTLIERS_LABEL);
    assert!(labels[&0].starts_with("Topic 0: solar panel, "));
    assert!(labels[&1].starts_with("Topic 1: garden soil, "));
}

#[test]
fn single_cluster_still_gets_a_label() {
    let docs = vec!["alpha beta gamma".to_string(), "alpha beta delta".to_string()];
    let keywords = extract_keywords(&docs, &[0, 0], 10);
    assert!(keywords[&0].iter().all(|t| t.score == 0.0));
    assert!(!keywords[&0].is_empty());
    let labels = label_topics(&keywords);
    assert_eq!(labels[&0], "Topic 0: alpha beta, alpha beta delta");
}

#[test]
fn cluster_without_terms_is_labelled_empty() {
    let docs = vec!["a an the".to_string(), "solar panel".to_string()];
    let keywords = extract_keywords(&docs, &[0, 1], 10);
    assert!(keywords[&0].is_empty());
    assert_eq!(label_topics(&keywords)[&0], "Topic 0: Empty");
}

#[test]
fn topic_info_orders_rows_and_picks_central_documents() {
    let (docs, assignments) = corpus();
    let coords = vec![
        Coordinate::new(0.0, 0.0),
        Coordinate::new(1.0, 0.0),
        Coordinate::new(10.0, 10.0),
        Coordinate::new(10.0, 12.0),
        Coordinate::new(-40.0, 5.0),
    ];
    let keywords = extract_keywords(&docs, &assignments, 10);
    let labels = label_topics(&keywords);
    let rows = topic_info(&docs, &coords, &assignments, &keywords, &labels, DEFAULT_REPRESENTATIVES);

    assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![0, 1, NOISE]);
    assert_eq!(rows[0].size, 2);
    assert_eq!(rows[0].representative_docs, vec![docs[0].clone(), docs[1].clone()]);
    assert_eq!(rows[2].label, OUTLIERS_LABEL);
    assert!(rows[2].keywords.is_empty());

    let json = serde_json::to_value(&rows).unwrap();
    assert_eq!(json[0]["id"], 0);
}
