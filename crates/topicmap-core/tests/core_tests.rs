use std::fs;

use tempfile::TempDir;

use topicmap_core::config::{ClusterMethod, Config, LexicalWeighting, Metric, TopicMapConfig};
use topicmap_core::types::{Coordinate, ScoredTerm};

#[test]
fn empty_config_file_yields_defaults() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("config.toml");
    fs::write(&path, "").unwrap();

    let settings = Config::load_from(&path).expect("load").settings().expect("settings");

    assert_eq!(settings, TopicMapConfig::default());
    assert_eq!(settings.clustering.method, ClusterMethod::Dbscan);
    assert_eq!(settings.clustering.min_pts, 2);
    assert_eq!(settings.projection.metric, Metric::Cosine);
    assert_eq!(settings.projection.seed, 42);
    assert_eq!(settings.topics.top_n, 10);
    assert_eq!(settings.embedding.lexical, LexicalWeighting::Bm25);
}

#[test]
fn file_values_override_defaults() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("topicmap.toml");
    fs::write(
        &path,
        r#"
[embedding]
semantic = false
lexical = "tfidf"

[clustering]
method = "kmeans"
k = 4

[topics]
top_n = 5
"#,
    )
    .unwrap();

    let config = Config::load_from(&path).expect("load");
    let settings = config.settings().expect("settings");

    assert!(!settings.embedding.semantic);
    assert_eq!(settings.embedding.lexical, LexicalWeighting::TfIdf);
    assert_eq!(settings.clustering.method, ClusterMethod::KMeans);
    assert_eq!(settings.clustering.k, Some(4));
    assert_eq!(settings.topics.top_n, 5);
    assert_eq!(config.get::<usize>("clustering.k").unwrap(), 4);
}

#[test]
fn relative_model_dir_resolves_against_config_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("config.toml");
    fs::write(&path, "[embedding]\nmodel_dir = \"models/minilm\"\n").unwrap();

    let settings = Config::load_from(&path).expect("load").settings().expect("settings");

    let expected = tmp.path().join("models/minilm");
    assert_eq!(settings.embedding.model_dir.as_deref(), Some(expected.to_string_lossy().as_ref()));
}

#[test]
fn invalid_values_are_rejected() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("config.toml");
    fs::write(&path, "[topics]\ntop_n = 0\n").unwrap();

    assert!(Config::load_from(&path).is_err());
}

#[test]
fn missing_config_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    assert!(Config::load_from(&tmp.path().join("nope.toml")).is_err());
}

#[test]
fn method_parses_from_cli_strings() {
    assert_eq!("kmeans".parse::<ClusterMethod>().unwrap(), ClusterMethod::KMeans);
    assert_eq!("DBSCAN".parse::<ClusterMethod>().unwrap(), ClusterMethod::Dbscan);
    assert!("hdbscan".parse::<ClusterMethod>().is_err());
}

#[test]
fn scored_term_arity() {
    let uni = ScoredTerm { term: "market".into(), score: 1.0 };
    let tri = ScoredTerm { term: "stock market finance".into(), score: 1.0 };
    assert!(!uni.is_phrase());
    assert_eq!(tri.arity(), 3);
    assert!(tri.is_phrase());
}

#[test]
fn coordinate_distance_is_euclidean() {
    let a = Coordinate::new(0.0, 0.0);
    let b = Coordinate::new(3.0, 4.0);
    assert!((a.distance(&b) - 5.0).abs() < 1e-6);
}
