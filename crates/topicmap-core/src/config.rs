//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars
//! into a [`TopicMapConfig`]. Nested keys are addressed with `__` in env vars,
//! e.g. `APP_CLUSTERING__METHOD=kmeans`.
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(TopicMapConfig::default()))
            .merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.settings()?.validate()?;
        Ok(config)
    }

    /// Load a single TOML file (plus `APP_*` overrides). A relative
    /// `embedding.model_dir` is resolved against the file's directory.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        let mut figment = Figment::from(Serialized::defaults(TopicMapConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("APP_").split("__"));
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        if let Ok(dir) = figment.extract_inner::<String>("embedding.model_dir") {
            let resolved = resolve_with_base(base, &dir);
            figment = figment.merge(Serialized::default("embedding.model_dir", resolved.to_string_lossy().to_string()));
        }
        let config = Self { figment };
        config.settings()?.validate()?;
        Ok(config)
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// The full typed settings tree.
    pub fn settings(&self) -> Result<TopicMapConfig> {
        self.figment.extract().map_err(|e| Error::InvalidConfig(e.to_string()))
    }
}

/// Every knob the pipeline reads. An empty source yields the defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicMapConfig {
    pub embedding: EmbeddingConfig,
    pub projection: ProjectionConfig,
    pub clustering: ClusteringConfig,
    pub topics: TopicConfig,
}

impl TopicMapConfig {
    pub fn validate(&self) -> Result<()> {
        if self.embedding.batch_size == 0 {
            return Err(Error::InvalidConfig("embedding.batch_size must be > 0".into()));
        }
        if self.embedding.max_len == 0 {
            return Err(Error::InvalidConfig("embedding.max_len must be > 0".into()));
        }
        if self.projection.n_neighbors == Some(0) {
            return Err(Error::InvalidConfig("projection.n_neighbors must be > 0".into()));
        }
        if !(self.projection.spread > 0.0) {
            return Err(Error::InvalidConfig("projection.spread must be > 0".into()));
        }
        if self.projection.min_dist < 0.0 || self.projection.min_dist > self.projection.spread {
            return Err(Error::InvalidConfig("projection.min_dist must lie in [0, spread]".into()));
        }
        if self.clustering.k == Some(0) {
            return Err(Error::InvalidConfig("clustering.k must be > 0".into()));
        }
        if let Some(eps) = self.clustering.eps {
            if !(eps >= 0.0) {
                return Err(Error::InvalidConfig("clustering.eps must be >= 0".into()));
            }
        }
        if self.clustering.min_pts == 0 {
            return Err(Error::InvalidConfig("clustering.min_pts must be > 0".into()));
        }
        if self.topics.top_n == 0 {
            return Err(Error::InvalidConfig("topics.top_n must be > 0".into()));
        }
        Ok(())
    }
}

/// Term weighting used by the lexical embedding tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LexicalWeighting {
    TfIdf,
    #[default]
    Bm25,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Try the sentence model before the lexical fallback.
    pub semantic: bool,
    /// Run the sentence model on a dedicated worker thread first.
    pub offload: bool,
    pub model_dir: Option<String>,
    pub model_name: String,
    pub batch_size: usize,
    pub max_len: usize,
    pub lexical: LexicalWeighting,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            semantic: true,
            offload: true,
            model_dir: None,
            model_name: "all-MiniLM-L6-v2".to_string(),
            batch_size: 32,
            max_len: 256,
            lexical: LexicalWeighting::Bm25,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Cosine,
    Euclidean,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Defaults to `min(15, N - 1)`.
    pub n_neighbors: Option<usize>,
    pub min_dist: f32,
    pub spread: f32,
    pub metric: Metric,
    /// Defaults to 500 up to 10k points, 200 above.
    pub n_epochs: Option<usize>,
    pub seed: u64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self { n_neighbors: None, min_dist: 0.0, spread: 1.0, metric: Metric::Cosine, n_epochs: None, seed: 42 }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterMethod {
    KMeans,
    #[default]
    Dbscan,
}

impl std::str::FromStr for ClusterMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "kmeans" | "k-means" => Ok(ClusterMethod::KMeans),
            "dbscan" => Ok(ClusterMethod::Dbscan),
            other => Err(Error::InvalidConfig(format!("unknown clustering method '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    pub method: ClusterMethod,
    /// Explicit cluster count for k-means; auto-selected when absent.
    pub k: Option<usize>,
    /// Explicit neighborhood radius for DBSCAN; auto-selected when absent.
    pub eps: Option<f32>,
    pub min_pts: usize,
    pub seed: u64,
}

impl Default for ClusteringConfig {
    fn default() -> Self { Self { method: ClusterMethod::Dbscan, k: None, eps: None, min_pts: 2, seed: 42 } }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicConfig {
    pub top_n: usize,
}

impl Default for TopicConfig {
    fn default() -> Self { Self { top_n: 10 } }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    // Expand env vars first
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    // Expand ~ at start
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
