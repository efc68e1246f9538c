//! BERT-family sentence-transformer loaded from a local directory with candle.
//!
//! The directory must hold `tokenizer.json`, `config.json` and either
//! `model.safetensors` or `pytorch_model.bin`.
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::Tokenizer;
use topicmap_core::config::{expand_path, EmbeddingConfig};

use crate::device::select_device;
use crate::error::TierError;
use crate::pool::masked_mean_l2;
use crate::tokenize::tokenize_batch;

/// What the worker thread needs from a loaded model.
pub trait SentenceBackend {
    fn dim(&self) -> usize;

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, TierError>;
}

pub struct SentenceModel {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    dim: usize,
    max_len: usize,
}

impl SentenceModel {
    /// Load tokenizer, config and weights. `on_progress` receives load
    /// milestones in `[0, 1]`.
    pub fn load(cfg: &EmbeddingConfig, mut on_progress: impl FnMut(f32)) -> Result<Self, TierError> {
        let started = Instant::now();
        let model_dir = resolve_model_dir(cfg)?;
        tracing::info!(model = %cfg.model_name, dir = %model_dir.display(), "loading sentence model");
        let device = select_device();
        on_progress(0.1);

        let tokenizer_path = model_dir.join("tokenizer.json");
        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| TierError::ModelLoad(format!("tokenizer {}: {}", tokenizer_path.display(), e)))?;
        tokenizer.with_padding(None);
        tokenizer
            .with_truncation(None)
            .map_err(|e| TierError::ModelLoad(format!("tokenizer truncation: {e}")))?;
        on_progress(0.25);

        let config_path = model_dir.join("config.json");
        let raw = std::fs::read_to_string(&config_path)
            .map_err(|e| TierError::ModelLoad(format!("{}: {}", config_path.display(), e)))?;
        let value: serde_json::Value = serde_json::from_str(&raw).map_err(|e| TierError::ModelLoad(e.to_string()))?;
        let dim = value
            .get("hidden_size")
            .and_then(serde_json::Value::as_u64)
            .ok_or_else(|| TierError::ModelLoad("config.json has no hidden_size".into()))? as usize;
        let config: BertConfig = serde_json::from_value(value).map_err(|e| TierError::ModelLoad(e.to_string()))?;
        on_progress(0.4);

        let weights = load_weights(&model_dir, &device)?;
        on_progress(0.8);
        let vb = VarBuilder::from_tensors(weights, DType::F32, &device);
        let model = BertModel::load(vb, &config)?;
        on_progress(1.0);

        tracing::info!(dim, elapsed_ms = started.elapsed().as_millis() as u64, "sentence model ready");
        Ok(Self { model, tokenizer, device, dim, max_len: cfg.max_len })
    }

    pub fn dim(&self) -> usize { self.dim }

    /// Embed one batch; rows are L2-normalized mean-pooled token states.
    pub fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, TierError> {
        if texts.is_empty() { return Ok(Vec::new()); }
        let (input_ids, attention_mask) = tokenize_batch(&self.tokenizer, texts, self.max_len, &self.device)?;
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = self.model.forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = masked_mean_l2(&hidden, &attention_mask)?;
        let rows: Vec<Vec<f32>> = pooled.to_dtype(DType::F32)?.to_device(&Device::Cpu)?.to_vec2()?;
        Ok(rows)
    }
}

impl SentenceBackend for SentenceModel {
    fn dim(&self) -> usize { SentenceModel::dim(self) }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, TierError> { SentenceModel::embed_batch(self, texts) }
}

fn load_weights(model_dir: &Path, device: &Device) -> Result<HashMap<String, Tensor>, TierError> {
    let safetensors = model_dir.join("model.safetensors");
    if safetensors.exists() {
        return Ok(candle_core::safetensors::load(&safetensors, device)?);
    }
    let pickle = model_dir.join("pytorch_model.bin");
    if pickle.exists() {
        let weights = candle_core::pickle::read_all(&pickle)?;
        let mut map = HashMap::with_capacity(weights.len());
        for (name, tensor) in weights {
            map.insert(name, tensor.to_device(device)?);
        }
        return Ok(map);
    }
    Err(TierError::ModelLoad(format!("no model.safetensors or pytorch_model.bin in {}", model_dir.display())))
}

/// Locate the model directory: explicit config, `APP_MODEL_DIR`, `MODEL_DIR`,
/// then `models/<name>` and `../models/<name>`.
pub fn resolve_model_dir(cfg: &EmbeddingConfig) -> Result<PathBuf, TierError> {
    if let Some(dir) = &cfg.model_dir {
        let p = expand_path(dir);
        if p.exists() { return Ok(p); }
        return Err(TierError::ModelMissing(p.display().to_string()));
    }
    for var in ["APP_MODEL_DIR", "MODEL_DIR"] {
        if let Ok(dir) = std::env::var(var) {
            let p = expand_path(&dir);
            if p.exists() { tracing::debug!(var, dir = %p.display(), "model dir from env"); return Ok(p); }
        }
    }
    let local = Path::new("models").join(&cfg.model_name);
    if local.exists() { return Ok(local); }
    let parent = Path::new("../models").join(&cfg.model_name);
    if parent.exists() { return Ok(parent); }
    Err(TierError::ModelMissing(format!("models/{}", cfg.model_name)))
}
