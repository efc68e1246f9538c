//! Sentence model on a dedicated worker thread.
//!
//! The caller talks to the worker over bounded channels with typed
//! messages. The worker is started once per [`OffloadedTier`] and shared by
//! every later call; concurrent first callers await the same start-up and
//! share its outcome, failure included.
use std::sync::{Arc, Mutex};
use std::thread;

use async_trait::async_trait;
use tokio::sync::{mpsc, OnceCell};
use topicmap_core::config::EmbeddingConfig;
use topicmap_core::types::EmbeddingTier;

use crate::error::TierError;
use crate::model::{SentenceBackend, SentenceModel};
use crate::progress::ProgressSink;
use crate::tiers::EmbedTier;

const REQUEST_QUEUE: usize = 8;
const EVENT_QUEUE: usize = 32;

/// Builds the backend on the worker thread, reporting load progress.
pub type ModelLoader = Arc<dyn Fn(&mut dyn FnMut(f32)) -> Result<Box<dyn SentenceBackend>, TierError> + Send + Sync>;

fn sentence_model_loader(config: EmbeddingConfig) -> ModelLoader {
    Arc::new(move |on_progress: &mut dyn FnMut(f32)| {
        SentenceModel::load(&config, on_progress).map(|m| Box::new(m) as Box<dyn SentenceBackend>)
    })
}

#[derive(Debug)]
pub enum WorkerRequest {
    /// Load the model; answered by `Progress`* then `Ready` or `Error`.
    Init { reply: mpsc::Sender<WorkerEvent> },
    /// Embed all texts in `batch_size` chunks; answered by `EmbedProgress`*
    /// then `EmbedComplete` or `Error`.
    EmbedBatch { texts: Vec<String>, reply: mpsc::Sender<WorkerEvent> },
}

#[derive(Debug)]
pub enum WorkerEvent {
    Progress(f32),
    Ready { dim: usize },
    EmbedProgress { done: usize, total: usize },
    EmbedComplete(Vec<Vec<f32>>),
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Uninit,
    Initializing,
    Ready,
    Degraded,
}

struct WorkerHandle {
    requests: mpsc::Sender<WorkerRequest>,
    dim: usize,
}

impl WorkerHandle {
    async fn spawn(loader: ModelLoader, batch_size: usize) -> Result<Self, TierError> {
        let (req_tx, req_rx) = mpsc::channel(REQUEST_QUEUE);
        thread::Builder::new()
            .name("topicmap-embed-worker".into())
            .spawn(move || worker_loop(&loader, batch_size, req_rx))
            .map_err(|e| TierError::WorkerSpawn(e.to_string()))?;

        let (tx, mut rx) = mpsc::channel(EVENT_QUEUE);
        req_tx.send(WorkerRequest::Init { reply: tx }).await.map_err(|_| TierError::WorkerDisconnected)?;
        while let Some(event) = rx.recv().await {
            match event {
                WorkerEvent::Progress(p) => tracing::debug!(progress = p, "worker loading model"),
                WorkerEvent::Ready { dim } => return Ok(Self { requests: req_tx, dim }),
                WorkerEvent::Error(msg) => return Err(TierError::ModelLoad(msg)),
                other => return Err(TierError::Protocol(format!("{other:?} during init"))),
            }
        }
        Err(TierError::WorkerDisconnected)
    }
}

fn worker_loop(loader: &ModelLoader, batch_size: usize, mut requests: mpsc::Receiver<WorkerRequest>) {
    let mut model: Option<Box<dyn SentenceBackend>> = None;
    while let Some(request) = requests.blocking_recv() {
        match request {
            WorkerRequest::Init { reply } => {
                if let Some(m) = &model {
                    let _ = reply.blocking_send(WorkerEvent::Ready { dim: m.dim() });
                    continue;
                }
                let mut on_progress = |p: f32| { let _ = reply.blocking_send(WorkerEvent::Progress(p)); };
                match loader(&mut on_progress) {
                    Ok(m) => {
                        let _ = reply.blocking_send(WorkerEvent::Ready { dim: m.dim() });
                        model = Some(m);
                    }
                    Err(e) => {
                        let _ = reply.blocking_send(WorkerEvent::Error(detail(e)));
                        return;
                    }
                }
            }
            WorkerRequest::EmbedBatch { texts, reply } => {
                let Some(m) = &model else {
                    let _ = reply.blocking_send(WorkerEvent::Error("model not initialised".into()));
                    continue;
                };
                let _ = reply.blocking_send(embed_all(m.as_ref(), &texts, batch_size, &reply));
            }
        }
    }
}

/// Error text for the caller, which re-wraps it in its own variant.
fn detail(e: TierError) -> String {
    match e {
        TierError::ModelLoad(msg) | TierError::Inference(msg) => msg,
        other => other.to_string(),
    }
}

fn embed_all(model: &dyn SentenceBackend, texts: &[String], batch_size: usize, reply: &mpsc::Sender<WorkerEvent>) -> WorkerEvent {
    let batches: Vec<&[String]> = texts.chunks(batch_size.max(1)).collect();
    let mut vectors = Vec::with_capacity(texts.len());
    for (i, batch) in batches.iter().enumerate() {
        let refs: Vec<&str> = batch.iter().map(String::as_str).collect();
        match model.embed_batch(&refs) {
            Ok(rows) => vectors.extend(rows),
            Err(e) => return WorkerEvent::Error(detail(e)),
        }
        let _ = reply.blocking_send(WorkerEvent::EmbedProgress { done: i + 1, total: batches.len() });
    }
    WorkerEvent::EmbedComplete(vectors)
}

/// Sentence model offloaded to the worker thread.
pub struct OffloadedTier {
    loader: ModelLoader,
    batch_size: usize,
    /// Start-up outcome; a failure is kept so no caller retries it.
    worker: OnceCell<Result<WorkerHandle, String>>,
    state: Mutex<WorkerState>,
}

impl OffloadedTier {
    pub fn new(config: EmbeddingConfig) -> Self {
        let batch_size = config.batch_size;
        Self::with_loader(sentence_model_loader(config), batch_size)
    }

    /// Worker driven by a custom backend.
    pub fn with_loader(loader: ModelLoader, batch_size: usize) -> Self {
        Self { loader, batch_size, worker: OnceCell::new(), state: Mutex::new(WorkerState::Uninit) }
    }

    pub fn state(&self) -> WorkerState { *self.state.lock().unwrap_or_else(|e| e.into_inner()) }

    /// Embedding dimension once the worker is ready.
    pub fn dim(&self) -> Option<usize> { self.worker.get().and_then(|w| w.as_ref().ok()).map(|w| w.dim) }

    fn set_state(&self, state: WorkerState) { *self.state.lock().unwrap_or_else(|e| e.into_inner()) = state; }

    async fn worker(&self) -> Result<&WorkerHandle, TierError> {
        if self.state() == WorkerState::Degraded { return Err(TierError::Degraded); }
        if self.state() == WorkerState::Uninit { self.set_state(WorkerState::Initializing); }
        let outcome = self
            .worker
            .get_or_init(|| async {
                WorkerHandle::spawn(self.loader.clone(), self.batch_size).await.map_err(|e| match e {
                    TierError::ModelLoad(msg) => msg,
                    other => other.to_string(),
                })
            })
            .await;
        match outcome {
            Ok(w) => {
                self.set_state(WorkerState::Ready);
                Ok(w)
            }
            Err(msg) => {
                self.set_state(WorkerState::Degraded);
                Err(TierError::ModelLoad(msg.clone()))
            }
        }
    }

    async fn embed_via_worker(&self, documents: &[String], progress: &ProgressSink<'_>) -> Result<Vec<Vec<f32>>, TierError> {
        let worker = self.worker().await?;
        let (tx, mut rx) = mpsc::channel(EVENT_QUEUE);
        worker
            .requests
            .send(WorkerRequest::EmbedBatch { texts: documents.to_vec(), reply: tx })
            .await
            .map_err(|_| TierError::WorkerDisconnected)?;
        while let Some(event) = rx.recv().await {
            match event {
                WorkerEvent::EmbedProgress { done, total } => progress.report_batches(done, total),
                WorkerEvent::EmbedComplete(vectors) => return Ok(vectors),
                WorkerEvent::Error(msg) => return Err(TierError::Inference(msg)),
                other => return Err(TierError::Protocol(format!("{other:?} during embedding"))),
            }
        }
        Err(TierError::WorkerDisconnected)
    }
}

#[async_trait]
impl EmbedTier for OffloadedTier {
    fn kind(&self) -> EmbeddingTier { EmbeddingTier::Offloaded }

    async fn try_embed(&self, documents: &[String], progress: &ProgressSink<'_>) -> Result<Vec<Vec<f32>>, TierError> {
        let result = self.embed_via_worker(documents, progress).await;
        if result.is_err() { self.set_state(WorkerState::Degraded); }
        result
    }
}
