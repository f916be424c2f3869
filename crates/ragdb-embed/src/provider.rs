//! Lazy, swappable access to the active embedding model.
//!
//! Exactly one embedder is constructed per provider and reused across calls;
//! `set_model` invalidates it so the next use rebuilds against the new name.
//! Construction is expensive (weight loading), inference afterwards is
//! read-only and safe to share.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use ragdb_core::error::{Error, Result};

use crate::fake::{FakeEmbedder, FAKE_EMBEDDING_DIM};
use crate::model::BertEmbedder;
use crate::{fake_embeddings_requested, Embedder};

pub struct EmbedProvider {
    model_dir: PathBuf,
    state: Mutex<ProviderState>,
}

struct ProviderState {
    model_name: String,
    embedder: Option<Arc<dyn Embedder>>,
}

impl EmbedProvider {
    pub fn new(model_dir: impl Into<PathBuf>, model_name: impl Into<String>) -> Self {
        Self {
            model_dir: model_dir.into(),
            state: Mutex::new(ProviderState { model_name: model_name.into(), embedder: None }),
        }
    }

    pub fn model_name(&self) -> String {
        self.lock_state().model_name.clone()
    }

    /// Swaps the active model name. The current embedder is dropped and the
    /// next `embedder()` call reconstructs against the new name; callers are
    /// responsible for the stored-vector dimension consequences.
    pub fn set_model(&self, name: &str) {
        let mut state = self.lock_state();
        if state.model_name != name {
            tracing::info!(from = %state.model_name, to = name, "switching embedding model");
            state.model_name = name.to_string();
            state.embedder = None;
        }
    }

    /// Returns the shared embedder, constructing it on first use.
    pub fn embedder(&self) -> Result<Arc<dyn Embedder>> {
        let mut state = self.lock_state();
        if let Some(embedder) = &state.embedder {
            return Ok(Arc::clone(embedder));
        }
        let built = build_embedder(&self.model_dir, &state.model_name)?;
        state.embedder = Some(Arc::clone(&built));
        Ok(built)
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, ProviderState> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

fn build_embedder(model_dir: &Path, model_name: &str) -> Result<Arc<dyn Embedder>> {
    if fake_embeddings_requested() {
        tracing::info!("using deterministic fake embedder");
        return Ok(Arc::new(FakeEmbedder::new(FAKE_EMBEDDING_DIM)));
    }
    let dir = resolve_model_dir(model_dir, model_name)?;
    Ok(Arc::new(BertEmbedder::load(&dir)?))
}

/// Locates the artifact directory for `model_name`: `APP_MODEL_DIR` wins,
/// then `<model_dir>/<name tail>`, then `model_dir` itself when it already
/// holds a tokenizer.
fn resolve_model_dir(model_dir: &Path, model_name: &str) -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("APP_MODEL_DIR") {
        let p = PathBuf::from(&dir);
        if p.exists() {
            return Ok(p);
        }
    }
    let tail = model_name.rsplit('/').next().unwrap_or(model_name);
    let candidate = model_dir.join(tail);
    if candidate.exists() {
        return Ok(candidate);
    }
    if model_dir.join("tokenizer.json").exists() {
        return Ok(model_dir.to_path_buf());
    }
    Err(Error::EmbeddingUnavailable(format!(
        "could not locate artifacts for '{}' under {}",
        model_name,
        model_dir.display()
    )))
}
