//! BERT-family sentence embedder loaded from local artifacts
//! (`tokenizer.json`, `config.json`, `pytorch_model.bin`).

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::Tokenizer;

use ragdb_core::error::{Error, Result};

use crate::device::select_device;
use crate::pool::masked_mean_l2;
use crate::tokenize::tokenize_on_device;
use crate::Embedder;

fn unavailable(detail: impl std::fmt::Display) -> Error {
    Error::EmbeddingUnavailable(detail.to_string())
}

pub struct BertEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    dim: usize,
    max_len: usize,
}

impl BertEmbedder {
    /// Loads tokenizer, config and weights from `model_dir`. Any missing or
    /// unreadable artifact surfaces as `EmbeddingUnavailable`.
    pub fn load(model_dir: &Path) -> Result<Self> {
        let device = select_device();

        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            unavailable(format!(
                "failed to load tokenizer from {}: {}",
                tokenizer_path.display(),
                e
            ))
        })?;

        let config_path = model_dir.join("config.json");
        let config_text = fs::read_to_string(&config_path).map_err(|e| {
            unavailable(format!("failed to read {}: {}", config_path.display(), e))
        })?;
        let config: BertConfig = serde_json::from_str(&config_text)
            .map_err(|e| unavailable(format!("invalid model config: {}", e)))?;

        let weights_path = model_dir.join("pytorch_model.bin");
        let weights = candle_core::pickle::read_all(&weights_path).map_err(|e| {
            unavailable(format!("failed to read {}: {}", weights_path.display(), e))
        })?;
        let weights_map: HashMap<String, Tensor> = weights.into_iter().collect();
        let vb = VarBuilder::from_tensors(weights_map, DType::F32, &device);

        let dim = config.hidden_size;
        let model = BertModel::load(vb, &config).map_err(unavailable)?;
        tracing::info!(dim, model_dir = %model_dir.display(), "embedding model loaded");

        Ok(Self { model, tokenizer, device, dim, max_len: 256 })
    }

    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let (input_ids, attention_mask) =
            tokenize_on_device(&self.tokenizer, text, self.max_len, &self.device)?;
        let token_type_ids = input_ids.zeros_like().map_err(unavailable)?;
        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))
            .map_err(unavailable)?;
        let pooled = masked_mean_l2(&hidden, &attention_mask).map_err(unavailable)?;
        pooled
            .to_device(&Device::Cpu)
            .and_then(|t| t.squeeze(0))
            .and_then(|t| t.to_vec1::<f32>())
            .map_err(unavailable)
    }
}

impl Embedder for BertEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn max_len(&self) -> usize {
        self.max_len
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed_one(t)).collect()
    }
}
