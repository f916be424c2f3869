//! Local embedding models behind a lazily initialized provider.
//!
//! The real model is a BERT-family sentence transformer loaded via candle
//! from on-disk artifacts; tests and offline runs select a deterministic
//! hash-based embedder with `APP_USE_FAKE_EMBEDDINGS=1`.

#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod device;
pub mod fake;
pub mod model;
pub mod pool;
pub mod provider;
pub mod tokenize;

use ragdb_core::error::Result;

pub use fake::{FakeEmbedder, FAKE_EMBEDDING_DIM};
pub use model::BertEmbedder;
pub use pool::masked_mean_l2;
pub use provider::EmbedProvider;

/// Converts text batches into fixed-dimension vectors. Implementations are
/// read-only after construction and safe for concurrent inference.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// True when the process asks for the deterministic fake embedder instead
/// of loading model weights.
pub fn fake_embeddings_requested() -> bool {
    std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
