use std::sync::Arc;

use ragdb_embed::{EmbedProvider, Embedder, FAKE_EMBEDDING_DIM};

fn force_fake() {
    std::env::set_var("APP_USE_FAKE_EMBEDDINGS", "1");
}

#[test]
fn provider_constructs_lazily_and_reuses_one_instance() {
    force_fake();
    let provider = EmbedProvider::new("/nonexistent/models", "minilm");
    let first = provider.embedder().expect("embedder");
    let second = provider.embedder().expect("embedder");
    assert!(Arc::ptr_eq(&first, &second), "same instance must be reused");
    assert_eq!(first.dim(), FAKE_EMBEDDING_DIM);
}

#[test]
fn set_model_forces_reconstruction() {
    force_fake();
    let provider = EmbedProvider::new("/nonexistent/models", "model-a");
    let before = provider.embedder().expect("embedder");

    provider.set_model("model-b");
    assert_eq!(provider.model_name(), "model-b");
    let after = provider.embedder().expect("embedder");
    assert!(!Arc::ptr_eq(&before, &after), "swap must rebuild the embedder");
}

#[test]
fn set_model_to_same_name_keeps_instance() {
    force_fake();
    let provider = EmbedProvider::new("/nonexistent/models", "model-a");
    let before = provider.embedder().expect("embedder");
    provider.set_model("model-a");
    let after = provider.embedder().expect("embedder");
    assert!(Arc::ptr_eq(&before, &after));
}

