//! The dependency-injected retrieval context.

use std::path::Path;

use uuid::Uuid;

use ragdb_core::chunker::{chunk_text, ChunkingConfig};
use ragdb_core::config::{expand_path, EngineSettings};
use ragdb_core::error::{Error, Result};
use ragdb_core::score::relevance;
use ragdb_core::types::{
    Chunk, ChunkMetadata, IngestMetadata, NamespaceInfo, PerformanceStats, QueryResult,
    DEFAULT_NAMESPACE,
};
use ragdb_embed::EmbedProvider;
use ragdb_vector::NamespaceStore;

use crate::cache::QueryCache;

/// Owns the embedding provider, the namespaced vector store, the query
/// cache and the settings they were built from. Lifecycle is tied to this
/// value, not to process start; drop it and everything closes.
pub struct RetrievalEngine {
    settings: EngineSettings,
    provider: EmbedProvider,
    store: NamespaceStore,
    cache: QueryCache,
}

impl RetrievalEngine {
    /// Opens (or creates) the on-disk index under `settings.db_dir`. The
    /// embedding model is not loaded here; the provider constructs it
    /// lazily on first embed.
    pub async fn open(settings: EngineSettings) -> Result<Self> {
        let db_dir = expand_path(&settings.db_dir);
        std::fs::create_dir_all(&db_dir)?;
        let store = NamespaceStore::open(&db_dir).await?;
        let provider =
            EmbedProvider::new(expand_path(&settings.model_dir), settings.embedding_model.clone());
        let cache = QueryCache::new(settings.cache_capacity, settings.cache_enabled);
        tracing::info!(db_dir = %db_dir.display(), "retrieval engine opened");
        Ok(Self { settings, provider, store, cache })
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Extracts, chunks, embeds and upserts one document; returns the
    /// stored chunks (count and doc id are the caller's confirmation).
    /// Errors here are caller-visible: bad input must not be silent.
    pub async fn ingest(&self, file_path: &Path, metadata: IngestMetadata) -> Result<Vec<Chunk>> {
        let chunking = ChunkingConfig {
            chunk_size: self.settings.chunk_size,
            overlap: self.settings.overlap,
        };
        self.ingest_with(file_path, metadata, &chunking).await
    }

    /// `ingest` with explicit chunking parameters.
    pub async fn ingest_with(
        &self,
        file_path: &Path,
        metadata: IngestMetadata,
        chunking: &ChunkingConfig,
    ) -> Result<Vec<Chunk>> {
        let extension = declared_extension(&metadata.filename, file_path);
        let text = ragdb_extract::extract(file_path, &extension)?;
        let pieces = chunk_text(&text, chunking);

        let namespace = if metadata.namespace.is_empty() {
            DEFAULT_NAMESPACE.to_string()
        } else {
            metadata.namespace.clone()
        };
        let doc_id = metadata
            .doc_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let chunks: Vec<Chunk> = pieces
            .into_iter()
            .enumerate()
            .map(|(i, text)| {
                Chunk::new(
                    text,
                    ChunkMetadata {
                        doc_id: doc_id.clone(),
                        filename: metadata.filename.clone(),
                        namespace: namespace.clone(),
                        session_id: metadata.session_id.clone(),
                        chunk_index: i,
                    },
                )
            })
            .collect();
        if chunks.is_empty() {
            tracing::warn!(filename = %metadata.filename, "document produced no chunks");
            return Ok(chunks);
        }

        let embedder = self.provider.embedder()?;
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = embedder.embed_batch(&texts)?;
        self.store.upsert(&namespace, &chunks, &embeddings).await?;
        tracing::info!(
            filename = %metadata.filename,
            %namespace,
            %doc_id,
            chunks = chunks.len(),
            "document ingested"
        );
        Ok(chunks)
    }

    /// Cached retrieval. Failures degrade to an empty list with a logged
    /// cause: a missing search result must never hard-fail the caller's
    /// turn.
    pub async fn retrieve(&self, namespace: &str, query_text: &str, k: usize) -> Vec<QueryResult> {
        if let Some(hit) = self.cache.get(namespace, query_text, k) {
            tracing::debug!(namespace, k, "query cache hit");
            return hit;
        }
        match self.search(namespace, query_text, k).await {
            Ok(results) => {
                self.cache.put(namespace, query_text, k, results.clone());
                results
            }
            Err(err) => {
                tracing::warn!(namespace, error = %err, "retrieval degraded to empty result");
                Vec::new()
            }
        }
    }

    /// Cache-bypassing retrieval; same degraded-empty policy.
    pub async fn retrieve_uncached(
        &self,
        namespace: &str,
        query_text: &str,
        k: usize,
    ) -> Vec<QueryResult> {
        match self.search(namespace, query_text, k).await {
            Ok(results) => results,
            Err(err) => {
                tracing::warn!(namespace, error = %err, "retrieval degraded to empty result");
                Vec::new()
            }
        }
    }

    async fn search(&self, namespace: &str, query_text: &str, k: usize) -> Result<Vec<QueryResult>> {
        let embedder = self.provider.embedder()?;
        let query_vector = embedder
            .embed_batch(&[query_text.to_string()])?
            .into_iter()
            .next()
            .ok_or_else(|| Error::EmbeddingUnavailable("empty embedding batch".to_string()))?;
        let hits = self.store.query(namespace, &query_vector, k).await?;
        Ok(hits
            .into_iter()
            .map(|(chunk, distance)| QueryResult {
                id: chunk.id,
                text: chunk.text,
                metadata: chunk.metadata,
                distance,
                relevance_score: relevance(distance),
            })
            .collect())
    }

    /// Removes a document's chunks and returns the count; cached results
    /// that could still cite the deleted text are dropped.
    pub async fn delete_document(&self, namespace: &str, doc_id: &str) -> Result<usize> {
        let removed = self.store.delete_document(namespace, doc_id).await?;
        if removed > 0 {
            self.cache.clear();
        }
        Ok(removed)
    }

    /// Destroys a namespace partition. Guarding the default namespace is
    /// the caller's concern; the engine tolerates any name.
    pub async fn delete_namespace(&self, namespace: &str) -> Result<()> {
        self.store.delete_namespace(namespace).await?;
        self.cache.clear();
        Ok(())
    }

    pub async fn list_namespaces(&self) -> Result<Vec<NamespaceInfo>> {
        let names = self.store.list_namespaces().await?;
        let mut infos = Vec::with_capacity(names.len());
        for name in names {
            let document_count = self.store.document_count(&name).await?;
            let is_default = name == DEFAULT_NAMESPACE;
            infos.push(NamespaceInfo { name, document_count, is_default });
        }
        Ok(infos)
    }

    /// Swaps the active embedding model; the next embed reconstructs it.
    /// Cached results were scored under the old model, so they are dropped.
    pub fn set_embedding_model(&self, name: &str) {
        self.provider.set_model(name);
        self.cache.clear();
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cache_stats(&self) -> ragdb_core::types::CacheStats {
        self.cache.stats()
    }

    pub fn set_cache_enabled(&self, enabled: bool) {
        self.cache.set_enabled(enabled);
    }

    pub async fn performance_stats(&self) -> Result<PerformanceStats> {
        Ok(PerformanceStats {
            embedding_model: self.provider.model_name(),
            cache: self.cache.stats(),
            namespaces: self.list_namespaces().await?,
        })
    }
}

/// The extension the caller declared via the upload filename, falling back
/// to the on-disk path. Dispatch never sniffs content.
fn declared_extension(filename: &str, file_path: &Path) -> String {
    Path::new(filename)
        .extension()
        .or_else(|| file_path.extension())
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_default()
}
