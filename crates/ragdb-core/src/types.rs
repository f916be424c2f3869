//! Domain types shared by the extraction, embedding, index and engine crates.

use serde::{Deserialize, Serialize};

pub type ChunkId = String;

/// The distinguished namespace that always logically exists, even with zero
/// documents stored. Listings must include it; the engine never creates or
/// destroys it eagerly.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Provenance of a chunk within its source document.
///
/// - `doc_id`: stable document identity (caller-supplied or generated)
/// - `filename`: original file name, used for citations
/// - `namespace`: the index partition the chunk was written under
/// - `session_id`: optional owning session for session-scoped uploads
/// - `chunk_index`: zero-based position within the parent document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub doc_id: String,
    pub filename: String,
    pub namespace: String,
    pub session_id: Option<String>,
    pub chunk_index: usize,
}

/// A bounded, overlapping passage of a source document; the atomic
/// retrievable unit. Immutable once stored, removed only by document or
/// namespace deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: ChunkId,
    pub text: String,
    pub metadata: ChunkMetadata,
}

impl Chunk {
    /// Builds a chunk with the deterministic `"{doc_id}-{chunk_index}"` id,
    /// so re-ingesting the same document overwrites rather than duplicates.
    pub fn new(text: impl Into<String>, metadata: ChunkMetadata) -> Self {
        let id = format!("{}-{}", metadata.doc_id, metadata.chunk_index);
        Self { id, text: text.into(), metadata }
    }
}

/// Caller-supplied metadata for a single ingestion call.
///
/// When `doc_id` is `None` the engine generates one and surfaces it on the
/// returned chunks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestMetadata {
    pub filename: String,
    pub namespace: String,
    pub session_id: Option<String>,
    pub doc_id: Option<String>,
}

/// A ranked retrieval hit: stored text plus raw distance and its normalized
/// relevance score, ready for citation formatting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub id: ChunkId,
    pub text: String,
    pub metadata: ChunkMetadata,
    pub distance: f32,
    pub relevance_score: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceInfo {
    pub name: String,
    pub document_count: usize,
    pub is_default: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub size: usize,
    pub max_size: usize,
    pub enabled: bool,
}

/// Aggregate snapshot returned by the engine's `performance_stats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceStats {
    pub embedding_model: String,
    pub cache: CacheStats,
    pub namespaces: Vec<NamespaceInfo>,
}
