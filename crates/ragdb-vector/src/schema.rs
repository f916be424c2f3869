//! Arrow schema for namespace tables.

use arrow_schema::{DataType, Field, Schema, TimeUnit};
use std::sync::Arc;

/// Builds the per-namespace table schema. `dim` is fixed by the embedding
/// model active when the namespace is first written; it is read back from
/// the stored schema to police later writes and queries.
pub fn build_namespace_schema(dim: i32) -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("doc_id", DataType::Utf8, false),
        Field::new("filename", DataType::Utf8, false),
        Field::new("namespace", DataType::Utf8, false),
        Field::new("session_id", DataType::Utf8, true),
        Field::new("chunk_index", DataType::Int32, false),
        Field::new("content", DataType::Utf8, false),
        Field::new(
            "ingested_at",
            DataType::Timestamp(TimeUnit::Millisecond, None),
            false,
        ),
        Field::new(
            "vector",
            DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim),
            true,
        ),
    ]))
}

/// Reads the stored embedding dimension out of a namespace table schema.
pub fn vector_dim(schema: &Schema) -> Option<usize> {
    schema.field_with_name("vector").ok().and_then(|f| match f.data_type() {
        DataType::FixedSizeList(_, n) => usize::try_from(*n).ok(),
        _ => None,
    })
}
