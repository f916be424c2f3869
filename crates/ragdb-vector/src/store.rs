//! The namespaced vector store.
//!
//! Namespaces spring into being on first write via `resolve_or_create`;
//! queries against absent namespaces return empty results rather than
//! erroring. Upserts are keyed by chunk id (merge-insert), so re-ingesting
//! a document replaces its vectors instead of duplicating them.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use arrow_array::{
    Array, FixedSizeListArray, Float32Array, Int32Array, RecordBatch, RecordBatchIterator,
    StringArray, TimestampMillisecondArray,
};
use chrono::Utc;
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase, Select};
use lancedb::{connect, Connection, Table};

use ragdb_core::error::{Error, Result};
use ragdb_core::types::{Chunk, ChunkMetadata, DEFAULT_NAMESPACE};

use crate::schema::{build_namespace_schema, vector_dim};

fn index_err<E: std::fmt::Display>(e: E) -> Error {
    Error::Index(e.to_string())
}

fn escape(value: &str) -> String {
    value.replace('\'', "''")
}

pub struct NamespaceStore {
    conn: Connection,
}

impl NamespaceStore {
    pub async fn open(db_dir: &Path) -> Result<Self> {
        let conn = connect(db_dir.to_string_lossy().as_ref())
            .execute()
            .await
            .map_err(index_err)?;
        Ok(Self { conn })
    }

    /// Opens the namespace table, creating an empty one with the active
    /// dimension when it does not exist yet. Existing tables are checked
    /// against `dim` so vectors of mixed dimensionality never share a
    /// namespace.
    pub async fn resolve_or_create(&self, namespace: &str, dim: usize) -> Result<Table> {
        if self.namespace_exists(namespace).await? {
            let table = self
                .conn
                .open_table(namespace)
                .execute()
                .await
                .map_err(index_err)?;
            self.check_dimension(&table, dim).await?;
            return Ok(table);
        }
        let schema = build_namespace_schema(i32::try_from(dim).map_err(index_err)?);
        let batches: Vec<std::result::Result<RecordBatch, arrow_schema::ArrowError>> = Vec::new();
        let reader = Box::new(RecordBatchIterator::new(batches.into_iter(), schema));
        let table = self
            .conn
            .create_table(namespace, reader)
            .execute()
            .await
            .map_err(index_err)?;
        tracing::info!(namespace, dim, "created namespace table");
        Ok(table)
    }

    /// Stores or overwrites vectors keyed by chunk id. No-op on empty input.
    pub async fn upsert(
        &self,
        namespace: &str,
        chunks: &[Chunk],
        embeddings: &[Vec<f32>],
    ) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }
        if chunks.len() != embeddings.len() {
            return Err(Error::Index(format!(
                "chunk/embedding count mismatch: {} vs {}",
                chunks.len(),
                embeddings.len()
            )));
        }
        let dim = embeddings[0].len();
        for embedding in embeddings {
            if embedding.len() != dim {
                return Err(Error::Index(
                    "inconsistent embedding dimensions within one batch".to_string(),
                ));
            }
        }

        let table = self.resolve_or_create(namespace, dim).await?;
        let batch = chunks_to_record_batch(chunks, embeddings, dim)?;
        let schema = batch.schema();
        let reader = Box::new(RecordBatchIterator::new(vec![Ok(batch)].into_iter(), schema));

        let mut merge = table.merge_insert(&["id"]);
        merge.when_matched_update_all(None).when_not_matched_insert_all();
        let _ = merge.execute(reader).await.map_err(index_err)?;
        tracing::debug!(namespace, count = chunks.len(), "upserted chunks");
        Ok(())
    }

    /// Returns the `k` nearest chunks with their raw L2 distances, closest
    /// first. An absent or empty namespace yields an empty vec.
    pub async fn query(
        &self,
        namespace: &str,
        query_vector: &[f32],
        k: usize,
    ) -> Result<Vec<(Chunk, f32)>> {
        if k == 0 || !self.namespace_exists(namespace).await? {
            return Ok(Vec::new());
        }
        let table = self
            .conn
            .open_table(namespace)
            .execute()
            .await
            .map_err(index_err)?;
        self.check_dimension(&table, query_vector.len()).await?;

        let mut stream = table
            .vector_search(query_vector.to_vec())
            .map_err(index_err)?
            .limit(k)
            .execute()
            .await
            .map_err(index_err)?;

        let mut hits = Vec::new();
        while let Some(batch) = stream.try_next().await.map_err(index_err)? {
            for i in 0..batch.num_rows() {
                let metadata = ChunkMetadata {
                    doc_id: string_value(&batch, "doc_id", i)?,
                    filename: string_value(&batch, "filename", i)?,
                    namespace: string_value(&batch, "namespace", i)?,
                    session_id: optional_string_value(&batch, "session_id", i)?,
                    chunk_index: usize::try_from(int_value(&batch, "chunk_index", i)?)
                        .unwrap_or(0),
                };
                let chunk = Chunk {
                    id: string_value(&batch, "id", i)?,
                    text: string_value(&batch, "content", i)?,
                    metadata,
                };
                let distance = float_value(&batch, "_distance", i)?;
                hits.push((chunk, distance));
            }
        }
        Ok(hits)
    }

    /// Removes every chunk of `doc_id` from the namespace; returns the
    /// number removed. Absent documents and namespaces yield 0.
    pub async fn delete_document(&self, namespace: &str, doc_id: &str) -> Result<usize> {
        if !self.namespace_exists(namespace).await? {
            return Ok(0);
        }
        let table = self
            .conn
            .open_table(namespace)
            .execute()
            .await
            .map_err(index_err)?;
        let predicate = format!("doc_id = '{}'", escape(doc_id));
        let matched = table
            .count_rows(Some(predicate.clone()))
            .await
            .map_err(index_err)?;
        if matched > 0 {
            let _ = table.delete(&predicate).await.map_err(index_err)?;
            tracing::info!(namespace, doc_id, removed = matched, "deleted document");
        }
        Ok(matched)
    }

    /// Drops the whole namespace partition. Recreating the same name later
    /// starts empty. Absent namespaces are not an error.
    pub async fn delete_namespace(&self, namespace: &str) -> Result<()> {
        if self.namespace_exists(namespace).await? {
            self.conn.drop_table(namespace, &[]).await.map_err(index_err)?;
            tracing::info!(namespace, "dropped namespace");
        }
        Ok(())
    }

    /// Existing namespace tables, always including the default namespace.
    pub async fn list_namespaces(&self) -> Result<Vec<String>> {
        let mut names = self
            .conn
            .table_names()
            .execute()
            .await
            .map_err(index_err)?;
        if !names.iter().any(|n| n == DEFAULT_NAMESPACE) {
            names.push(DEFAULT_NAMESPACE.to_string());
        }
        names.sort();
        Ok(names)
    }

    /// Number of distinct documents stored in the namespace.
    pub async fn document_count(&self, namespace: &str) -> Result<usize> {
        if !self.namespace_exists(namespace).await? {
            return Ok(0);
        }
        let table = self
            .conn
            .open_table(namespace)
            .execute()
            .await
            .map_err(index_err)?;
        let mut stream = table
            .query()
            .select(Select::columns(&["doc_id"]))
            .execute()
            .await
            .map_err(index_err)?;
        let mut docs: HashSet<String> = HashSet::new();
        while let Some(batch) = stream.try_next().await.map_err(index_err)? {
            let col = string_col(&batch, "doc_id")?;
            for i in 0..batch.num_rows() {
                docs.insert(col.value(i).to_string());
            }
        }
        Ok(docs.len())
    }

    /// Total stored chunks in the namespace (0 when absent).
    pub async fn chunk_count(&self, namespace: &str) -> Result<usize> {
        if !self.namespace_exists(namespace).await? {
            return Ok(0);
        }
        let table = self
            .conn
            .open_table(namespace)
            .execute()
            .await
            .map_err(index_err)?;
        table.count_rows(None).await.map_err(index_err)
    }

    async fn namespace_exists(&self, namespace: &str) -> Result<bool> {
        let names = self
            .conn
            .table_names()
            .execute()
            .await
            .map_err(index_err)?;
        Ok(names.iter().any(|n| n == namespace))
    }

    async fn check_dimension(&self, table: &Table, expected: usize) -> Result<()> {
        let schema = table.schema().await.map_err(index_err)?;
        match vector_dim(&schema) {
            Some(found) if found != expected => {
                Err(Error::DimensionMismatch { expected, found })
            }
            _ => Ok(()),
        }
    }
}

fn chunks_to_record_batch(
    chunks: &[Chunk],
    embeddings: &[Vec<f32>],
    dim: usize,
) -> Result<RecordBatch> {
    let schema = build_namespace_schema(i32::try_from(dim).map_err(index_err)?);
    let now = Utc::now().timestamp_millis();

    let mut ids = Vec::with_capacity(chunks.len());
    let mut doc_ids = Vec::with_capacity(chunks.len());
    let mut filenames = Vec::with_capacity(chunks.len());
    let mut namespaces = Vec::with_capacity(chunks.len());
    let mut session_ids: Vec<Option<String>> = Vec::with_capacity(chunks.len());
    let mut chunk_indices = Vec::with_capacity(chunks.len());
    let mut contents = Vec::with_capacity(chunks.len());
    let mut ingested = Vec::with_capacity(chunks.len());
    let mut vectors: Vec<Option<Vec<Option<f32>>>> = Vec::with_capacity(chunks.len());

    for (chunk, embedding) in chunks.iter().zip(embeddings.iter()) {
        ids.push(chunk.id.clone());
        doc_ids.push(chunk.metadata.doc_id.clone());
        filenames.push(chunk.metadata.filename.clone());
        namespaces.push(chunk.metadata.namespace.clone());
        session_ids.push(chunk.metadata.session_id.clone());
        chunk_indices.push(i32::try_from(chunk.metadata.chunk_index).unwrap_or(i32::MAX));
        contents.push(chunk.text.clone());
        ingested.push(now);
        vectors.push(Some(embedding.iter().map(|&x| Some(x)).collect()));
    }

    RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from(ids)),
            Arc::new(StringArray::from(doc_ids)),
            Arc::new(StringArray::from(filenames)),
            Arc::new(StringArray::from(namespaces)),
            Arc::new(StringArray::from(session_ids)),
            Arc::new(Int32Array::from(chunk_indices)),
            Arc::new(StringArray::from(contents)),
            Arc::new(TimestampMillisecondArray::from(ingested)),
            Arc::new(FixedSizeListArray::from_iter_primitive::<
                arrow_array::types::Float32Type,
                _,
                _,
            >(
                vectors.into_iter(),
                i32::try_from(dim).map_err(index_err)?,
            )),
        ],
    )
    .map_err(index_err)
}

fn string_col<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| Error::Index(format!("missing column '{}'", name)))
}

fn string_value(batch: &RecordBatch, name: &str, row: usize) -> Result<String> {
    Ok(string_col(batch, name)?.value(row).to_string())
}

fn optional_string_value(batch: &RecordBatch, name: &str, row: usize) -> Result<Option<String>> {
    let col = string_col(batch, name)?;
    if col.is_null(row) {
        Ok(None)
    } else {
        Ok(Some(col.value(row).to_string()))
    }
}

fn int_value(batch: &RecordBatch, name: &str, row: usize) -> Result<i32> {
    let col = batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<Int32Array>())
        .ok_or_else(|| Error::Index(format!("missing column '{}'", name)))?;
    Ok(col.value(row))
}

fn float_value(batch: &RecordBatch, name: &str, row: usize) -> Result<f32> {
    let col = batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<Float32Array>())
        .ok_or_else(|| Error::Index(format!("missing column '{}'", name)))?;
    Ok(col.value(row))
}
