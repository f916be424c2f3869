use ragdb_core::error::Error;
use ragdb_core::types::{Chunk, ChunkMetadata, DEFAULT_NAMESPACE};
use ragdb_vector::NamespaceStore;

const DIM: usize = 8;

fn chunk(namespace: &str, doc_id: &str, index: usize, text: &str) -> Chunk {
    Chunk::new(
        text,
        ChunkMetadata {
            doc_id: doc_id.to_string(),
            filename: format!("{doc_id}.txt"),
            namespace: namespace.to_string(),
            session_id: None,
            chunk_index: index,
        },
    )
}

/// A unit vector with all weight on one axis, so L2 distances are exact
/// and ranking is predictable.
fn axis_vector(axis: usize) -> Vec<f32> {
    let mut v = vec![0f32; DIM];
    v[axis % DIM] = 1.0;
    v
}

#[tokio::test]
async fn upsert_then_query_ranks_by_distance() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let store = NamespaceStore::open(tmp.path()).await?;

    let chunks = vec![
        chunk("notes", "doc-a", 0, "first passage with enough text to matter"),
        chunk("notes", "doc-a", 1, "second passage with enough text to matter"),
        chunk("notes", "doc-a", 2, "third passage with enough text to matter"),
    ];
    let embeddings = vec![axis_vector(0), axis_vector(1), axis_vector(2)];
    store.upsert("notes", &chunks, &embeddings).await?;

    let hits = store.query("notes", &axis_vector(1), 2).await?;
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].0.id, "doc-a-1", "exact match must rank first");
    assert!(hits[0].1.abs() < 1e-6, "exact match has zero distance");
    assert!(hits[0].1 <= hits[1].1, "distances must ascend");
    assert_eq!(hits[0].0.metadata.filename, "doc-a.txt");
    Ok(())
}

#[tokio::test]
async fn reingesting_same_ids_overwrites_instead_of_duplicating() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let store = NamespaceStore::open(tmp.path()).await?;

    let chunks = vec![
        chunk("notes", "doc-a", 0, "original text of the first chunk here"),
        chunk("notes", "doc-a", 1, "original text of the second chunk here"),
    ];
    let embeddings = vec![axis_vector(0), axis_vector(1)];
    store.upsert("notes", &chunks, &embeddings).await?;
    store.upsert("notes", &chunks, &embeddings).await?;

    assert_eq!(store.chunk_count("notes").await?, 2, "no duplicate rows");
    assert_eq!(store.document_count("notes").await?, 1);
    Ok(())
}

#[tokio::test]
async fn namespaces_are_isolated() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let store = NamespaceStore::open(tmp.path()).await?;

    let a = vec![chunk("tenant-a", "doc-a", 0, "alpha content stored under tenant a")];
    let b = vec![chunk("tenant-b", "doc-b", 0, "beta content stored under tenant b")];
    store.upsert("tenant-a", &a, &[axis_vector(0)]).await?;
    store.upsert("tenant-b", &b, &[axis_vector(0)]).await?;

    let hits = store.query("tenant-a", &axis_vector(0), 10).await?;
    assert_eq!(hits.len(), 1);
    for (hit, _) in &hits {
        assert_eq!(hit.metadata.namespace, "tenant-a");
        assert_ne!(hit.metadata.doc_id, "doc-b");
    }
    Ok(())
}

#[tokio::test]
async fn query_on_absent_namespace_returns_empty() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let store = NamespaceStore::open(tmp.path()).await?;
    let hits = store.query("ghost", &axis_vector(0), 5).await?;
    assert!(hits.is_empty());
    Ok(())
}

#[tokio::test]
async fn delete_document_removes_exactly_that_document() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let store = NamespaceStore::open(tmp.path()).await?;

    let chunks = vec![
        chunk("notes", "doc-a", 0, "doc a chunk zero with plenty of text"),
        chunk("notes", "doc-a", 1, "doc a chunk one with plenty of text"),
        chunk("notes", "doc-b", 0, "doc b chunk zero with plenty of text"),
    ];
    let embeddings = vec![axis_vector(0), axis_vector(1), axis_vector(2)];
    store.upsert("notes", &chunks, &embeddings).await?;

    let removed = store.delete_document("notes", "doc-a").await?;
    assert_eq!(removed, 2);

    let hits = store.query("notes", &axis_vector(2), 10).await?;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].0.metadata.doc_id, "doc-b");
    assert!(hits[0].1.abs() < 1e-6, "surviving document's distance is unchanged");

    // Absent doc id: 0, nothing mutated.
    assert_eq!(store.delete_document("notes", "doc-missing").await?, 0);
    assert_eq!(store.chunk_count("notes").await?, 1);
    // Absent namespace: also 0.
    assert_eq!(store.delete_document("ghost", "doc-a").await?, 0);
    Ok(())
}

#[tokio::test]
async fn delete_namespace_then_recreate_starts_empty() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let store = NamespaceStore::open(tmp.path()).await?;

    let chunks = vec![chunk("scratch", "doc-a", 0, "content that will be destroyed soon")];
    store.upsert("scratch", &chunks, &[axis_vector(0)]).await?;
    assert!(store.list_namespaces().await?.contains(&"scratch".to_string()));

    store.delete_namespace("scratch").await?;
    assert!(!store.list_namespaces().await?.contains(&"scratch".to_string()));
    assert_eq!(store.chunk_count("scratch").await?, 0);

    // Deleting again is not an error.
    store.delete_namespace("scratch").await?;

    // Recreation starts empty.
    let fresh = vec![chunk("scratch", "doc-b", 0, "fresh content after the namespace reset")];
    store.upsert("scratch", &fresh, &[axis_vector(3)]).await?;
    assert_eq!(store.chunk_count("scratch").await?, 1);
    Ok(())
}

#[tokio::test]
async fn default_namespace_is_always_listed() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let store = NamespaceStore::open(tmp.path()).await?;
    let names = store.list_namespaces().await?;
    assert!(names.contains(&DEFAULT_NAMESPACE.to_string()));
    assert_eq!(store.document_count(DEFAULT_NAMESPACE).await?, 0);
    Ok(())
}

#[tokio::test]
async fn mismatched_dimensions_are_rejected() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let store = NamespaceStore::open(tmp.path()).await?;

    let chunks = vec![chunk("notes", "doc-a", 0, "content stored with the original model")];
    store.upsert("notes", &chunks, &[axis_vector(0)]).await?;

    // Query with a vector from a different-dimension model.
    let err = store
        .query("notes", &vec![1.0f32; DIM * 2], 5)
        .await
        .expect_err("must reject");
    assert!(
        matches!(err, Error::DimensionMismatch { expected, found } if expected == DIM * 2 && found == DIM),
        "wrong error: {err:?}"
    );

    // Upsert with a different dimension into the same namespace.
    let more = vec![chunk("notes", "doc-b", 0, "content embedded by the replacement model")];
    let err = store
        .upsert("notes", &more, &[vec![1.0f32; DIM * 2]])
        .await
        .expect_err("must reject");
    assert!(matches!(err, Error::DimensionMismatch { .. }), "wrong error: {err:?}");
    Ok(())
}

#[tokio::test]
async fn upsert_empty_batch_is_a_noop() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let store = NamespaceStore::open(tmp.path()).await?;
    store.upsert("notes", &[], &[]).await?;
    assert_eq!(store.chunk_count("notes").await?, 0);
    // The namespace was not even created by the no-op.
    assert!(!store.list_namespaces().await?.contains(&"notes".to_string()));
    Ok(())
}

#[tokio::test]
async fn store_persists_across_reopen() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    {
        let store = NamespaceStore::open(tmp.path()).await?;
        let chunks = vec![chunk("notes", "doc-a", 0, "durable content written before reopen")];
        store.upsert("notes", &chunks, &[axis_vector(0)]).await?;
    }
    let reopened = NamespaceStore::open(tmp.path()).await?;
    let hits = reopened.query("notes", &axis_vector(0), 5).await?;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].0.id, "doc-a-0");
    Ok(())
}
