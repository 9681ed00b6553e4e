//! Folder-scoped chunk store with vector similarity queries.
//!
//! One collection per indexed root folder, named after the sanitized
//! path plus a short path-hash suffix. Chunk identifiers are derived from
//! `(collection, source, index)`, so re-indexing the same content upserts
//! in place instead of growing the store. Embeddings are recomputed only
//! when a chunk's text hash changes.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use sqlx::{Row, SqlitePool};

use crate::config::{Config, EmbeddingConfig};
use crate::db;
use crate::embedding::{self, EmbeddingProvider};
use crate::models::{Chunk, RetrievedChunk};
use crate::sanitize::sanitize_name;

/// A stored collection with its chunk count, for the listing surface.
#[derive(Debug, Clone)]
pub struct CollectionInfo {
    pub name: String,
    pub root_path: String,
    pub chunks: i64,
}

/// Derive the collection name for an indexed root folder.
///
/// The sanitized path alone can collide (`my docs` and `my_docs` both
/// sanitize to `my_docs`), so the first 8 hex chars of the path's SHA-256
/// are appended to keep unrelated folders apart.
pub fn collection_name_for_path(path: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    let base = sanitize_name(path);
    if base.is_empty() {
        format!("collection_{}", &digest[..8])
    } else {
        format!("{}_{}", base, &digest[..8])
    }
}

/// Open or create the collection for a root folder. Idempotent: the same
/// path always maps to the same single collection row.
pub async fn open_or_create_collection(pool: &SqlitePool, root_path: &str) -> Result<String> {
    let name = collection_name_for_path(root_path);
    let now = chrono::Utc::now().timestamp();

    sqlx::query("INSERT OR IGNORE INTO collections (name, root_path, created_at) VALUES (?, ?, ?)")
        .bind(&name)
        .bind(root_path)
        .bind(now)
        .execute(pool)
        .await
        .context("Failed to set up the document storage collection")?;

    Ok(name)
}

/// Deterministic chunk identifier. Same (collection, source, index) →
/// same id on every run, which is what makes re-indexing duplicate-free.
fn chunk_id(collection: &str, source: &str, index: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(collection.as_bytes());
    hasher.update(b":");
    hasher.update(source.as_bytes());
    hasher.update(b":");
    hasher.update(index.to_le_bytes());
    format!("{:x}", hasher.finalize())
}

fn hash_text(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Upsert one source's chunks into a collection.
///
/// Chunk rows are replaced transactionally (trailing rows from a shrunk
/// file are deleted), then embeddings are computed in batches for chunks
/// whose text actually changed. Chunks are written in ascending index
/// order. Returns the number of chunk rows written.
///
/// An embedding or storage failure makes the whole call fail; the caller
/// skips the document and continues with the next one.
pub async fn upsert_chunks(
    pool: &SqlitePool,
    provider: &dyn EmbeddingProvider,
    embed_cfg: &EmbeddingConfig,
    collection: &str,
    source: &str,
    chunks: &[Chunk],
) -> Result<u64> {
    if chunks.is_empty() {
        return Ok(0);
    }

    let mut tx = pool.begin().await?;

    // Ids are index-derived, so rows at indices past the new chunk count
    // are exactly the stale ones.
    let new_len = chunks.len() as i64;
    sqlx::query(
        "DELETE FROM chunk_vectors WHERE chunk_id IN \
         (SELECT id FROM chunks WHERE collection = ? AND source = ? AND chunk_index >= ?)",
    )
    .bind(collection)
    .bind(source)
    .bind(new_len)
    .execute(&mut *tx)
    .await?;
    sqlx::query("DELETE FROM chunks WHERE collection = ? AND source = ? AND chunk_index >= ?")
        .bind(collection)
        .bind(source)
        .bind(new_len)
        .execute(&mut *tx)
        .await?;

    for chunk in chunks {
        let id = chunk_id(collection, &chunk.source, chunk.index);
        sqlx::query(
            r#"
            INSERT INTO chunks (id, collection, source, chunk_index, content, hash)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                content = excluded.content,
                hash = excluded.hash
            "#,
        )
        .bind(&id)
        .bind(collection)
        .bind(&chunk.source)
        .bind(chunk.index)
        .bind(&chunk.content)
        .bind(hash_text(&chunk.content))
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    // Embed only chunks whose stored vector is missing or stale
    let model_name = provider.model_name().to_string();
    let mut need_embedding: Vec<(&Chunk, String, String)> = Vec::new();
    for chunk in chunks {
        let id = chunk_id(collection, &chunk.source, chunk.index);
        let text_hash = hash_text(&chunk.content);

        let existing: Option<(String, String)> = sqlx::query_as(
            "SELECT hash, model FROM chunk_vectors WHERE chunk_id = ?",
        )
        .bind(&id)
        .fetch_optional(pool)
        .await?;

        match existing {
            Some((hash, model)) if hash == text_hash && model == model_name => {}
            _ => need_embedding.push((chunk, id, text_hash)),
        }
    }

    for batch in need_embedding.chunks(embed_cfg.batch_size.max(1)) {
        let texts: Vec<String> = batch.iter().map(|(c, _, _)| c.content.clone()).collect();
        let vectors = embedding::embed_texts(provider, embed_cfg, &texts).await?;

        for ((_, id, text_hash), vec) in batch.iter().zip(vectors.iter()) {
            let blob = embedding::vec_to_blob(vec);
            sqlx::query(
                r#"
                INSERT INTO chunk_vectors (chunk_id, collection, model, dims, hash, embedding)
                VALUES (?, ?, ?, ?, ?, ?)
                ON CONFLICT(chunk_id) DO UPDATE SET
                    collection = excluded.collection,
                    model = excluded.model,
                    dims = excluded.dims,
                    hash = excluded.hash,
                    embedding = excluded.embedding
                "#,
            )
            .bind(id)
            .bind(collection)
            .bind(&model_name)
            .bind(provider.dims() as i64)
            .bind(text_hash)
            .bind(blob)
            .execute(pool)
            .await?;
        }
    }

    Ok(chunks.len() as u64)
}

/// Return the `k` chunks nearest to `query_text` by cosine similarity.
///
/// An empty collection yields an empty result, not an error (the query
/// text is not even embedded in that case).
pub async fn query_collection(
    pool: &SqlitePool,
    provider: &dyn EmbeddingProvider,
    embed_cfg: &EmbeddingConfig,
    collection: &str,
    query_text: &str,
    k: usize,
) -> Result<Vec<RetrievedChunk>> {
    if k == 0 {
        return Ok(Vec::new());
    }

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chunk_vectors WHERE collection = ?")
        .bind(collection)
        .fetch_one(pool)
        .await?;
    if count == 0 {
        return Ok(Vec::new());
    }

    let query_vec = embedding::embed_query(provider, embed_cfg, query_text).await?;

    // Load the collection's vectors and rank in-process
    let rows = sqlx::query(
        r#"
        SELECT cv.embedding, c.content, c.source, c.chunk_index
        FROM chunk_vectors cv
        JOIN chunks c ON c.id = cv.chunk_id
        WHERE cv.collection = ?
        "#,
    )
    .bind(collection)
    .fetch_all(pool)
    .await?;

    let mut results: Vec<RetrievedChunk> = rows
        .iter()
        .map(|row| {
            let blob: Vec<u8> = row.get("embedding");
            let vec = embedding::blob_to_vec(&blob);
            RetrievedChunk {
                content: row.get("content"),
                source: row.get("source"),
                index: row.get("chunk_index"),
                score: embedding::cosine_similarity(&query_vec, &vec) as f64,
            }
        })
        .collect();

    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    results.truncate(k);

    Ok(results)
}

/// List stored collections with their chunk counts.
pub async fn list_collections(pool: &SqlitePool) -> Result<Vec<CollectionInfo>> {
    let rows = sqlx::query(
        r#"
        SELECT col.name, col.root_path, COUNT(c.id) AS chunk_count
        FROM collections col
        LEFT JOIN chunks c ON c.collection = col.name
        GROUP BY col.name
        ORDER BY col.name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| CollectionInfo {
            name: row.get("name"),
            root_path: row.get("root_path"),
            chunks: row.get("chunk_count"),
        })
        .collect())
}

/// CLI entry point — list stored collections.
pub async fn run_collections(config: &Config) -> Result<()> {
    let pool = db::open(config).await?;
    let collections = list_collections(&pool).await?;

    if collections.is_empty() {
        println!("No collections.");
    } else {
        println!("{:<52} {:>8}  ROOT", "COLLECTION", "CHUNKS");
        for c in &collections {
            println!("{:<52} {:>8}  {}", c.name, c.chunks, c.root_path);
        }
    }

    pool.close().await;
    Ok(())
}
