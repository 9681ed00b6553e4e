//! Retrieval service.
//!
//! Thin pass-through over the store's similarity query that fixes the
//! default result count. Querying a collection with no entries yields an
//! empty result set, never an error.

use anyhow::Result;
use sqlx::SqlitePool;
use std::path::PathBuf;

use crate::config::Config;
use crate::db;
use crate::embedding::{self, EmbeddingProvider};
use crate::models::RetrievedChunk;
use crate::store;

/// Result count used when neither the caller nor the config overrides it.
pub const DEFAULT_TOP_K: usize = 5;

/// Retrieve the chunks most relevant to a question.
///
/// `k` falls back to the configured `retrieval.top_k`, which itself
/// defaults to [`DEFAULT_TOP_K`].
pub async fn retrieve_context(
    pool: &SqlitePool,
    provider: &dyn EmbeddingProvider,
    config: &Config,
    collection: &str,
    query: &str,
    k: Option<usize>,
) -> Result<Vec<RetrievedChunk>> {
    let k = k.unwrap_or(if config.retrieval.top_k > 0 {
        config.retrieval.top_k
    } else {
        DEFAULT_TOP_K
    });
    store::query_collection(pool, provider, &config.embedding, collection, query, k).await
}

/// CLI entry point — one-shot retrieval against a folder's collection.
pub async fn run_search(
    config: &Config,
    query: &str,
    path: Option<PathBuf>,
    top_k: Option<usize>,
) -> Result<()> {
    if query.trim().is_empty() {
        println!("No results.");
        return Ok(());
    }

    let root = path.unwrap_or_else(|| config.scanner.default_root.clone());
    let collection = store::collection_name_for_path(&root.display().to_string());

    let pool = db::open(config).await?;
    let provider = embedding::create_provider(&config.embedding)?;

    let results =
        retrieve_context(&pool, provider.as_ref(), config, &collection, query, top_k).await?;

    if results.is_empty() {
        println!("No results.");
        pool.close().await;
        return Ok(());
    }

    for (i, result) in results.iter().enumerate() {
        println!(
            "{}. [{:.3}] {} #{}",
            i + 1,
            result.score,
            result.source,
            result.index
        );
        let excerpt: String = result.content.replace('\n', " ");
        let excerpt: String = excerpt.chars().take(240).collect();
        println!("    excerpt: \"{}\"", excerpt.trim());
        println!();
    }

    pool.close().await;
    Ok(())
}
