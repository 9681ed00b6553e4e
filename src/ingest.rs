//! Build-phase orchestration.
//!
//! Coordinates the full indexing flow: scan → decode → chunk → upsert.
//! Files are processed sequentially, and chunks of a file are written in
//! ascending index order. One bad file never aborts the run: unsupported
//! extensions, extraction failures, and per-source storage failures are
//! warnings, and the run continues with the next file.

use anyhow::Result;
use std::path::PathBuf;

use crate::chunk;
use crate::config::Config;
use crate::db;
use crate::embedding;
use crate::extract::{self, DocumentFormat};
use crate::models::IndexSummary;
use crate::scan;
use crate::store;

/// Index a folder into its collection.
///
/// `root` falls back to the configured default folder when absent or not
/// a directory. An empty scan reports "no documents" and takes no
/// indexing action. Storage or embedding-provider initialization failures
/// are fatal for the run.
pub async fn run_index(config: &Config, root: Option<PathBuf>) -> Result<IndexSummary> {
    let mut root = root.unwrap_or_else(|| config.scanner.default_root.clone());
    if !root.is_dir() && root != config.scanner.default_root {
        println!(
            "Directory '{}' not found. Using default directory '{}' instead.",
            root.display(),
            config.scanner.default_root.display()
        );
        root = config.scanner.default_root.clone();
    }

    let files = scan::scan_folder(&root, &config.scanner);

    let mut summary = IndexSummary {
        files_found: files.len(),
        ..Default::default()
    };

    if files.is_empty() {
        println!("No documents found to index.");
        return Ok(summary);
    }

    let pool = db::open(config).await?;
    let provider = embedding::create_provider(&config.embedding)?;
    let collection = store::open_or_create_collection(&pool, &root.display().to_string()).await?;

    for file in &files {
        let source = file.display().to_string();

        let format = match DocumentFormat::from_path(file) {
            Some(format) => format,
            None => {
                eprintln!("Warning: file {} not supported. Skipping.", source);
                summary.files_skipped += 1;
                continue;
            }
        };

        let text = match extract::extract_file(file, format) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("Warning: could not read {}: {}. Skipping.", source, e);
                summary.files_skipped += 1;
                continue;
            }
        };

        let chunks = chunk::chunk_document(&text, &source, &config.chunking);
        if chunks.is_empty() {
            eprintln!("Warning: no text extracted from {}. Skipping.", source);
            summary.files_skipped += 1;
            continue;
        }

        match store::upsert_chunks(
            &pool,
            provider.as_ref(),
            &config.embedding,
            &collection,
            &source,
            &chunks,
        )
        .await
        {
            Ok(written) => {
                summary.files_indexed += 1;
                summary.chunks_written += written;
            }
            Err(e) => {
                eprintln!("Warning: error processing {}: {}. Skipping.", source, e);
                summary.files_skipped += 1;
            }
        }
    }

    // The file-listing chunk set lets the model answer questions like
    // "what files are available". Failing to write it is not fatal.
    let index_chunks = chunk::file_index_chunks(&files, &config.chunking);
    match store::upsert_chunks(
        &pool,
        provider.as_ref(),
        &config.embedding,
        &collection,
        chunk::FILE_INDEX_SOURCE,
        &index_chunks,
    )
    .await
    {
        Ok(written) => summary.chunks_written += written,
        Err(e) => eprintln!(
            "Warning: could not index file names: {}. Document content remains searchable.",
            e
        ),
    }

    println!("{}", chrono::Local::now().format("%b %d, %Y %H:%M:%S"));
    println!("index {}", root.display());
    println!("  files found: {}", summary.files_found);
    println!("  files indexed: {}", summary.files_indexed);
    println!("  files skipped: {}", summary.files_skipped);
    println!("  chunks written: {}", summary.chunks_written);
    println!("  collection: {}", collection);
    println!("ok");

    summary.collection = Some(collection);
    pool.close().await;
    Ok(summary)
}
