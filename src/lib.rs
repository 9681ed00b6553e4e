//! # askdocs
//!
//! Folder-scoped document question answering.
//!
//! askdocs scans a folder for text-bearing files (plain text, PDF, DOCX,
//! ODT), splits their content into overlapping chunks, stores the chunks
//! with embeddings in a SQLite-backed vector index, and answers
//! natural-language questions by retrieving the most relevant chunks and
//! forwarding them — together with the conversation history — to a hosted
//! language model.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌──────────┐   ┌───────────┐
//! │ Scanner  │──▶│ Decoder  │──▶│ Chunker  │──▶│  SQLite    │
//! │ walkdir  │   │ pdf/docx │   │ windows  │   │ vectors   │
//! └──────────┘   └──────────┘   └──────────┘   └─────┬─────┘
//!                                                    │
//!                             question ──▶ retrieve ─┤
//!                                                    ▼
//!                                              ┌──────────┐
//!                                              │   LLM    │
//!                                              └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! ask index ./docs              # scan, decode, chunk, embed, store
//! ask search "deployment"      # one-shot retrieval with scores
//! ask chat ./docs               # interactive Q&A over the folder
//! ask collections               # list stored collections
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`scan`] | Recursive filesystem scanner |
//! | [`extract`] | Multi-format text extraction |
//! | [`sanitize`] | Storage-safe name sanitization |
//! | [`chunk`] | Overlapping-window text chunking |
//! | [`store`] | Folder-scoped chunk store with vector queries |
//! | [`embedding`] | Embedding provider abstraction |
//! | [`retrieve`] | Retrieval service |
//! | [`generate`] | Answer generation via a hosted model |
//! | [`ingest`] | Build-phase orchestration |
//! | [`chat`] | Interactive session loop |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod chat;
pub mod chunk;
pub mod config;
pub mod db;
pub mod embedding;
pub mod extract;
pub mod generate;
pub mod ingest;
pub mod migrate;
pub mod models;
pub mod retrieve;
pub mod sanitize;
pub mod scan;
pub mod store;
