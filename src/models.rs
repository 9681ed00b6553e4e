//! Core data models used throughout askdocs.
//!
//! These types represent the chunks, retrieval results, and conversation
//! turns that flow through the indexing and question-answering pipeline.

/// A bounded window of a source document, the unit stored and retrieved.
///
/// `content` carries a leading `[Source: <path>]` annotation line so the
/// text remains self-describing once separated from its metadata.
/// Ordering within a source is significant: `index` is zero-based and
/// sequential.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub content: String,
    pub source: String,
    pub index: i64,
}

/// A chunk returned from a similarity query, with its cosine score.
#[derive(Debug, Clone)]
pub struct RetrievedChunk {
    pub content: String,
    pub source: String,
    pub index: i64,
    pub score: f64,
}

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Wire name used in chat-completions message payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One turn of the conversation history.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
}

/// Counters reported after a build-phase run.
#[derive(Debug, Clone, Default)]
pub struct IndexSummary {
    pub files_found: usize,
    pub files_indexed: usize,
    pub files_skipped: usize,
    pub chunks_written: u64,
    /// Collection the run wrote into; `None` when nothing was indexed.
    pub collection: Option<String>,
}
