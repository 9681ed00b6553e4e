//! # askdocs CLI (`ask`)
//!
//! The `ask` binary is the interface to askdocs. It provides commands for
//! database initialization, folder indexing, one-shot retrieval, and the
//! interactive question-answering session.
//!
//! ## Usage
//!
//! ```bash
//! ask --config ./config/askdocs.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `ask init` | Create the SQLite database and run schema migrations |
//! | `ask index [PATH]` | Scan a folder and index its documents |
//! | `ask search "<query>"` | Print the chunks nearest to a query |
//! | `ask chat [PATH]` | Index a folder, then answer questions interactively |
//! | `ask collections` | List stored collections and their chunk counts |
//!
//! ## Examples
//!
//! ```bash
//! # Index the default folder (data)
//! ask index
//!
//! # Index a specific folder
//! ask index ./handbook
//!
//! # Inspect what retrieval would feed the model
//! ask search "vacation policy" --path ./handbook --top-k 3
//!
//! # Chat over the folder (requires an API key for the hosted model)
//! OPENAI_API_KEY=... ask chat ./handbook
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use askdocs::{chat, config, ingest, migrate, retrieve, store};

/// askdocs — ask questions about a folder of documents.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file; built-in defaults are used when the file is absent. See
/// `config/askdocs.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "ask",
    about = "askdocs — index a folder of documents and ask questions about it",
    version,
    long_about = "askdocs scans a folder for text-bearing files (txt, pdf, docx, odt), indexes \
    their content into a SQLite-backed vector store, and answers natural-language questions by \
    retrieving the most relevant chunks and forwarding them to a hosted language model."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/askdocs.toml`. Built-in defaults apply when
    /// the file does not exist.
    #[arg(long, global = true, default_value = "./config/askdocs.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and all required tables
    /// (collections, chunks, chunk_vectors). Idempotent — running it
    /// multiple times is safe, and the other commands run it implicitly.
    Init,

    /// Scan a folder and index its documents.
    ///
    /// Decodes every supported file (txt, pdf, docx, odt), chunks the
    /// text, and upserts chunks + embeddings into the folder's
    /// collection. Unsupported or unreadable files are skipped with a
    /// warning. Re-running against an unchanged folder is a no-op for
    /// the stored data.
    Index {
        /// Folder to index. Defaults to the configured folder (`data`).
        path: Option<PathBuf>,
    },

    /// Print the chunks nearest to a query.
    ///
    /// Embeds the query and ranks the folder's stored chunks by cosine
    /// similarity. Useful for inspecting what the chat command would
    /// feed the model.
    Search {
        /// The question or search phrase.
        query: String,

        /// Folder whose collection is queried. Defaults to the
        /// configured folder.
        #[arg(long)]
        path: Option<PathBuf>,

        /// Maximum number of results (default 5).
        #[arg(long)]
        top_k: Option<usize>,
    },

    /// Index a folder, then answer questions about it interactively.
    ///
    /// Reads one question per line; `exit` quits, `clear` resets the
    /// conversation history. Requires the language-model API key unless
    /// the `echo` provider is configured.
    Chat {
        /// Folder to chat about. Defaults to the configured folder.
        path: Option<PathBuf>,
    },

    /// List stored collections and their chunk counts.
    Collections,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Index { path } => {
            ingest::run_index(&cfg, path).await?;
        }
        Commands::Search {
            query,
            path,
            top_k,
        } => {
            retrieve::run_search(&cfg, &query, path, top_k).await?;
        }
        Commands::Chat { path } => {
            chat::run_chat(&cfg, path).await?;
        }
        Commands::Collections => {
            store::run_collections(&cfg).await?;
        }
    }

    Ok(())
}
