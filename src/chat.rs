//! Interactive question-answering session.
//!
//! Runs the build phase, then loops: read a question, retrieve the
//! nearest chunks, forward them with the conversation history to the
//! answer generator, print the answer. The sentinel `exit`
//! (case-insensitive) ends the session; `clear` resets the history.
//!
//! Error policy follows the taxonomy of the rest of the crate: a failed
//! retrieval is recoverable (the user can retry on the next prompt); a
//! failed generation call terminates the process with a descriptive
//! message and non-zero status.

use anyhow::Result;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::config::Config;
use crate::db;
use crate::embedding;
use crate::generate::{self, LlmClient};
use crate::ingest;
use crate::models::{ChatTurn, Role};
use crate::retrieve;

/// Conversation state for one session: the ordered history handed to the
/// generator. Created at session start, cleared on the `clear` action,
/// never persisted.
#[derive(Debug, Default)]
pub struct ChatSession {
    turns: Vec<ChatTurn>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    /// Append a question/answer pair, preserving order.
    pub fn record(&mut self, question: &str, answer: &str) {
        self.turns.push(ChatTurn {
            role: Role::User,
            text: question.to_string(),
        });
        self.turns.push(ChatTurn {
            role: Role::Assistant,
            text: answer.to_string(),
        });
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

/// CLI entry point — index the folder, then answer questions until `exit`.
pub async fn run_chat(config: &Config, root: Option<PathBuf>) -> Result<()> {
    let summary = ingest::run_index(config, root).await?;
    let collection = match summary.collection {
        Some(name) => name,
        // Nothing was indexed; run_index already reported why.
        None => return Ok(()),
    };

    // A misconfigured generator (e.g. missing API key) should surface
    // before the first question, not after it.
    let client = LlmClient::new(&config.llm)?;
    let provider = embedding::create_provider(&config.embedding)?;
    let pool = db::open(config).await?;

    let mut session = ChatSession::new();
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    println!("Type a question, 'clear' to reset history, or 'exit' to quit.");

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let line = match lines.next() {
            Some(Ok(line)) => line,
            // EOF or unreadable stdin ends the session
            _ => break,
        };
        let input = line.trim();

        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("exit") {
            break;
        }
        if input.eq_ignore_ascii_case("clear") {
            session.clear();
            println!("History cleared.");
            continue;
        }

        let context = match retrieve::retrieve_context(
            &pool,
            provider.as_ref(),
            config,
            &collection,
            input,
            None,
        )
        .await
        {
            Ok(context) => context,
            Err(e) => {
                eprintln!("Error searching documents: {}. Please try again.", e);
                continue;
            }
        };

        let answer =
            match generate::generate_answer(&client, input, &context, session.turns()).await {
                Ok(answer) => answer,
                Err(e) => {
                    eprintln!("Error calling the language model: {}", e);
                    eprintln!("This may be due to:");
                    eprintln!("- A missing or invalid API key");
                    eprintln!("- Network connection issues");
                    eprintln!("- API rate limits");
                    pool.close().await;
                    std::process::exit(1);
                }
            };

        println!("{}", answer);
        session.record(input, &answer);
    }

    pool.close().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_records_turns_in_order() {
        let mut session = ChatSession::new();
        session.record("first question", "first answer");
        session.record("second question", "second answer");

        let turns = session.turns();
        assert_eq!(turns.len(), 4);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[0].text, "first question");
        assert_eq!(turns[1].role, Role::Assistant);
        assert_eq!(turns[1].text, "first answer");
        assert_eq!(turns[2].text, "second question");
        assert_eq!(turns[3].text, "second answer");
    }

    #[test]
    fn clear_resets_the_session() {
        let mut session = ChatSession::new();
        session.record("question", "answer");
        assert!(!session.turns().is_empty());

        session.clear();
        assert!(session.turns().is_empty());
    }
}
