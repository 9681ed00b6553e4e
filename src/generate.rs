//! Answer generation through a hosted chat-completions model.
//!
//! The core supplies the retrieved chunks and the ordered conversation
//! history in a stable structure; the model call itself is an external
//! collaborator. The client is a constructed service object passed
//! explicitly into [`generate_answer`] — there is no process-wide
//! singleton.
//!
//! Providers:
//! - **`openai`** — `POST /chat/completions` with the same retry/backoff
//!   taxonomy as the embeddings client (429/5xx retried, other 4xx fatal).
//! - **`echo`** — offline: returns the retrieved context verbatim. Used
//!   by the test suite and for smoke runs without credentials.

use anyhow::{bail, Context, Result};
use std::time::Duration;

use crate::config::LlmConfig;
use crate::models::{ChatTurn, RetrievedChunk};

/// Handle to the configured language-model service.
#[derive(Debug)]
pub struct LlmClient {
    config: LlmConfig,
    api_key: Option<String>,
}

impl LlmClient {
    /// Construct the client. A missing API credential for the hosted
    /// provider is a construction error — callers treat it as fatal
    /// rather than discovering it one request at a time.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = match config.provider.as_str() {
            "openai" => {
                let key = std::env::var(&config.api_key_env).map_err(|_| {
                    anyhow::anyhow!(
                        "{} not found. Set it in your environment to use the '{}' model.",
                        config.api_key_env,
                        config.model
                    )
                })?;
                Some(key)
            }
            "echo" => None,
            other => bail!("Unknown llm provider: {}", other),
        };

        Ok(Self {
            config: config.clone(),
            api_key,
        })
    }
}

/// Produce an answer for `question` from the retrieved context and the
/// ordered conversation history.
pub async fn generate_answer(
    client: &LlmClient,
    question: &str,
    context: &[RetrievedChunk],
    history: &[ChatTurn],
) -> Result<String> {
    match client.config.provider.as_str() {
        "echo" => Ok(echo_answer(context)),
        _ => generate_chat_completion(client, question, context, history).await,
    }
}

/// Offline answer: the retrieved chunks verbatim, in rank order.
fn echo_answer(context: &[RetrievedChunk]) -> String {
    if context.is_empty() {
        return "No relevant context was retrieved.".to_string();
    }
    context
        .iter()
        .map(|c| c.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Read the system-prompt resource. Its absence is a fatal condition for
/// the request (and, in the CLI, for the process).
fn read_system_prompt(config: &LlmConfig) -> Result<String> {
    std::fs::read_to_string(&config.system_prompt_path).with_context(|| {
        format!(
            "Required system prompt file missing: {}",
            config.system_prompt_path.display()
        )
    })
}

/// Render the retrieved chunks into the block handed to the model,
/// preserving rank order.
fn context_block(context: &[RetrievedChunk]) -> String {
    if context.is_empty() {
        return "No relevant document excerpts were found.".to_string();
    }

    let mut out = String::from("Relevant excerpts from the indexed documents:\n");
    for chunk in context {
        out.push_str("\n---\n");
        out.push_str(&chunk.content);
        out.push('\n');
    }
    out
}

async fn generate_chat_completion(
    client: &LlmClient,
    question: &str,
    context: &[RetrievedChunk],
    history: &[ChatTurn],
) -> Result<String> {
    let config = &client.config;
    let system_prompt = read_system_prompt(config)?;
    let api_key = client
        .api_key
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("{} not set", config.api_key_env))?;

    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(serde_json::json!({
        "role": "system",
        "content": format!("{}\n\n{}", system_prompt.trim_end(), context_block(context)),
    }));
    for turn in history {
        messages.push(serde_json::json!({
            "role": turn.role.as_str(),
            "content": turn.text,
        }));
    }
    messages.push(serde_json::json!({
        "role": "user",
        "content": question,
    }));

    let body = serde_json::json!({
        "model": config.model,
        "temperature": config.temperature,
        "messages": messages,
    });

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;

    let mut last_err = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let delay = Duration::from_secs(1 << (attempt - 1).min(5));
            tokio::time::sleep(delay).await;
        }

        let resp = http
            .post(format!("{}/chat/completions", config.url))
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await;

        match resp {
            Ok(response) => {
                let status = response.status();

                if status.is_success() {
                    let json: serde_json::Value = response.json().await?;
                    return parse_chat_response(&json);
                }

                if status.as_u16() == 429 || status.is_server_error() {
                    let body_text = response.text().await.unwrap_or_default();
                    last_err = Some(anyhow::anyhow!(
                        "Chat API error {}: {}",
                        status,
                        body_text
                    ));
                    continue;
                }

                let body_text = response.text().await.unwrap_or_default();
                bail!("Chat API error {}: {}", status, body_text);
            }
            Err(e) => {
                last_err = Some(e.into());
                continue;
            }
        }
    }

    Err(last_err.unwrap_or_else(|| anyhow::anyhow!("Generation failed after retries")))
}

fn parse_chat_response(json: &serde_json::Value) -> Result<String> {
    json.get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|t| t.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| anyhow::anyhow!("Invalid chat response: missing choices[0].message.content"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use std::path::PathBuf;

    fn retrieved(content: &str) -> RetrievedChunk {
        RetrievedChunk {
            content: content.to_string(),
            source: "a.txt".to_string(),
            index: 0,
            score: 1.0,
        }
    }

    #[test]
    fn echo_provider_needs_no_credentials() {
        let config = LlmConfig {
            provider: "echo".to_string(),
            ..Default::default()
        };
        assert!(LlmClient::new(&config).is_ok());
    }

    #[test]
    fn hosted_provider_without_key_fails_at_construction() {
        let config = LlmConfig {
            provider: "openai".to_string(),
            api_key_env: "ASKDOCS_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..Default::default()
        };
        let err = LlmClient::new(&config).unwrap_err();
        assert!(err.to_string().contains("ASKDOCS_TEST_KEY_THAT_IS_NEVER_SET"));
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let config = LlmConfig {
            provider: "gemini".to_string(),
            ..Default::default()
        };
        assert!(LlmClient::new(&config).is_err());
    }

    #[tokio::test]
    async fn echo_answer_contains_retrieved_text() {
        let config = LlmConfig {
            provider: "echo".to_string(),
            ..Default::default()
        };
        let client = LlmClient::new(&config).unwrap();

        let context = vec![retrieved("Paris is the capital of France.")];
        let history = vec![ChatTurn {
            role: Role::User,
            text: "earlier question".to_string(),
        }];

        let answer = generate_answer(&client, "What is the capital of France?", &context, &history)
            .await
            .unwrap();
        assert!(answer.contains("Paris"));
    }

    #[tokio::test]
    async fn echo_answer_for_no_context_is_explicit() {
        let config = LlmConfig {
            provider: "echo".to_string(),
            ..Default::default()
        };
        let client = LlmClient::new(&config).unwrap();

        let answer = generate_answer(&client, "anything", &[], &[]).await.unwrap();
        assert!(answer.contains("No relevant context"));
    }

    #[test]
    fn context_block_preserves_rank_order() {
        let block = context_block(&[retrieved("first hit"), retrieved("second hit")]);
        let first = block.find("first hit").unwrap();
        let second = block.find("second hit").unwrap();
        assert!(first < second);
    }

    #[test]
    fn missing_system_prompt_is_an_error() {
        let config = LlmConfig {
            system_prompt_path: PathBuf::from("/no/such/prompts/system.txt"),
            ..Default::default()
        };
        let err = read_system_prompt(&config).unwrap_err();
        assert!(err.to_string().contains("system prompt"));
    }

    #[test]
    fn chat_response_parsing() {
        let json = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "The capital is Paris."}}]
        });
        assert_eq!(parse_chat_response(&json).unwrap(), "The capital is Paris.");

        let bad = serde_json::json!({"choices": []});
        assert!(parse_chat_response(&bad).is_err());
    }
}
