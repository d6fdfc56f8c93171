//! Assistant channel: the chat transcript types, the prompt sent to the
//! language model, and parsing of its `{"response", "board"}` replies.
//!
//! The network call itself lives behind the [`Assistant`] trait; this crate
//! never talks to a model directly.

use crate::{
    domain::Board,
    error::{BoardError, Result},
};
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

const SYSTEM_PROMPT: &str = r#"You are a Kanban board assistant. Help the user understand and manage their board.

Always reply with valid JSON (no markdown, no code fences) in exactly this shape:
{"response": "<plain-text reply>", "board": null}

If the user asks you to change the board, include the complete updated board:
{"response": "<plain-text explanation>", "board": {"columns": [...], "cards": {...}}}

Rules:
- "response" is short, friendly plain text (no markdown).
- "board" is null unless you are making changes.
- When modifying, always return the COMPLETE board (every column and card, including unchanged ones).
- Never add, remove or reorder columns.
- Column shape: {"id": "...", "title": "...", "cardIds": [...]}
- Card shape:   {"id": "...", "title": "...", "details": "..."}
- Reuse existing IDs for existing items; create new IDs for new items (e.g. "card-abc123")."#;

/// Reply shown in the transcript when the assistant could not be reached
pub const FALLBACK_REPLY: &str = "Sorry, something went wrong. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One entry of the chat transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// What the assistant sent back: a reply and, optionally, a full replacement board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantReply {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub response: String,
    #[serde(default)]
    pub board: Option<Board>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl AssistantReply {
    pub fn text(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            board: None,
        }
    }

    pub fn with_board(response: impl Into<String>, board: Board) -> Self {
        Self {
            response: response.into(),
            board: Some(board),
        }
    }

    /// Parses the raw model output.
    ///
    /// A missing `response` becomes an empty string and `"board": null` means
    /// no change. A board that is present but misshapen is an error; whether
    /// a well-formed board is acceptable is decided by the session.
    pub fn from_json(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)?;
        if !value.is_object() {
            return Err(BoardError::AssistantError(format!(
                "expected a JSON object, got: {}",
                value
            )));
        }
        Ok(serde_json::from_value(value)?)
    }
}

/// Builds the message list for one assistant turn: system prompt with the
/// current board, the earlier transcript, then the new user message.
pub fn build_messages(
    board: &Board,
    message: &str,
    history: &[ChatMessage],
) -> Result<Vec<ChatMessage>> {
    let system = format!(
        "{}\n\nCurrent board:\n{}",
        SYSTEM_PROMPT,
        board.to_json_pretty()?
    );

    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(system));
    messages.extend(history.iter().cloned());
    messages.push(ChatMessage::user(message));
    Ok(messages)
}

/// A natural-language assistant able to answer questions about the board and
/// propose a replacement for it
#[async_trait]
pub trait Assistant: Send + Sync {
    async fn chat(
        &self,
        board: &Board,
        message: &str,
        history: &[ChatMessage],
    ) -> Result<AssistantReply>;
}
