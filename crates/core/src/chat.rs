use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::language::Language;

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single entry in the conversation transcript. The transcript is
/// append-only and owned by the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// Resolved generation language, set on assistant messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            language: None,
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>, language: Language) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            language: Some(language),
            timestamp: Utc::now(),
        }
    }
}

/// The most recent task/solution pair in a transcript: the last user
/// message and the last assistant message, found by reverse scan per role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange<'a> {
    pub task: &'a str,
    pub solution: &'a str,
}

/// Resolve the latest user/assistant exchange from a transcript.
///
/// Returns `None` unless both a user message and an assistant message
/// exist. The two halves need not be adjacent.
pub fn latest_exchange(messages: &[Message]) -> Option<Exchange<'_>> {
    let task = messages
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.as_str())?;
    let solution = messages
        .iter()
        .rev()
        .find(|m| m.role == Role::Assistant)
        .map(|m| m.content.as_str())?;

    Some(Exchange { task, solution })
}

/// Strip a surrounding markdown code fence from generated code.
///
/// The backend may return code wrapped in a ```` ```lang ```` fence.
/// Removes the opening fence line and the closing fence; anything without
/// a leading fence passes through untouched.
pub fn clean_code(code: &str) -> String {
    let trimmed = code.trim();

    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }

    // Drop the first line (```language) and a trailing fence.
    let mut body = match trimmed.split_once('\n') {
        Some((_, rest)) => rest,
        None => return String::new(),
    };

    if let Some(stripped) = body.strip_suffix("```") {
        body = stripped;
    }

    body.trim().to_string()
}
