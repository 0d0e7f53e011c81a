//! Chat data model — messages, sessions, and history projections.
//!
//! DESIGN
//! ======
//! Messages are immutable once appended; a session's `Vec<Message>` is
//! append-only and its insertion order is the display order. Sessions are
//! keyed by UUID and the sidebar sees only `HistoryEntry` projections,
//! never the message lists themselves.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Maximum characters of the first user message used for a session title.
pub const TITLE_MAX_CHARS: usize = 30;

/// Maximum characters of the last message shown as a sidebar preview.
pub const PREVIEW_MAX_CHARS: usize = 60;

pub type SessionId = Uuid;

// =============================================================================
// MESSAGE
// =============================================================================

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

/// A column of a tabular payload. `key` indexes into row objects,
/// `label` is the human-facing header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableColumn {
    pub key: String,
    pub label: String,
}

/// Tabular rows attached to a bot reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TablePayload {
    pub columns: Vec<TableColumn>,
    pub rows: Vec<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSeries {
    pub name: String,
    pub points: Vec<f64>,
}

/// Chart definition attached to a bot reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartPayload {
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub series: Vec<ChartSeries>,
}

/// Metadata for a file attached to a user submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentMeta {
    pub filename: String,
    pub media_type: String,
    pub size_bytes: u64,
}

/// Structured payload carried alongside message text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Payload {
    Table(TablePayload),
    Chart(ChartPayload),
    Attachment(AttachmentMeta),
}

/// One chat message. Immutable after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,
}

impl Message {
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>, payload: Option<Payload>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: OffsetDateTime::now_utc(),
            payload,
        }
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// One chat thread with its own ordered message history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    /// Set once from the first user message; changed only by explicit rename.
    pub title: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_activity: OffsetDateTime,
    pub messages: Vec<Message>,
}

impl Session {
    #[must_use]
    pub fn history_entry(&self) -> HistoryEntry {
        HistoryEntry {
            id: self.id,
            title: self.title.clone(),
            date: self.last_activity,
            message_count: self.messages.len(),
            last_message: self.messages.last().map(|m| truncate_chars(&m.content, PREVIEW_MAX_CHARS)),
        }
    }
}

/// Sidebar projection of a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: SessionId,
    pub title: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub message_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message: Option<String>,
}

// =============================================================================
// TITLES
// =============================================================================

/// Derive a session title from the first user message: the first
/// `TITLE_MAX_CHARS` characters, with `...` appended only when truncated.
#[must_use]
pub fn derive_title(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= TITLE_MAX_CHARS {
        trimmed.to_string()
    } else {
        let mut title: String = trimmed.chars().take(TITLE_MAX_CHARS).collect();
        title.push_str("...");
        title
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(max).collect();
        out.push_str("...");
        out
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
