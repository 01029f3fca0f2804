//! The Memory and Session contracts — conversation history boundaries.
//!
//! Memory is the in-run working context; a Session is externally-owned,
//! persistent, per-conversation history with a stable identity. The engine
//! only consumes these contracts — persistence backends are pluggable.
//!
//! Concurrency contract: the engine calls a Session sequentially within
//! one run, but it does NOT serialize concurrent runs against the same
//! session id. Implementations must be safe for single-writer-at-a-time
//! access per id; how they achieve that is their business.

use crate::error::MemoryError;
use crate::value::SendableValue;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// The human.
    User,
    /// The agent.
    Assistant,
    /// System instructions.
    System,
    /// A tool result surfaced as conversation content.
    Tool,
}

/// One message in a conversation. Append-only within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryMessage {
    /// Who authored it.
    pub role: MessageRole,
    /// The message text.
    pub content: String,
    /// Unix timestamp in milliseconds.
    pub timestamp_ms: u64,
    /// Free-form metadata.
    #[serde(default)]
    pub metadata: BTreeMap<String, SendableValue>,
}

impl MemoryMessage {
    /// Create a message stamped with the current time.
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self {
            role,
            content: content.into(),
            timestamp_ms,
            metadata: BTreeMap::new(),
        }
    }

    /// A user message stamped now.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// An assistant message stamped now.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    /// A system message stamped now.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }
}

/// In-run working memory. Owned by the caller; the engine only appends
/// and reads.
#[async_trait]
pub trait Memory: Send + Sync {
    /// Append a message.
    async fn add(&self, message: MemoryMessage) -> Result<(), MemoryError>;

    /// The full working context, oldest first.
    async fn get_context(&self) -> Result<Vec<MemoryMessage>, MemoryError>;

    /// Drop everything.
    async fn clear(&self) -> Result<(), MemoryError>;
}

/// Externally-owned persistent conversation history.
#[async_trait]
pub trait Session: Send + Sync {
    /// Stable identity of this conversation.
    fn session_id(&self) -> &str;

    /// Number of stored items.
    async fn item_count(&self) -> Result<usize, MemoryError>;

    /// The most recent `limit` items in chronological order
    /// (None = everything).
    async fn get_items(&self, limit: Option<usize>) -> Result<Vec<MemoryMessage>, MemoryError>;

    /// Append items in order.
    async fn add_items(&self, items: Vec<MemoryMessage>) -> Result<(), MemoryError>;

    /// Remove and return the most recent item, if any.
    async fn pop_item(&self) -> Result<Option<MemoryMessage>, MemoryError>;

    /// Drop the whole history.
    async fn clear_session(&self) -> Result<(), MemoryError>;
}
