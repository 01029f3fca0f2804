//! In-memory Memory and Session backends.
//!
//! Reference implementations of the `strand-protocol` persistence
//! contracts: a `Vec` behind `tokio::sync::RwLock`. Suitable for tests,
//! demos, and single-process deployments; anything durable implements the
//! same traits against a real store.

#![deny(missing_docs)]

use async_trait::async_trait;
use strand_protocol::{Memory, MemoryError, MemoryMessage, Session};
use tokio::sync::RwLock;

/// Working memory held in process.
#[derive(Debug, Default)]
pub struct InMemoryMemory {
    messages: RwLock<Vec<MemoryMessage>>,
}

impl InMemoryMemory {
    /// An empty memory.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Memory for InMemoryMemory {
    async fn add(&self, message: MemoryMessage) -> Result<(), MemoryError> {
        self.messages.write().await.push(message);
        Ok(())
    }

    async fn get_context(&self) -> Result<Vec<MemoryMessage>, MemoryError> {
        Ok(self.messages.read().await.clone())
    }

    async fn clear(&self) -> Result<(), MemoryError> {
        self.messages.write().await.clear();
        Ok(())
    }
}

/// A session held in process. The write lock serializes same-session
/// access, which is the concurrency contract the engine relies on.
#[derive(Debug)]
pub struct InMemorySession {
    id: String,
    items: RwLock<Vec<MemoryMessage>>,
}

impl InMemorySession {
    /// An empty session with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            items: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Session for InMemorySession {
    fn session_id(&self) -> &str {
        &self.id
    }

    async fn item_count(&self) -> Result<usize, MemoryError> {
        Ok(self.items.read().await.len())
    }

    async fn get_items(&self, limit: Option<usize>) -> Result<Vec<MemoryMessage>, MemoryError> {
        let items = self.items.read().await;
        let start = limit.map_or(0, |n| items.len().saturating_sub(n));
        Ok(items[start..].to_vec())
    }

    async fn add_items(&self, new_items: Vec<MemoryMessage>) -> Result<(), MemoryError> {
        self.items.write().await.extend(new_items);
        Ok(())
    }

    async fn pop_item(&self) -> Result<Option<MemoryMessage>, MemoryError> {
        Ok(self.items.write().await.pop())
    }

    async fn clear_session(&self) -> Result<(), MemoryError> {
        self.items.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn memory_appends_and_clears() {
        let memory = InMemoryMemory::new();
        memory.add(MemoryMessage::user("one")).await.unwrap();
        memory.add(MemoryMessage::assistant("two")).await.unwrap();

        let context = memory.get_context().await.unwrap();
        assert_eq!(context.len(), 2);
        assert_eq!(context[0].content, "one");

        memory.clear().await.unwrap();
        assert!(memory.get_context().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn session_limit_returns_most_recent_in_order() {
        let session = InMemorySession::new("s1");
        session
            .add_items(vec![
                MemoryMessage::user("a"),
                MemoryMessage::assistant("b"),
                MemoryMessage::user("c"),
            ])
            .await
            .unwrap();

        let last_two = session.get_items(Some(2)).await.unwrap();
        assert_eq!(last_two.len(), 2);
        assert_eq!(last_two[0].content, "b");
        assert_eq!(last_two[1].content, "c");

        let all = session.get_items(None).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(session.item_count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn session_pop_and_clear() {
        let session = InMemorySession::new("s1");
        assert!(session.pop_item().await.unwrap().is_none());

        session
            .add_items(vec![MemoryMessage::user("a"), MemoryMessage::user("b")])
            .await
            .unwrap();
        let popped = session.pop_item().await.unwrap().unwrap();
        assert_eq!(popped.content, "b");

        session.clear_session().await.unwrap();
        assert_eq!(session.item_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn concurrent_writers_never_lose_items() {
        let session = Arc::new(InMemorySession::new("s1"));
        let mut handles = Vec::new();
        for i in 0..8 {
            let session = session.clone();
            handles.push(tokio::spawn(async move {
                session
                    .add_items(vec![MemoryMessage::user(format!("m{i}"))])
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(session.item_count().await.unwrap(), 8);
    }
}
