//! Storage backends for bookmarks.
//!
//! `BookmarkStore` is the one seam the handlers know about. The service
//! picks an implementation at startup: the sqlite-backed `Database` or the
//! in-memory store below, which exists for demos and tests and holds its
//! state per instance.

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::model::{Bookmark, NewBookmark};

#[async_trait]
pub trait BookmarkStore: Send + Sync {
    /// All bookmarks in insertion order.
    async fn list(&self) -> Result<Vec<Bookmark>>;
    async fn get(&self, id: &str) -> Result<Option<Bookmark>>;
    /// Persist a validated bookmark. The store assigns the id.
    async fn insert(&self, bookmark: NewBookmark) -> Result<Bookmark>;
    /// Returns true when a record was actually removed.
    async fn delete(&self, id: &str) -> Result<bool>;
}

#[derive(Default)]
pub struct MemoryStore {
    bookmarks: Mutex<Vec<Bookmark>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookmarkStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Bookmark>> {
        Ok(self.bookmarks.lock().await.clone())
    }

    async fn get(&self, id: &str) -> Result<Option<Bookmark>> {
        let bookmarks = self.bookmarks.lock().await;
        Ok(bookmarks.iter().find(|b| b.id == id).cloned())
    }

    async fn insert(&self, bookmark: NewBookmark) -> Result<Bookmark> {
        let record = Bookmark {
            id: Uuid::new_v4().to_string(),
            title: bookmark.title,
            url: bookmark.url,
            description: bookmark.description,
            rating: bookmark.rating,
        };
        self.bookmarks.lock().await.push(record.clone());
        Ok(record)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut bookmarks = self.bookmarks.lock().await;
        let before = bookmarks.len();
        bookmarks.retain(|b| b.id != id);
        Ok(bookmarks.len() < before)
    }
}
