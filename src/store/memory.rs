use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Book, BookChanges};
use crate::store::{BookFilter, BookStore, StoreError};

/// In-memory book store backing the test suite and local development.
/// Implements the same conditional-mutation semantics as the Postgres
/// backend: update and delete only touch a row matching both id and owner.
#[derive(Default)]
pub struct MemoryBookStore {
    rows: RwLock<HashMap<Uuid, Book>>,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches(book: &Book, filter: &BookFilter) -> bool {
    match filter {
        BookFilter::ByOwner { owner } => book.user_id == *owner,
        BookFilter::ByOwnerAndText { owner, text } => {
            let needle = text.to_lowercase();
            book.user_id == *owner
                && (book.title.to_lowercase().contains(&needle)
                    || book.author.to_lowercase().contains(&needle))
        }
    }
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Book>, StoreError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn find_many(&self, filter: &BookFilter) -> Result<Vec<Book>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows.values().filter(|b| matches(b, filter)).cloned().collect())
    }

    async fn create(&self, book: Book) -> Result<Book, StoreError> {
        let mut rows = self.rows.write().await;
        rows.insert(book.id, book.clone());
        Ok(book)
    }

    async fn update(&self, id: Uuid, owner: &str, changes: &BookChanges) -> Result<Option<Book>, StoreError> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&id) {
            Some(book) if book.user_id == owner => {
                if let Some(title) = &changes.title {
                    book.title = title.clone();
                }
                if let Some(author) = &changes.author {
                    book.author = author.clone();
                }
                if let Some(genre) = &changes.genre {
                    book.genre = genre.clone();
                }
                book.updated_at = Utc::now();
                Ok(Some(book.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid, owner: &str) -> Result<bool, StoreError> {
        let mut rows = self.rows.write().await;
        match rows.get(&id) {
            Some(book) if book.user_id == owner => {
                rows.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
