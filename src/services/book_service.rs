use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::models::{Book, BookChanges, NewBook};
use crate::session::Identity;
use crate::store::{BookFilter, BookStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum BookAccessError {
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    #[error("book not found")]
    NotFound,
    #[error("book belongs to another user")]
    Forbidden,
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Mediates every read and write of book records, enforcing the ownership
/// contract: a book is visible, mutable, or deletable only to the identity
/// recorded in its `user_id`. Ownership is re-derived from the stored row on
/// every access - never cached, never trusted from the client.
///
/// Callers always pass the authenticated [`Identity`] explicitly; an
/// `Identity` value only exists once the session resolver has accepted the
/// request, so the unauthenticated case is handled before the service is
/// reached.
#[derive(Clone)]
pub struct BookService {
    store: Arc<dyn BookStore>,
}

impl BookService {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }

    /// List the caller's books, optionally narrowed to those whose title or
    /// author contains `query` (case-insensitive). Ordering is unspecified.
    pub async fn list(&self, identity: &Identity, query: Option<&str>) -> Result<Vec<Book>, BookAccessError> {
        let filter = BookFilter::for_owner(&identity.user_id, query);
        Ok(self.store.find_many(&filter).await?)
    }

    /// Create a book owned by the caller. All three fields must be non-blank.
    pub async fn create(&self, identity: &Identity, new_book: NewBook) -> Result<Book, BookAccessError> {
        if new_book.title.trim().is_empty()
            || new_book.author.trim().is_empty()
            || new_book.genre.trim().is_empty()
        {
            return Err(BookAccessError::InvalidInput("title, author and genre are required"));
        }

        let now = Utc::now();
        let book = Book {
            id: Uuid::new_v4(),
            title: new_book.title,
            author: new_book.author,
            genre: new_book.genre,
            user_id: identity.user_id.clone(),
            created_at: now,
            updated_at: now,
        };

        let created = self.store.create(book).await?;
        tracing::info!(book_id = %created.id, "book created");
        Ok(created)
    }

    /// Fetch one book. Existence is checked before ownership, so an absent
    /// id and a foreign id fail differently here; the HTTP boundary
    /// collapses both to the same response.
    pub async fn get(&self, identity: &Identity, id: Uuid) -> Result<Book, BookAccessError> {
        let book = self.store.find_by_id(id).await?.ok_or(BookAccessError::NotFound)?;

        if book.user_id != identity.user_id {
            return Err(BookAccessError::Forbidden);
        }

        Ok(book)
    }

    /// Partially update one of the caller's books. Omitted fields keep
    /// their stored value; a field present but blank is rejected, since
    /// no book field may be empty.
    pub async fn update(
        &self,
        identity: &Identity,
        id: Uuid,
        changes: BookChanges,
    ) -> Result<Book, BookAccessError> {
        if changes.is_empty() {
            return Err(BookAccessError::InvalidInput("no update data"));
        }
        if changes.blank_field().is_some() {
            return Err(BookAccessError::InvalidInput("fields cannot be set to an empty value"));
        }

        // The store applies one mutation conditional on id AND owner; when
        // nothing matched, a follow-up read only classifies the failure.
        match self.store.update(id, &identity.user_id, &changes).await? {
            Some(book) => Ok(book),
            None => Err(self.classify_miss(id).await?),
        }
    }

    /// Delete one of the caller's books permanently.
    pub async fn delete(&self, identity: &Identity, id: Uuid) -> Result<(), BookAccessError> {
        if self.store.delete(id, &identity.user_id).await? {
            tracing::info!(book_id = %id, "book deleted");
            Ok(())
        } else {
            Err(self.classify_miss(id).await?)
        }
    }

    /// A conditional mutation matched nothing: decide whether the row is
    /// absent or owned by someone else. Advisory only - the mutation has
    /// already (not) happened.
    async fn classify_miss(&self, id: Uuid) -> Result<BookAccessError, StoreError> {
        Ok(match self.store.find_by_id(id).await? {
            Some(_) => BookAccessError::Forbidden,
            None => BookAccessError::NotFound,
        })
    }
}
