pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Book, BookChanges};

pub use memory::MemoryBookStore;
pub use postgres::PgBookStore;

/// Errors from book store backends
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Closed set of query shapes the store accepts. Keeping this a tagged enum
/// (rather than an open filter object) means callers cannot smuggle
/// unintended filter keys into the data layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookFilter {
    /// All books belonging to one user.
    ByOwner { owner: String },
    /// Books belonging to one user whose title OR author contains `text`,
    /// case-insensitively.
    ByOwnerAndText { owner: String, text: String },
}

impl BookFilter {
    /// Build the filter for an owner's list request; a present, non-empty
    /// query narrows the result to matching titles/authors.
    pub fn for_owner(owner: impl Into<String>, query: Option<&str>) -> Self {
        match query {
            Some(q) if !q.is_empty() => BookFilter::ByOwnerAndText {
                owner: owner.into(),
                text: q.to_string(),
            },
            _ => BookFilter::ByOwner { owner: owner.into() },
        }
    }

    pub fn owner(&self) -> &str {
        match self {
            BookFilter::ByOwner { owner } => owner,
            BookFilter::ByOwnerAndText { owner, .. } => owner,
        }
    }
}

/// Durable table of book records keyed by id with a secondary `user_id`
/// attribute. The service depends only on these operations' semantics, not
/// on any backend's storage format.
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Book>, StoreError>;

    /// No explicit ordering is applied.
    async fn find_many(&self, filter: &BookFilter) -> Result<Vec<Book>, StoreError>;

    async fn create(&self, book: Book) -> Result<Book, StoreError>;

    /// Single conditional mutation: only the row matching BOTH `id` and
    /// `owner` is touched, so there is no window between an ownership check
    /// and the write. Fields absent from `changes` keep their stored value.
    /// Returns the updated row, or `None` when no row matched.
    async fn update(&self, id: Uuid, owner: &str, changes: &BookChanges) -> Result<Option<Book>, StoreError>;

    /// Conditional delete, same matching rule as [`BookStore::update`].
    /// Returns whether a row was removed.
    async fn delete(&self, id: Uuid, owner: &str) -> Result<bool, StoreError>;

    /// Connectivity probe for the health endpoint.
    async fn health(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
