use std::time::Duration;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::models::{Book, BookChanges};
use crate::store::{BookFilter, BookStore, StoreError};

/// Postgres-backed book store.
pub struct PgBookStore {
    pool: PgPool,
}

impl PgBookStore {
    /// Connect using `DATABASE_URL` with pool limits from configuration.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let url = std::env::var("DATABASE_URL")
            .map_err(|_| StoreError::ConfigMissing("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect(&url)
            .await?;

        info!("Created database pool ({} max connections)", config.max_connections);
        Ok(Self { pool })
    }

    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the books table and ownership index if they do not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS books (
                id UUID PRIMARY KEY,
                title TEXT NOT NULL,
                author TEXT NOT NULL,
                genre TEXT NOT NULL,
                user_id TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS books_user_id_idx ON books (user_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

/// Wrap `text` for a containment ILIKE match, escaping the pattern
/// metacharacters so user input matches literally.
fn like_pattern(text: &str) -> String {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl BookStore for PgBookStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Book>, StoreError> {
        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(book)
    }

    async fn find_many(&self, filter: &BookFilter) -> Result<Vec<Book>, StoreError> {
        let books = match filter {
            BookFilter::ByOwner { owner } => {
                sqlx::query_as::<_, Book>("SELECT * FROM books WHERE user_id = $1")
                    .bind(owner)
                    .fetch_all(&self.pool)
                    .await?
            }
            BookFilter::ByOwnerAndText { owner, text } => {
                sqlx::query_as::<_, Book>(
                    "SELECT * FROM books WHERE user_id = $1 AND (title ILIKE $2 OR author ILIKE $2)",
                )
                .bind(owner)
                .bind(like_pattern(text))
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(books)
    }

    async fn create(&self, book: Book) -> Result<Book, StoreError> {
        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (id, title, author, genre, user_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(book.id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.genre)
        .bind(&book.user_id)
        .bind(book.created_at)
        .bind(book.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update(&self, id: Uuid, owner: &str, changes: &BookChanges) -> Result<Option<Book>, StoreError> {
        // One statement filtered by id AND owner: the ownership check and
        // the write cannot be interleaved by a concurrent request.
        let updated = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = COALESCE($3, title),
                author = COALESCE($4, author),
                genre = COALESCE($5, genre),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(changes.title.as_deref())
        .bind(changes.author.as_deref())
        .bind(changes.genre.as_deref())
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn delete(&self, id: Uuid, owner: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn health(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
