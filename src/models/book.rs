use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A book row. Each book belongs to exactly one user; `user_id` is set from
/// the authenticated session at creation and never changes afterwards.
///
/// Wire format uses camelCase keys (`userId`, `createdAt`, `updatedAt`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create payload: all three fields are required and must be non-blank.
/// A field missing from the JSON body deserializes to an empty string and
/// is rejected by the same validation as an explicitly empty one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub genre: String,
}

/// Partial-update payload. An omitted field keeps its stored value; a field
/// that is present but blank is rejected, since a book can never hold an
/// empty title, author, or genre.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BookChanges {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
}

impl BookChanges {
    /// True when no field is supplied at all ("no update data").
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none() && self.genre.is_none()
    }

    /// First supplied-but-blank field name, if any.
    pub fn blank_field(&self) -> Option<&'static str> {
        match (&self.title, &self.author, &self.genre) {
            (Some(t), _, _) if t.trim().is_empty() => Some("title"),
            (_, Some(a), _) if a.trim().is_empty() => Some("author"),
            (_, _, Some(g)) if g.trim().is_empty() => Some("genre"),
            _ => None,
        }
    }
}
