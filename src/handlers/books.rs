use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{Book, BookChanges, NewBook};
use crate::server::AppState;
use crate::session::Identity;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Substring matched against title or author, case-insensitively
    pub query: Option<String>,
}

/// GET /books - List the caller's books, optionally filtered by ?query=
pub async fn book_list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<Book>>, ApiError> {
    let books = state.books.list(&identity, params.query.as_deref()).await?;
    Ok(Json(books))
}

/// POST /books - Create a book owned by the caller
pub async fn book_create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<NewBook>,
) -> Result<impl IntoResponse, ApiError> {
    let book = state.books.create(&identity, payload).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// GET /books/:id - Fetch a single book by id
pub async fn book_get(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<Book>, ApiError> {
    let id = parse_book_id(&id)?;
    let book = state.books.get(&identity, id).await?;
    Ok(Json(book))
}

/// PUT /books/:id - Partially update a book (omitted fields are preserved)
pub async fn book_update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    Json(payload): Json<BookChanges>,
) -> Result<Json<Book>, ApiError> {
    let id = parse_book_id(&id)?;
    let book = state.books.update(&identity, id, payload).await?;
    Ok(Json(book))
}

/// DELETE /books/:id - Delete a book permanently
pub async fn book_delete(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_book_id(&id)?;
    state.books.delete(&identity, id).await?;
    Ok("Book deleted successfully")
}

fn parse_book_id(raw: &str) -> Result<Uuid, ApiError> {
    raw.parse().map_err(|_| ApiError::bad_request("Invalid book id"))
}
