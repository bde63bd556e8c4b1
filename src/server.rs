use std::sync::Arc;

use anyhow::Context;
use axum::http::HeaderValue;
use axum::{middleware, routing::get, Router};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{self, SecurityConfig};
use crate::handlers;
use crate::services::BookService;
use crate::session::SessionResolver;
use crate::store::BookStore;

/// Shared application state: the book service plus the injected session
/// resolver. Both collaborators are trait objects so tests can swap in an
/// in-memory store or a resolver with a known secret.
#[derive(Clone)]
pub struct AppState {
    pub books: BookService,
    pub store: Arc<dyn BookStore>,
    pub sessions: Arc<dyn SessionResolver>,
}

impl AppState {
    pub fn new(store: Arc<dyn BookStore>, sessions: Arc<dyn SessionResolver>) -> Self {
        Self {
            books: BookService::new(store.clone()),
            store,
            sessions,
        }
    }
}

/// Assemble the application router: public routes, session-guarded book
/// routes, and the global CORS/trace layers.
pub fn app(state: AppState, security: &SecurityConfig) -> Router {
    let book_routes = Router::new()
        .route(
            "/books",
            get(handlers::books::book_list).post(handlers::books::book_create),
        )
        .route(
            "/books/:id",
            get(handlers::books::book_get)
                .put(handlers::books::book_update)
                .delete(handlers::books::book_delete),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::session_middleware,
        ));

    Router::new()
        // Public
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        // Session-guarded book API
        .merge(book_routes)
        .fallback(handlers::fallback)
        // Global middleware
        .layer(cors_layer(security))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        // Default layer emits no CORS headers at all
        return CorsLayer::new();
    }

    if security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Bind and serve until shutdown. Port comes from `BOOKSHELF_PORT` or
/// `PORT`, defaulting to 3000.
pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let app = app(state, &config::config().security);

    let port = std::env::var("BOOKSHELF_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    println!("🚀 Bookshelf API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server error")
}
