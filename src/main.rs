use std::sync::Arc;

use anyhow::Context;

use bookshelf_api::config;
use bookshelf_api::server::{self, AppState};
use bookshelf_api::session::JwtSessionResolver;
use bookshelf_api::store::PgBookStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SESSION_JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    tracing::info!("Starting Bookshelf API in {:?} mode", config.environment);

    let store = PgBookStore::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    store
        .ensure_schema()
        .await
        .context("failed to prepare database schema")?;

    let sessions = Arc::new(JwtSessionResolver::new(config.security.jwt_secret.clone()));
    let state = AppState::new(Arc::new(store), sessions);

    server::serve(state).await
}
