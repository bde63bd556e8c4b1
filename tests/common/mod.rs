use std::sync::Arc;

use anyhow::{Context, Result};

use bookshelf_api::config::SecurityConfig;
use bookshelf_api::server::{app, AppState};
use bookshelf_api::session::{issue_token, JwtSessionResolver};
use bookshelf_api::store::MemoryBookStore;

pub const TEST_SECRET: &str = "bookshelf-test-secret";

pub struct TestServer {
    pub base_url: String,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Boot the app in-process on an ephemeral port with a fresh in-memory
/// store, so every test starts from empty state and needs no database.
pub async fn spawn_server() -> Result<TestServer> {
    let store = Arc::new(MemoryBookStore::new());
    let sessions = Arc::new(JwtSessionResolver::new(TEST_SECRET));
    let state = AppState::new(store, sessions);

    let security = SecurityConfig {
        jwt_secret: TEST_SECRET.to_string(),
        jwt_expiry_hours: 1,
        enable_cors: false,
        cors_origins: vec![],
    };

    let router = app(state, &security);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("failed to bind test listener")?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server");
    });

    Ok(TestServer {
        base_url: format!("http://{}", addr),
    })
}

/// Mint a session token for a user, as the external session provider would.
pub fn token_for(user_id: &str) -> String {
    issue_token(TEST_SECRET, user_id, 1).expect("failed to mint test token")
}
