//! End-to-end tests for the user directory.
//!
//! Each test starts the real application on an ephemeral port, backed by a
//! private in-memory `SQLite` database, and talks to it over HTTP.
//!
//! ```bash
//! cargo test -p user-directory-integration-tests
//! ```

use std::net::SocketAddr;

use reqwest::Client;
use secrecy::SecretString;
use tokio::net::TcpListener;

use user_directory_server::{AppState, app, db};

/// A running server and a client pointed at it.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
}

impl TestContext {
    /// Start a fresh server. It lives until the test's runtime shuts down.
    ///
    /// # Panics
    ///
    /// Panics if the database, schema, or listener cannot be set up.
    pub async fn new() -> Self {
        let pool = db::create_pool(&SecretString::from("sqlite::memory:"))
            .await
            .expect("Failed to create in-memory pool");
        db::run_migrations(&pool)
            .await
            .expect("Failed to apply schema");

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");

        tokio::spawn(async move { axum::serve(listener, app(AppState::new(pool))).await });

        Self {
            client: Client::new(),
            base_url: format!("http://{addr}"),
        }
    }

    /// Absolute URL for a path on the test server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}
