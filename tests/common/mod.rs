#![allow(dead_code)]

use std::sync::Arc;

use reqwest::Client;
use tokio::net::TcpListener;

use taskboard::{create_app, db, AppState};

pub struct TestServer {
    pub addr: String,
    pub base_path: String,
    pub client: Client,
}

impl TestServer {
    pub async fn new() -> Self {
        Self::with_base_path("").await
    }

    pub async fn with_base_path(base_path: &str) -> Self {
        let db = db::init_in_memory().expect("Failed to create in-memory database");
        let state = AppState {
            db,
            base_path: Arc::new(base_path.to_string()),
        };
        let app = create_app(state);

        // Bind to random available port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = format!("http://{}", listener.local_addr().unwrap());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        TestServer {
            addr,
            base_path: base_path.to_string(),
            client: Client::new(),
        }
    }

    /// Root the client cache points at.
    pub fn api_url(&self) -> String {
        format!("{}{}", self.addr, self.base_path)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url(), path)
    }
}
