pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;

use std::sync::Arc;

use axum::{routing::get, Router};
use db::DbPool;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub base_path: Arc<String>,
}

pub fn create_app(state: AppState) -> Router {
    let base_path = state.base_path.clone();

    let app_routes = Router::new()
        .route(
            "/todos",
            get(handlers::api::list_all_todos).post(handlers::api::create_new_todo),
        )
        .route(
            "/todos/{id}",
            get(handlers::api::get_single_todo)
                .put(handlers::api::update_existing_todo)
                .delete(handlers::api::delete_existing_todo),
        )
        .layer(
            tower::ServiceBuilder::new()
                .layer(tower_http::trace::TraceLayer::new_for_http())
                .layer(tower_http::compression::CompressionLayer::new()),
        )
        .with_state(state);

    tracing::info!("base_path: {base_path:?}");

    if base_path.is_empty() {
        app_routes
    } else {
        Router::new().nest(&*base_path, app_routes)
    }
}
