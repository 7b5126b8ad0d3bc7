mod cors;
mod handlers;
pub mod limits;
mod request_log;
mod response;

use axum::middleware;
use axum::routing::get;
use axum::Router;

use crate::services::NewsService;

#[derive(Clone)]
pub struct AppState {
    pub news: NewsService,
}

impl AppState {
    pub fn new(news: NewsService) -> Self {
        Self { news }
    }
}

/// `get` routes answer HEAD as well; the handlers short-circuit it.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/articles", get(handlers::list_articles))
        .route("/articles/latest", get(handlers::latest_articles))
        .route("/articles/sources", get(handlers::sources))
        .route("/articles/stats", get(handlers::stats))
        .route(
            "/articles/by-source/{source_name}",
            get(handlers::articles_by_source),
        )
        .layer(middleware::from_fn(cors::cors))
        .layer(middleware::from_fn(request_log::request_log))
        .with_state(state)
}
