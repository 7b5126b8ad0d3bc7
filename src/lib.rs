pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod snapshot;

pub use api::{build_router, AppState};
pub use config::Config;
pub use error::{AppError, Result};
pub use services::NewsService;
pub use snapshot::{HttpSource, SnapshotCache, SnapshotSource};
