mod repository;
mod schema;

pub use repository::NewsRepository;
pub use schema::{ARTICLE_COLUMNS, NEWS_SCHEMA, SQLITE_HEADER};
