mod article;
mod stats;

pub use article::{Article, ArticleFilter};
pub use stats::{SourceCount, Stats};
