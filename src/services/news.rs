use std::sync::Arc;

use tracing::instrument;

use crate::db::NewsRepository;
use crate::error::{AppError, Result};
use crate::models::{Article, ArticleFilter, Stats};
use crate::snapshot::SnapshotCache;

/// Article queries, each run against a freshly acquired snapshot handle.
#[derive(Clone)]
pub struct NewsService {
    cache: Arc<SnapshotCache>,
}

impl NewsService {
    pub fn new(cache: Arc<SnapshotCache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    async fn repository(&self) -> Result<NewsRepository> {
        Ok(NewsRepository::new(self.cache.acquire().await?))
    }

    #[instrument(skip(self))]
    pub async fn list_articles(&self, filter: ArticleFilter) -> Result<Vec<Article>> {
        let repo = self.repository().await?;
        let articles = repo.list_articles(filter).await?;
        repo.close().await?;
        Ok(articles)
    }

    #[instrument(skip(self))]
    pub async fn latest_articles(&self, limit: u32) -> Result<Vec<Article>> {
        let repo = self.repository().await?;
        let articles = repo.latest_articles(limit).await?;
        repo.close().await?;
        Ok(articles)
    }

    #[instrument(skip(self))]
    pub async fn sources(&self) -> Result<Vec<Option<String>>> {
        let repo = self.repository().await?;
        let sources = repo.sources().await?;
        repo.close().await?;
        Ok(sources)
    }

    #[instrument(skip(self))]
    pub async fn stats(&self) -> Result<Stats> {
        let repo = self.repository().await?;
        let stats = repo.stats().await?;
        repo.close().await?;
        Ok(stats)
    }

    /// Fails with [`AppError::SourceNotFound`] rather than returning an empty list.
    #[instrument(skip(self))]
    pub async fn articles_by_source(&self, source: &str, limit: u32) -> Result<Vec<Article>> {
        let repo = self.repository().await?;
        let articles = repo.articles_by_source(source.to_string(), limit).await?;
        repo.close().await?;

        if articles.is_empty() {
            return Err(AppError::SourceNotFound(source.to_string()));
        }
        Ok(articles)
    }
}
