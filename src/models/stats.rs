use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceCount {
    pub source: Option<String>,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total_articles: i64,
    pub articles_by_source: Vec<SourceCount>,
    /// Most recent `scraped_at`, `None` on an empty table.
    pub last_updated: Option<String>,
    pub first_article: Option<String>,
}
