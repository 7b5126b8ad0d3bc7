use serde::Serialize;

/// One row of the externally produced `news` table, passed through as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    pub id: i64,
    pub source: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub summary: Option<String>,
    pub image_url: Option<String>,
    pub scraped_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ArticleFilter {
    pub limit: u32,
    pub source: Option<String>,
    pub search: Option<String>,
}

impl ArticleFilter {
    /// Empty `source`/`search` values mean "no filter".
    pub fn new(limit: u32, source: Option<String>, search: Option<String>) -> Self {
        Self {
            limit,
            source: source.filter(|s| !s.is_empty()),
            search: search.filter(|s| !s.is_empty()),
        }
    }
}
