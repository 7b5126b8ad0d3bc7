use rusqlite::types::{Value, ValueRef};
use rusqlite::{params, params_from_iter, Row};
use tokio_rusqlite::Connection;

use crate::error::Result;
use crate::models::{Article, ArticleFilter, SourceCount, Stats};

use super::schema::ARTICLE_COLUMNS;

/// Read-only queries over the `news` table of one open snapshot.
pub struct NewsRepository {
    conn: Connection,
}

impl NewsRepository {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub async fn list_articles(&self, filter: ArticleFilter) -> Result<Vec<Article>> {
        let (sql, values) = list_query(&filter);
        let articles = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql)?;
                let articles = stmt
                    .query_map(params_from_iter(values), article_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(articles)
            })
            .await?;
        Ok(articles)
    }

    pub async fn latest_articles(&self, limit: u32) -> Result<Vec<Article>> {
        self.list_articles(ArticleFilter::new(limit, None, None)).await
    }

    pub async fn articles_by_source(&self, source: String, limit: u32) -> Result<Vec<Article>> {
        // Built directly: an empty name is still an exact-match filter here.
        let filter = ArticleFilter {
            limit,
            source: Some(source),
            search: None,
        };
        self.list_articles(filter).await
    }

    pub async fn sources(&self) -> Result<Vec<Option<String>>> {
        let sources = self
            .conn
            .call(|conn| {
                let mut stmt = conn.prepare("SELECT DISTINCT source FROM news ORDER BY source")?;
                let sources = stmt
                    .query_map([], |row| text_column(row, 0))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(sources)
            })
            .await?;
        Ok(sources)
    }

    pub async fn stats(&self) -> Result<Stats> {
        let stats = self
            .conn
            .call(|conn| {
                // One read transaction so the total and the per-source counts agree.
                let tx = conn.transaction()?;
                let total_articles: i64 =
                    tx.query_row("SELECT COUNT(*) FROM news", [], |row| row.get(0))?;
                let articles_by_source = {
                    let mut stmt = tx.prepare(
                        "SELECT source, COUNT(*) AS count FROM news GROUP BY source ORDER BY count DESC, source ASC",
                    )?;
                    let counts = stmt
                        .query_map([], |row| {
                            Ok(SourceCount {
                                source: text_column(row, 0)?,
                                count: row.get(1)?,
                            })
                        })?
                        .collect::<std::result::Result<Vec<_>, _>>()?;
                    counts
                };
                let (last_updated, first_article) = tx.query_row(
                    "SELECT MAX(scraped_at), MIN(scraped_at) FROM news",
                    params![],
                    |row| Ok((text_column(row, 0)?, text_column(row, 1)?)),
                )?;
                tx.commit()?;

                Ok(Stats {
                    total_articles,
                    articles_by_source,
                    last_updated,
                    first_article,
                })
            })
            .await?;
        Ok(stats)
    }

    pub async fn close(self) -> Result<()> {
        self.conn.close().await?;
        Ok(())
    }
}

fn list_query(filter: &ArticleFilter) -> (String, Vec<Value>) {
    let mut sql = format!("SELECT {ARTICLE_COLUMNS} FROM news WHERE 1=1");
    let mut values = Vec::new();

    if let Some(source) = &filter.source {
        sql.push_str(" AND source = ?");
        values.push(Value::Text(source.clone()));
    }

    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", escape_like(search));
        sql.push_str(" AND (title LIKE ? ESCAPE '\\' OR summary LIKE ? ESCAPE '\\')");
        values.push(Value::Text(pattern.clone()));
        values.push(Value::Text(pattern));
    }

    sql.push_str(" ORDER BY scraped_at DESC LIMIT ?");
    values.push(Value::Integer(i64::from(filter.limit)));

    (sql, values)
}

/// Make `%`, `_` and `\` match literally inside a `LIKE ... ESCAPE '\'` pattern.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Text columns the scraper may have left NULL or stored with another storage class.
fn text_column(row: &Row, idx: usize) -> rusqlite::Result<Option<String>> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => None,
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
    })
}

fn article_from_row(row: &Row) -> rusqlite::Result<Article> {
    Ok(Article {
        id: row.get(0)?,
        source: text_column(row, 1)?,
        title: text_column(row, 2)?,
        url: text_column(row, 3)?,
        summary: text_column(row, 4)?,
        image_url: text_column(row, 5)?,
        scraped_at: text_column(row, 6)?,
    })
}
