/// Layout of the `news` table as written by the external scraper.
///
/// This service never creates the table in production; the constant is the
/// reference the queries are written against and is used to build fixtures.
pub const NEWS_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS news (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source TEXT NOT NULL,
    title TEXT NOT NULL,
    url TEXT NOT NULL UNIQUE,
    summary TEXT,
    image_url TEXT,
    scraped_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_news_source ON news(source);
CREATE INDEX IF NOT EXISTS idx_news_scraped_at ON news(scraped_at DESC);
"#;

pub const ARTICLE_COLUMNS: &str = "id, source, title, url, summary, image_url, scraped_at";

/// First 16 bytes of every SQLite 3 database file.
pub const SQLITE_HEADER: &[u8; 16] = b"SQLite format 3\0";
