#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use news_snapshot_api::db::NEWS_SCHEMA;
use news_snapshot_api::{build_router, AppError, AppState, NewsService, SnapshotCache, SnapshotSource};
use rusqlite::{params, Connection};
use tokio::net::TcpListener;

pub struct Row {
    pub source: &'static str,
    pub title: &'static str,
    pub summary: &'static str,
    pub scraped_at: &'static str,
}

pub const ROWS: &[Row] = &[
    Row { source: "BBC News", title: "Rates held steady", summary: "The central bank kept rates unchanged", scraped_at: "2026-03-01 09:00:00" },
    Row { source: "BBC News", title: "Storm warning issued", summary: "Heavy rain expected overnight", scraped_at: "2026-03-04 06:15:00" },
    Row { source: "Reuters", title: "Markets rally", summary: "Stocks climb after rate decision", scraped_at: "2026-03-02 14:30:00" },
    Row { source: "Reuters", title: "Oil prices slip", summary: "", scraped_at: "2026-03-03 11:00:00" },
    Row { source: "Reuters", title: "Chip exports grow", summary: "Semiconductor shipments up", scraped_at: "2026-02-27 08:00:00" },
    Row { source: "AP", title: "Election night", summary: "Polls close across the country", scraped_at: "2026-03-05 22:00:00" },
];

/// Bytes of a SQLite database holding `rows` in the `news` table.
pub fn fixture_db(rows: &[Row]) -> Vec<u8> {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("fixture.db");
    write_fixture(&path, rows);
    std::fs::read(&path).expect("read fixture bytes")
}

pub fn write_fixture(path: &Path, rows: &[Row]) {
    let conn = Connection::open(path).expect("open sqlite");
    conn.execute_batch(NEWS_SCHEMA).expect("create schema");
    for (i, row) in rows.iter().enumerate() {
        conn.execute(
            "INSERT INTO news (source, title, url, summary, image_url, scraped_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                row.source,
                row.title,
                format!("https://news.test/articles/{i}"),
                row.summary,
                format!("https://news.test/img/{i}.jpg"),
                row.scraped_at
            ],
        )
        .expect("insert row");
    }
}

/// Upstream stand-in: serves `payload` when set, fails otherwise.
pub struct FakeSource {
    pub payload: Mutex<Option<Vec<u8>>>,
    pub calls: AtomicU64,
    pub delay: Duration,
}

impl FakeSource {
    pub fn serving(payload: Vec<u8>) -> Arc<Self> {
        Arc::new(Self {
            payload: Mutex::new(Some(payload)),
            calls: AtomicU64::new(0),
            delay: Duration::ZERO,
        })
    }

    pub fn offline() -> Arc<Self> {
        Arc::new(Self {
            payload: Mutex::new(None),
            calls: AtomicU64::new(0),
            delay: Duration::ZERO,
        })
    }

    pub fn slow(payload: Vec<u8>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            payload: Mutex::new(Some(payload)),
            calls: AtomicU64::new(0),
            delay,
        })
    }

    pub fn slow_offline(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            payload: Mutex::new(None),
            calls: AtomicU64::new(0),
            delay,
        })
    }

    pub fn set_payload(&self, payload: Option<Vec<u8>>) {
        *self.payload.lock().expect("payload lock") = payload;
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotSource for FakeSource {
    fn describe(&self) -> String {
        "fake".to_string()
    }

    async fn fetch(&self) -> news_snapshot_api::Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.payload
            .lock()
            .expect("payload lock")
            .clone()
            .ok_or_else(|| AppError::Upstream("connection refused".to_string()))
    }
}

pub fn cache(path: &Path, freshness: Duration, source: Arc<FakeSource>) -> Arc<SnapshotCache> {
    Arc::new(SnapshotCache::new(path, freshness, source))
}

/// Serve the API on an ephemeral port and return its base URL.
pub async fn spawn_app(cache: Arc<SnapshotCache>) -> String {
    let app = build_router(AppState::new(NewsService::new(cache)));
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve app");
    });
    format!("http://{addr}")
}
