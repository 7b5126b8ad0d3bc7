use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, Result};
use crate::models::ArticleFilter;

use super::limits::Endpoint;
use super::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
    pub source: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitParams {
    pub limit: Option<i64>,
}

fn query_params<T>(params: std::result::Result<Query<T>, QueryRejection>) -> Result<T> {
    params
        .map(|Query(p)| p)
        .map_err(|e| AppError::Validation(e.body_text()))
}

/// HEAD requests stop after validation: no snapshot access, no body.
/// So HEAD on `/articles/by-source/{name}` is 200 even for a source with no
/// articles, where GET would answer 404.
fn head_only(method: &Method) -> Option<Response> {
    (method == Method::HEAD).then(|| StatusCode::OK.into_response())
}

pub async fn root(method: Method, State(state): State<AppState>) -> Response {
    if let Some(response) = head_only(&method) {
        return response;
    }

    Json(json!({
        "message": "News Snapshot API - Live news from multiple sources",
        "version": env!("CARGO_PKG_VERSION"),
        "cache_duration": format!("{} seconds", state.news.cache().freshness().as_secs()),
        "endpoints": {
            "/articles": "Get all articles with filters",
            "/articles/latest": "Get latest articles",
            "/articles/sources": "Get list of sources",
            "/articles/stats": "Get statistics",
            "/articles/by-source/{source_name}": "Get articles from one source",
            "/health": "Health check",
        }
    }))
    .into_response()
}

pub async fn health(method: Method) -> Response {
    if let Some(response) = head_only(&method) {
        return response;
    }
    Json(json!({"status": "healthy"})).into_response()
}

pub async fn list_articles(
    method: Method,
    State(state): State<AppState>,
    params: std::result::Result<Query<ListParams>, QueryRejection>,
) -> Result<Response> {
    let params = query_params(params)?;
    let limit = Endpoint::Articles.resolve_limit(params.limit)?;
    if let Some(response) = head_only(&method) {
        return Ok(response);
    }

    let filter = ArticleFilter::new(limit, params.source, params.search);
    let articles = state.news.list_articles(filter.clone()).await?;

    Ok(Json(json!({
        "total": articles.len(),
        "filters": filter,
        "articles": articles,
    }))
    .into_response())
}

pub async fn latest_articles(
    method: Method,
    State(state): State<AppState>,
    params: std::result::Result<Query<LimitParams>, QueryRejection>,
) -> Result<Response> {
    let params = query_params(params)?;
    let limit = Endpoint::Latest.resolve_limit(params.limit)?;
    if let Some(response) = head_only(&method) {
        return Ok(response);
    }

    let articles = state.news.latest_articles(limit).await?;
    Ok(Json(json!({
        "total": articles.len(),
        "articles": articles,
    }))
    .into_response())
}

pub async fn sources(method: Method, State(state): State<AppState>) -> Result<Response> {
    if let Some(response) = head_only(&method) {
        return Ok(response);
    }

    let sources = state.news.sources().await?;
    Ok(Json(json!({
        "total_sources": sources.len(),
        "sources": sources,
    }))
    .into_response())
}

pub async fn stats(method: Method, State(state): State<AppState>) -> Result<Response> {
    if let Some(response) = head_only(&method) {
        return Ok(response);
    }

    let stats = state.news.stats().await?;
    Ok(Json(stats).into_response())
}

pub async fn articles_by_source(
    method: Method,
    State(state): State<AppState>,
    Path(source_name): Path<String>,
    params: std::result::Result<Query<LimitParams>, QueryRejection>,
) -> Result<Response> {
    let params = query_params(params)?;
    let limit = Endpoint::BySource.resolve_limit(params.limit)?;
    if let Some(response) = head_only(&method) {
        return Ok(response);
    }

    let articles = state.news.articles_by_source(&source_name, limit).await?;
    Ok(Json(json!({
        "source": source_name,
        "total": articles.len(),
        "articles": articles,
    }))
    .into_response())
}
