//! The two JSON endpoints: a listing of local PNGs and a proxied random
//! image search against Wikimedia Commons.

use std::path::{Path, PathBuf};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use rand::Rng;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::SyncError;
use crate::store::encode_component;

pub const DEFAULT_SEARCH_BASE: &str = "https://commons.wikimedia.org";

/// Rendered image URLs always point at the real Commons host, regardless of
/// which base URL the search itself was sent to.
const COMMONS_FILE_PATH: &str = "https://commons.wikimedia.org/wiki/Special:FilePath";

const PLACEHOLDER_BASE: &str = "https://placehold.co/800x600/6366f1/white";

/// Search results are picked at random from at most this many top hits.
const MAX_PICK_POOL: usize = 5;

#[derive(Clone)]
pub struct ApiState {
    http: reqwest::Client,
    search_base: Url,
    images_dir: PathBuf,
}

impl ApiState {
    pub fn new(images_dir: PathBuf) -> Self {
        // Constant, known-good URL.
        Self::with_search_base(images_dir, Url::parse(DEFAULT_SEARCH_BASE).unwrap())
    }

    /// Like [`ApiState::new`] but with the search API base swapped out, for
    /// pointing tests at a mock server.
    pub fn with_search_base(images_dir: PathBuf, search_base: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            search_base,
            images_dir,
        }
    }
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/images", get(list_images))
        .route("/api/search-image", get(search_image))
        .with_state(state)
}

/// `GET /api/images` — the `/images/{file}` paths of every `.png` under the
/// static images folder. Any read failure degrades to an empty array.
async fn list_images(State(state): State<ApiState>) -> Json<Vec<String>> {
    match png_listing(&state.images_dir).await {
        Ok(files) => Json(files),
        Err(err) => {
            tracing::warn!(dir = %state.images_dir.display(), error = %err, "could not list images");
            Json(Vec::new())
        }
    }
}

async fn png_listing(dir: &Path) -> Result<Vec<String>, SyncError> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if let Some(name) = entry.file_name().to_str() {
            if name.ends_with(".png") {
                files.push(format!("/images/{}", name));
            }
        }
    }
    Ok(files)
}

#[derive(Deserialize)]
struct SearchParams {
    q: Option<String>,
}

#[derive(Serialize)]
struct SearchImageResponse {
    #[serde(rename = "imageUrl")]
    image_url: String,
}

/// `GET /api/search-image?q=term` — a random pick among the top Commons
/// search hits, or a placeholder image carrying the query text when the
/// search comes back empty or fails.
async fn search_image(
    State(state): State<ApiState>,
    Query(params): Query<SearchParams>,
) -> Response {
    let Some(query) = params.q.filter(|q| !q.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "No query provided" })),
        )
            .into_response();
    };

    let image_url = match commons_search(&state, &query).await {
        Ok(Some(url)) => url,
        Ok(None) => placeholder_url(&query),
        Err(err) => {
            tracing::error!(query, error = %err, "image search failed");
            placeholder_url(&query)
        }
    };

    Json(SearchImageResponse { image_url }).into_response()
}

#[derive(Deserialize)]
struct WikiSearchResponse {
    #[serde(default)]
    query: Option<WikiQuery>,
}

#[derive(Deserialize)]
struct WikiQuery {
    #[serde(default)]
    search: Vec<WikiHit>,
}

#[derive(Deserialize)]
struct WikiHit {
    title: String,
}

async fn commons_search(state: &ApiState, query: &str) -> Result<Option<String>, SyncError> {
    let url = state.search_base.join("w/api.php")?;
    let response: WikiSearchResponse = state
        .http
        .get(url)
        .query(&[
            ("action", "query"),
            ("list", "search"),
            ("srsearch", query),
            ("srnamespace", "6"),
            ("format", "json"),
            ("origin", "*"),
        ])
        .send()
        .await?
        .json()
        .await?;

    let hits = response.query.map(|q| q.search).unwrap_or_default();
    if hits.is_empty() {
        return Ok(None);
    }

    let pick = rand::rng().random_range(0..hits.len().min(MAX_PICK_POOL));
    let title = hits[pick].title.strip_prefix("File:").unwrap_or(&hits[pick].title);
    Ok(Some(format!(
        "{}/{}?width=800",
        COMMONS_FILE_PATH,
        encode_component(title)
    )))
}

fn placeholder_url(query: &str) -> String {
    format!("{}?text={}", PLACEHOLDER_BASE, encode_component(query))
}
