use anyhow::{Context, Result};
use axum::{extract::{Path, Query, State}, http::StatusCode, routing::get, Json, Router};
use regex::{Regex, RegexBuilder};
use search_core::{split_query, Analyzer, Corpus, EngineConfig, InvertedIndex, SearchMode, Searcher};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer, AllowOrigin};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_k() -> usize { 10 }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub mode: SearchMode,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHitView>,
    pub missing_terms: Vec<String>,
}

#[derive(Serialize)]
pub struct SearchHitView {
    pub doc_id: String,
    pub score: f64,
    pub matched_terms: Vec<String>,
    pub snippet: Option<String>,
}

/// Finalized index plus everything needed to answer queries against it.
pub struct Engine {
    pub index: InvertedIndex,
    pub analyzer: Analyzer,
    pub corpus: Corpus,
}

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
}

pub fn build_app(config: &EngineConfig) -> Result<Router> {
    // Index is built and finalized once at startup; handlers only read it.
    let (corpus, analyzer, index) = config
        .build()
        .with_context(|| format!("indexing {}", config.documents_path.display()))?;
    tracing::info!(num_docs = index.total_documents(), num_terms = index.term_count(), "index ready");
    let app_state = AppState { engine: Arc::new(Engine { index, analyzer, corpus }) };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());
    Ok(app)
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let start = std::time::Instant::now();
    let mode = match params.mode.as_deref() {
        Some(m) => m.parse::<SearchMode>().map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?,
        None => SearchMode::default(),
    };
    let engine = &state.engine;
    let searcher = Searcher::new(&engine.index, &engine.analyzer)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let raw_terms = split_query(&params.q);
    let results = searcher.search(mode, raw_terms.as_slice());

    let k = params.k.max(1).min(100);
    let total_hits = results.len();
    let highlighters = highlighters(&raw_terms);
    let hits = results
        .hits
        .into_iter()
        .take(k)
        .map(|hit| SearchHitView {
            snippet: engine.corpus.get(&hit.doc_id).and_then(|text| snippet(text, &highlighters)),
            doc_id: hit.doc_id,
            score: hit.score,
            matched_terms: hit.matched_terms.into_iter().collect(),
        })
        .collect();

    let elapsed = start.elapsed();
    Ok(Json(SearchResponse {
        query: params.q,
        mode,
        took_s: elapsed.as_secs_f64(),
        total_hits,
        results: hits,
        missing_terms: results.missing_terms,
    }))
}

pub async fn doc_handler(
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    match state.engine.corpus.get(&doc_id) {
        Some(text) => Ok(Json(serde_json::json!({ "doc_id": doc_id, "text": text }))),
        None => Err((StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": "not found" })))),
    }
}

/// Case-insensitive matchers for the raw query terms.
fn highlighters(raw_terms: &[String]) -> Vec<Regex> {
    raw_terms
        .iter()
        .filter(|t| !t.trim().is_empty())
        .filter_map(|t| RegexBuilder::new(&regex::escape(t)).case_insensitive(true).build().ok())
        .collect()
}

/// Up to ~300 bytes around the first raw term hit, with every hit wrapped in `<em>`.
fn snippet(text: &str, terms: &[Regex]) -> Option<String> {
    if text.is_empty() { return None; }
    let first_idx = terms.iter().find_map(|re| re.find(text).map(|m| m.start()));
    let snippet = match first_idx {
        Some(idx) => {
            let mut start = idx.saturating_sub(100);
            while !text.is_char_boundary(start) { start -= 1; }
            let mut end = (idx + 200).min(text.len());
            while !text.is_char_boundary(end) { end += 1; }
            text[start..end].to_string()
        }
        None => text.chars().take(200).collect(),
    };
    Some(highlight_terms(&snippet, terms))
}

fn highlight_terms(snippet: &str, terms: &[Regex]) -> String {
    let mut s = snippet.to_string();
    for pat in terms {
        s = pat.replace_all(&s, |caps: &regex::Captures| format!("<em>{}</em>", &caps[0])).to_string();
    }
    s
}
