use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use docsearch_core::persist::{load_index, Format, IndexPaths, MetaFile};
use docsearch_core::{search, Analyzer, CorpusIndex, FrequencyMap, IndexError, Language, ScoredResult};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_k() -> usize { 10 }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<ScoredResult>,
}

#[derive(Serialize)]
pub struct DocResponse {
    pub doc: String,
    pub total_terms: u64,
    pub terms: FrequencyMap,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub num_docs: usize,
    pub num_terms: usize,
    pub created_at: String,
    pub format: Format,
    pub language: Language,
}

pub struct ServerConfig {
    pub index_dir: PathBuf,
    pub admin_token: Option<String>,
    /// Allowed CORS origins; empty allows any origin.
    pub cors_origins: Vec<String>,
}

/// An index together with the analyzer it was built with.
pub struct LoadedIndex {
    pub corpus: CorpusIndex,
    pub analyzer: Analyzer,
    pub meta: MetaFile,
}

impl LoadedIndex {
    pub fn open(root: &std::path::Path) -> Result<Self, IndexError> {
        let (corpus, meta) = load_index(&IndexPaths::new(root))?;
        let analyzer = Analyzer::from_settings(&meta.analyzer);
        Ok(Self { corpus, analyzer, meta })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub index_root: PathBuf,
    pub index: Arc<RwLock<Arc<LoadedIndex>>>,
    pub admin_token: Option<String>,
}

impl AppState {
    fn snapshot(&self) -> Arc<LoadedIndex> {
        self.index.read().clone()
    }
}

pub fn build_app(config: ServerConfig) -> Result<Router> {
    // Load the index at startup
    let loaded = LoadedIndex::open(&config.index_dir)?;
    let app_state = AppState {
        index_root: config.index_dir,
        index: Arc::new(RwLock::new(Arc::new(loaded))),
        admin_token: config.admin_token,
    };

    let origins: Vec<_> = config.cors_origins.iter().filter_map(|s| s.trim().parse().ok()).collect();
    let cors = if origins.is_empty() {
        CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
    } else {
        CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
    };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/stats", get(stats_handler))
        .route("/doc/*doc_id", get(doc_handler))
        .route("/index/reload", post(reload_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());
    Ok(app)
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Json<SearchResponse> {
    let start = std::time::Instant::now();
    let index = state.snapshot();
    let mut results = search(&index.corpus, &index.analyzer, &params.q);
    let total_hits = results.len();
    results.truncate(params.k.clamp(1, 100));
    let elapsed = start.elapsed();
    Json(SearchResponse { query: params.q, took_s: elapsed.as_secs_f64(), total_hits, results })
}

pub async fn doc_handler(
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
) -> Result<Json<DocResponse>, (StatusCode, Json<serde_json::Value>)> {
    let index = state.snapshot();
    match index.corpus.frequencies(&doc_id) {
        Some(freqs) => Ok(Json(DocResponse {
            total_terms: docsearch_core::total_occurrences(freqs),
            terms: freqs.clone(),
            doc: doc_id,
        })),
        None => Err((StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": "not found", "doc": doc_id })))),
    }
}

pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let index = state.snapshot();
    Json(StatsResponse {
        num_docs: index.corpus.num_docs(),
        num_terms: index.corpus.num_terms(),
        created_at: index.meta.created_at.clone(),
        format: index.meta.format,
        language: index.meta.analyzer.language,
    })
}

/// Re-read the index from disk. On failure the current index keeps serving.
async fn reload_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    let root = state.index_root.clone();
    let loaded = tokio::task::spawn_blocking(move || LoadedIndex::open(&root))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map_err(|e| {
            tracing::error!(error = %e, "index reload failed, keeping current index");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;
    let num_docs = loaded.corpus.num_docs();
    *state.index.write() = Arc::new(loaded);
    tracing::info!(num_docs, "index reloaded");
    Ok(Json(serde_json::json!({ "reloaded": true, "num_docs": num_docs })))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), (StatusCode, String)> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}
