// Axum API Server Module
//
// Purpose: expose the species catalog (list, detail, about) plus catalog reload
// and image classification bound to catalog records.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::catalog::{Catalog, DEFAULT_SAMPLE_SIZE};
use crate::classifier_client::{ClassifierClient, ImageUpload};
use crate::config::AppConfig;
use crate::edibility::EdibilityInfo;
use crate::error::{ServiceError, ServiceErrorKind};
use crate::prediction::PredictionBinder;
use crate::record::SpeciesRecord;
use crate::routes;
use crate::store::{CatalogStore, LoadOutcome, LoadState};

/// Upper bound on `/api/species/random?count=`
const MAX_SAMPLE_SIZE: usize = 100;

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<CatalogStore>,
    pub classifier: Arc<ClassifierClient>,
}

impl AppState {
    /// Build the store and run the first load. A failed first load is not
    /// fatal: the server starts in `Failed` and `/api/catalog/reload` retries.
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        tracing::info!("Initializing catalog store...");
        let store = Arc::new(CatalogStore::new(config.catalog_source()?));

        if let Err(e) = store.load().await {
            tracing::warn!("Initial catalog load failed, serving empty catalog: {}", e);
        }

        tracing::info!("Initializing classification client ({})...", config.classifier_url);
        let classifier = Arc::new(ClassifierClient::new(
            config.classifier_url.clone(),
            config.fetch_timeout,
        )?);

        Ok(Self::from_parts(store, classifier))
    }

    pub fn from_parts(store: Arc<CatalogStore>, classifier: Arc<ClassifierClient>) -> Self {
        Self { store, classifier }
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))

        // Species endpoints
        .route("/api/species", get(list_species))
        .route("/api/species/random", get(random_species))
        .route("/api/species/stats", get(catalog_stats))
        .route("/api/species/:scientific_name", get(get_species))

        // Static about page
        .route("/api/about", get(about))

        // Catalog lifecycle
        .route("/api/catalog/reload", post(reload_catalog))

        // Classification
        .route("/api/predict", post(predict))
        .route("/api/classifier/health", get(classifier_health))

        // Middleware (applied in reverse order)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Response Models
// ============================================================================

/// List-view row
#[derive(Debug, Serialize)]
struct SpeciesSummary<'a> {
    #[serde(flatten)]
    record: &'a SpeciesRecord,
    display_name: String,
    edibility_info: EdibilityInfo,
    image: String,
    route: String,
}

impl<'a> SpeciesSummary<'a> {
    fn from_record(record: &'a SpeciesRecord) -> Self {
        Self {
            record,
            display_name: record.display_name(),
            edibility_info: record.category().info(),
            image: record.image_or_slug(),
            route: routes::species_detail_route(&record.scientific_name),
        }
    }
}

/// Detail-view body
#[derive(Debug, Serialize)]
struct SpeciesDetail<'a> {
    #[serde(flatten)]
    summary: SpeciesSummary<'a>,
    aliases: Vec<&'a str>,
}

#[derive(Debug, Deserialize)]
pub struct SpeciesQuery {
    pub q: Option<String>,
    pub edibility: Option<String>,
    pub habitat: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RandomQuery {
    pub count: Option<usize>,
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "catalog": state.store.state(),
    }))
}

async fn list_species(
    State(state): State<AppState>,
    Query(params): Query<SpeciesQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let catalog = require_catalog(&state)?;
    let start = std::time::Instant::now();

    let hits = catalog.query(
        params.q.as_deref().unwrap_or(""),
        params.edibility.as_deref().unwrap_or(""),
        params.habitat.as_deref().unwrap_or(""),
    );
    let data: Vec<SpeciesSummary> = hits.into_iter().map(SpeciesSummary::from_record).collect();

    let elapsed = start.elapsed();
    tracing::debug!("Species query {:?} returned {} results in {:?}", params, data.len(), elapsed);

    Ok(Json(serde_json::json!({
        "rows": data.len(),
        "data": data,
        "query_time_us": elapsed.as_micros(),
    })))
}

async fn random_species(
    State(state): State<AppState>,
    Query(params): Query<RandomQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let catalog = require_catalog(&state)?;
    let count = params.count.unwrap_or(DEFAULT_SAMPLE_SIZE).min(MAX_SAMPLE_SIZE);

    let data: Vec<SpeciesSummary> = catalog
        .random_sample(count)
        .into_iter()
        .map(SpeciesSummary::from_record)
        .collect();

    Ok(Json(serde_json::json!({
        "rows": data.len(),
        "data": data,
    })))
}

async fn catalog_stats(State(state): State<AppState>) -> Json<serde_json::Value> {
    let catalog = state.store.snapshot();
    let counts = catalog.counts();

    Json(serde_json::json!({
        "total": counts.total,
        "edible": counts.edible,
        "toxic": counts.toxic,
        "dropped": counts.dropped,
        "loaded_at": catalog.loaded_at().map(|t| t.to_rfc3339()),
        "state": state.store.state(),
    }))
}

async fn get_species(
    State(state): State<AppState>,
    Path(scientific_name): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let catalog = require_catalog(&state)?;

    let record = catalog
        .by_scientific_name(&scientific_name)
        .ok_or_else(|| AppError::NotFound(format!("Species {} not found", scientific_name)))?;

    let detail = SpeciesDetail {
        summary: SpeciesSummary::from_record(record),
        aliases: record.aliases(),
    };

    Ok(Json(serde_json::to_value(&detail).map_err(|e| AppError::Internal(e.to_string()))?))
}

async fn about() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "title": "Mushroom Species Catalog",
        "description": "Browse the species catalog and identify mushrooms from photos with an image classifier.",
        "safety_warning": "Never eat a wild mushroom based on an automated identification. \
            Always confirm with a qualified expert before consuming any mushroom.",
        "routes": {
            "home": routes::HOME_ROUTE,
            "species": routes::SPECIES_LIST_ROUTE,
            "about": routes::ABOUT_ROUTE,
        },
    }))
}

async fn reload_catalog(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    match state.store.reload().await {
        Ok(LoadOutcome::Loaded(report)) => Ok(Json(serde_json::json!({
            "status": "reloaded",
            "records": report.records,
            "dropped": report.dropped,
        }))),
        Ok(LoadOutcome::AlreadyLoading) => Ok(Json(serde_json::json!({
            "status": "already_loading",
        }))),
        Err(e) => Err(AppError::Load(e.to_string())),
    }
}

async fn predict(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, AppError> {
    let mut upload: Option<ImageUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("").to_string();
        let content_type = field.content_type().unwrap_or("").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        upload = Some(ImageUpload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    let upload = upload.ok_or_else(|| AppError::BadRequest("No file provided".to_string()))?;

    tracing::info!("Classifying upload {}", upload.file_name);
    let entries = state.classifier.classify(upload).await.map_err(AppError::Service)?;

    let catalog = state.store.snapshot();
    let predictions = PredictionBinder::new(&catalog).bind(&entries);

    Ok(Json(serde_json::json!({
        "predictions": predictions,
    })))
}

async fn classifier_health(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let health = state.classifier.health().await.map_err(AppError::Service)?;
    Ok(Json(serde_json::json!(health)))
}

/// Snapshot for read endpoints. Before any catalog has been loaded the
/// endpoints answer 503 with the load state instead of an empty list.
fn require_catalog(state: &AppState) -> Result<Arc<Catalog>, AppError> {
    let catalog = state.store.snapshot();
    if catalog.is_empty() {
        match state.store.state() {
            LoadState::Ready => {}
            LoadState::Failed(msg) => return Err(AppError::Unavailable(msg)),
            LoadState::Idle | LoadState::Loading => {
                return Err(AppError::Unavailable("Catalog is loading".to_string()))
            }
        }
    }
    Ok(catalog)
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
enum AppError {
    NotFound(String),
    BadRequest(String),
    Unavailable(String),
    Load(String),
    Service(ServiceError),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message, kind) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg, None),
            AppError::Load(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg, None),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg, None),
            AppError::Service(err) => {
                let status = match err.kind() {
                    ServiceErrorKind::Upload => StatusCode::BAD_REQUEST,
                    _ => StatusCode::BAD_GATEWAY,
                };
                tracing::warn!("Classification failed: {}", err);
                (status, err.user_message(), Some(err.kind()))
            }
        };

        let body = Json(serde_json::json!({
            "error": message,
            "kind": kind,
        }));

        (status, body).into_response()
    }
}
