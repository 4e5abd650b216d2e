//! Mushroom Catalog
//!
//! Species data layer for a mushroom identification client:
//! - `record`: species records and per-candidate validation
//! - `catalog`: immutable validated snapshot with lookup, filter and sampling queries
//! - `store`: load lifecycle (`Idle -> Loading -> Ready | Failed`) with atomic reload
//! - `search`: token-prefix multi-word search
//! - `edibility`: safety category from free-text edibility descriptions
//! - `prediction`: classification results bound to catalog records and image assets
//! - `classifier_client`: HTTP client for the external image classifier
//! - `api_server` (feature `api`): Axum REST server over the catalog

pub mod catalog;
pub mod classifier_client;
pub mod config;
pub mod edibility;
pub mod error;
pub mod prediction;
pub mod record;
pub mod routes;
pub mod search;
pub mod store;
pub mod utils;

#[cfg(feature = "api")]
pub mod api_server;

// Re-export commonly used types
pub use catalog::{Catalog, CatalogCounts, DEFAULT_SAMPLE_SIZE};
pub use classifier_client::{ClassifierClient, ImageUpload, ServiceHealth};
pub use config::AppConfig;
pub use edibility::{classify, EdibilityCategory, EdibilityInfo, Priority};
pub use error::{LoadError, ServiceError, ServiceErrorKind};
pub use prediction::{
    asset_path_for, parse_predictions, BandThresholds, BoundPrediction, ConfidenceBand,
    PredictionBinder, PredictionEntry,
};
pub use record::SpeciesRecord;
pub use store::{CatalogSource, CatalogStore, LoadOutcome, LoadReport, LoadState};

#[cfg(feature = "api")]
pub use api_server::{create_router, AppState};
