//! Classification results bound to the catalog.
//!
//! The classification service answers with a list of `{label, confidence,
//! warning?}` entries, either wrapped as `{"predictions": [...]}` or as a bare
//! array. `PredictionBinder` correlates each label to a catalog record and to
//! a deterministic image asset without touching the catalog.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::Catalog;
use crate::edibility::EdibilityCategory;
use crate::error::ServiceError;
use crate::record::SpeciesRecord;
use crate::routes;

/// Directory holding one image per species slug
pub const ASSET_DIR: &str = "/images/species";

/// Extension of slug images
pub const IMAGE_EXTENSION: &str = "jpg";

/// Confidence below which the service attaches a warning
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.5;

/// One entry of a classification response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionEntry {
    pub label: String,
    /// In [0, 1]
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl PredictionEntry {
    pub fn is_low_confidence(&self) -> bool {
        self.confidence < LOW_CONFIDENCE_THRESHOLD
    }
}

#[derive(Deserialize)]
struct WrappedPredictions {
    predictions: Vec<PredictionEntry>,
}

/// Accept `{"predictions": [...]}` or a bare array. Anything else is a format error.
pub fn parse_predictions(body: Value) -> Result<Vec<PredictionEntry>, ServiceError> {
    let malformed = |e: serde_json::Error| ServiceError::Format(format!("malformed prediction entry: {}", e));

    if body.is_array() {
        return serde_json::from_value(body).map_err(malformed);
    }
    if body.get("predictions").map_or(false, Value::is_array) {
        return serde_json::from_value::<WrappedPredictions>(body)
            .map(|w| w.predictions)
            .map_err(malformed);
    }

    Err(ServiceError::Format(format!(
        "expected predictions array, got {}",
        json_kind(&body)
    )))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// Asset slug
// ============================================================================

/// Deterministic image path for a species label.
///
/// Lowercase, trim, collapse each whitespace run to one underscore, then
/// prefix `ASSET_DIR` and append `IMAGE_EXTENSION`. Labels differing only by
/// case or spacing map to the same asset.
pub fn asset_path_for(label: &str) -> String {
    let slug = label
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    format!("{}/{}.{}", ASSET_DIR, slug, IMAGE_EXTENSION)
}

// ============================================================================
// Confidence bands
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
}

/// Percentage cut-offs. A value strictly above `high` is High, strictly above
/// `medium` is Medium, anything else (NaN included) is Low.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandThresholds {
    pub high: f64,
    pub medium: f64,
}

impl BandThresholds {
    /// Result badge and confidence bar on the classification view
    pub const RESULT_BADGE: BandThresholds = BandThresholds { high: 80.0, medium: 60.0 };

    /// Looser cut-offs for secondary listings
    pub const SECONDARY: BandThresholds = BandThresholds { high: 70.0, medium: 50.0 };

    pub fn band(&self, confidence: f64) -> ConfidenceBand {
        let percent = confidence * 100.0;
        if percent > self.high {
            ConfidenceBand::High
        } else if percent > self.medium {
            ConfidenceBand::Medium
        } else {
            ConfidenceBand::Low
        }
    }
}

impl Default for BandThresholds {
    fn default() -> Self {
        Self::RESULT_BADGE
    }
}

// ============================================================================
// Binder
// ============================================================================

/// UI-ready classification result
#[derive(Debug, Clone, Serialize)]
pub struct BoundPrediction {
    /// 0 is the top result
    pub rank: usize,
    pub label: String,
    pub confidence: f64,
    pub confidence_percent: f64,
    pub band: ConfidenceBand,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    pub asset_path: String,
    pub detail_route: String,
    /// `None` when the label is not in the catalog; consumers show the raw label.
    pub species: Option<SpeciesRecord>,
    pub category: Option<EdibilityCategory>,
}

/// Correlates service labels with a catalog snapshot.
pub struct PredictionBinder<'a> {
    catalog: &'a Catalog,
    thresholds: BandThresholds,
}

impl<'a> PredictionBinder<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            thresholds: BandThresholds::default(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: BandThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn resolve_species(&self, label: &str) -> Option<&'a SpeciesRecord> {
        self.catalog.by_scientific_name(label)
    }

    /// Bind entries in service order.
    pub fn bind(&self, entries: &[PredictionEntry]) -> Vec<BoundPrediction> {
        entries
            .iter()
            .enumerate()
            .map(|(rank, entry)| {
                let species = self.resolve_species(&entry.label);
                BoundPrediction {
                    rank,
                    label: entry.label.clone(),
                    confidence: entry.confidence,
                    confidence_percent: entry.confidence * 100.0,
                    band: self.thresholds.band(entry.confidence),
                    warning: entry.warning.clone(),
                    asset_path: asset_path_for(&entry.label),
                    detail_route: routes::species_detail_route(&entry.label),
                    category: species.map(SpeciesRecord::category),
                    species: species.cloned(),
                }
            })
            .collect()
    }
}
