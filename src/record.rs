//! Species record and per-candidate validation.
//!
//! A candidate is admitted only when both `scientific_name` and `common_name`
//! are present, string-typed and non-empty. Everything else is optional free
//! text; non-string values in optional fields are treated as absent.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::edibility::{classify, EdibilityCategory};
use crate::prediction::asset_path_for;
use crate::utils::vernacular;

/// One row of the species catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesRecord {
    pub scientific_name: String,
    /// Comma-separated list of aliases
    pub common_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edibility: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub habitat: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// Why a candidate was kept out of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    NotAnObject,
    MissingScientificName,
    MissingCommonName,
}

impl DropReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DropReason::NotAnObject => "not an object",
            DropReason::MissingScientificName => "missing scientific_name",
            DropReason::MissingCommonName => "missing common_name",
        }
    }
}

impl SpeciesRecord {
    /// Validate one element of the catalog array.
    pub fn from_candidate(candidate: &Value) -> Result<Self, DropReason> {
        let obj = candidate.as_object().ok_or(DropReason::NotAnObject)?;

        let scientific_name =
            required_str(obj, "scientific_name").ok_or(DropReason::MissingScientificName)?;
        let common_name =
            required_str(obj, "common_name").ok_or(DropReason::MissingCommonName)?;

        Ok(SpeciesRecord {
            scientific_name,
            common_name,
            edibility: optional_str(obj, "edibility"),
            habitat: optional_str(obj, "habitat"),
            description: optional_str(obj, "description"),
            image_path: optional_str(obj, "image_path"),
            notes: optional_str(obj, "notes"),
            kind: optional_str(obj, "type"),
        })
    }

    /// Safety category derived from the edibility text.
    pub fn category(&self) -> EdibilityCategory {
        classify(self.edibility.as_deref())
    }

    /// Common-name aliases, trimmed, blanks removed.
    pub fn aliases(&self) -> Vec<&str> {
        vernacular::split_aliases(&self.common_name)
    }

    /// "Scientific name (First alias)"
    pub fn display_name(&self) -> String {
        vernacular::get_display_name(&self.scientific_name, Some(&self.common_name))
    }

    /// Explicit image path if the record has one, else the slug asset for its name.
    pub fn image_or_slug(&self) -> String {
        match self.image_path.as_deref().map(str::trim) {
            Some(path) if !path.is_empty() => path.to_string(),
            _ => asset_path_for(&self.scientific_name),
        }
    }

    /// Lowercased edibility text (empty when absent)
    pub(crate) fn edibility_lower(&self) -> String {
        self.edibility.as_deref().unwrap_or("").to_lowercase()
    }
}

fn required_str(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn optional_str(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        _ => None,
    }
}
