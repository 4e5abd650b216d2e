//! Edibility classification from free-text descriptions.
//!
//! The catalog has no fixed edibility vocabulary, so the safety category is
//! derived by an ordered list of substring rules. The first matching rule
//! wins. Edible rules are evaluated before the toxic rule, so text such as
//! "edible, but toxic raw" resolves to an edible category.

use serde::Serialize;

/// Safety category derived from an edibility description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdibilityCategory {
    Safe,
    EdibleWithCaution,
    Toxic,
    Unknown,
}

/// Display emphasis only. Never used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Medium,
    High,
    Critical,
}

/// Display-ready category details
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EdibilityInfo {
    pub category: EdibilityCategory,
    pub status: &'static str,
    pub tone: &'static str,
    pub priority: Priority,
}

impl EdibilityCategory {
    pub fn priority(&self) -> Priority {
        match self {
            EdibilityCategory::Safe => Priority::High,
            EdibilityCategory::EdibleWithCaution => Priority::Medium,
            EdibilityCategory::Toxic => Priority::Critical,
            EdibilityCategory::Unknown => Priority::Medium,
        }
    }

    pub fn status_label(&self) -> &'static str {
        match self {
            EdibilityCategory::Safe => "Safe to Eat",
            EdibilityCategory::EdibleWithCaution => "Edible with Caution",
            EdibilityCategory::Toxic => "Toxic",
            EdibilityCategory::Unknown => "Unknown",
        }
    }

    pub fn tone(&self) -> &'static str {
        match self {
            EdibilityCategory::Safe => "green",
            EdibilityCategory::EdibleWithCaution => "yellow",
            EdibilityCategory::Toxic => "red",
            EdibilityCategory::Unknown => "orange",
        }
    }

    pub fn info(&self) -> EdibilityInfo {
        EdibilityInfo {
            category: *self,
            status: self.status_label(),
            tone: self.tone(),
            priority: self.priority(),
        }
    }
}

// ============================================================================
// Rule table
// ============================================================================

type Predicate = fn(&str) -> bool;

/// Evaluated top to bottom on lowercased text; first hit wins.
const RULES: &[(Predicate, EdibilityCategory)] = &[
    (is_choice_edible, EdibilityCategory::Safe),
    (mentions_edible, EdibilityCategory::EdibleWithCaution),
    (mentions_toxic, EdibilityCategory::Toxic),
];

fn mentions_edible(text: &str) -> bool {
    text.contains("edible")
}

fn is_choice_edible(text: &str) -> bool {
    mentions_edible(text) && (text.contains("good") || text.contains("excellent"))
}

/// Also used by the catalog's toxic counter, which is looser than `classify`.
pub(crate) fn mentions_toxic(text: &str) -> bool {
    text.contains("toxic") || text.contains("poisonous")
}

/// Classify an edibility description. Absent or empty text is `Unknown`.
pub fn classify(text: Option<&str>) -> EdibilityCategory {
    let lower = match text {
        Some(t) if !t.is_empty() => t.to_lowercase(),
        _ => return EdibilityCategory::Unknown,
    };

    RULES
        .iter()
        .find(|(matches, _)| matches(&lower))
        .map(|(_, category)| *category)
        .unwrap_or(EdibilityCategory::Unknown)
}
