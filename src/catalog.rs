//! Catalog snapshot - immutable, validated species collection
//!
//! Built once from a bulk JSON payload and never mutated afterwards. A reload
//! produces a brand new `Catalog`; the store swaps the `Arc` so readers see
//! either the old snapshot or the new one, never a mix.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use rustc_hash::FxHashMap;
use serde::Serialize;
use serde_json::Value;

use crate::edibility::mentions_toxic;
use crate::error::LoadError;
use crate::record::SpeciesRecord;
use crate::search::{self, RecordTokens};

/// Featured-species sample size when the caller does not pick one
pub const DEFAULT_SAMPLE_SIZE: usize = 5;

/// Validated in-memory species collection for one session
#[derive(Debug, Default)]
pub struct Catalog {
    records: Vec<SpeciesRecord>,
    /// Token set per record (same index as `records`)
    tokens: Vec<RecordTokens>,
    /// Lowercased scientific name -> first record index
    by_scientific: FxHashMap<String, usize>,
    dropped: usize,
    loaded_at: Option<DateTime<Utc>>,
}

/// Derived counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogCounts {
    pub total: usize,
    /// Edibility text contains "edible"
    pub edible: usize,
    /// Edibility text contains "toxic" or "poisonous"
    pub toxic: usize,
    pub dropped: usize,
}

impl Catalog {
    /// Parse and validate a catalog payload.
    ///
    /// The top level must be a JSON array. Elements failing validation are
    /// dropped and counted; they never fail the load.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, LoadError> {
        let value: Value = serde_json::from_slice(bytes)?;
        let candidates = match value {
            Value::Array(items) => items,
            _ => return Err(LoadError::NotAnArray),
        };

        let mut records = Vec::with_capacity(candidates.len());
        let mut dropped = 0;
        for (idx, candidate) in candidates.iter().enumerate() {
            match SpeciesRecord::from_candidate(candidate) {
                Ok(record) => records.push(record),
                Err(reason) => {
                    dropped += 1;
                    tracing::warn!(
                        index = idx,
                        reason = reason.as_str(),
                        "Skipping mushroom with missing required fields"
                    );
                }
            }
        }

        let mut catalog = Self::from_records(records);
        catalog.dropped = dropped;
        catalog.loaded_at = Some(Utc::now());
        Ok(catalog)
    }

    /// Build a catalog from already-validated records.
    pub fn from_records(records: Vec<SpeciesRecord>) -> Self {
        let tokens = records.iter().map(search::record_tokens).collect();

        let mut by_scientific = FxHashMap::default();
        for (idx, record) in records.iter().enumerate() {
            let key = record.scientific_name.to_lowercase();
            if by_scientific.contains_key(&key) {
                tracing::warn!(
                    scientific_name = %record.scientific_name,
                    "Duplicate scientific name; exact lookup resolves to the first entry"
                );
                continue;
            }
            by_scientific.insert(key, idx);
        }

        Catalog {
            records,
            tokens,
            by_scientific,
            dropped: 0,
            loaded_at: None,
        }
    }

    pub fn records(&self) -> &[SpeciesRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Candidates dropped during validation
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    /// Exact, case-insensitive match on the scientific name.
    pub fn by_scientific_name(&self, name: &str) -> Option<&SpeciesRecord> {
        if name.is_empty() {
            return None;
        }
        self.by_scientific
            .get(&name.to_lowercase())
            .map(|&idx| &self.records[idx])
    }

    /// First record whose common-name list contains `text`, case-insensitive.
    pub fn by_common_name_substring(&self, text: &str) -> Option<&SpeciesRecord> {
        if text.is_empty() {
            return None;
        }
        let needle = text.to_lowercase();
        self.records
            .iter()
            .find(|r| r.common_name.to_lowercase().contains(&needle))
    }

    /// Records whose edibility text contains `text`. Empty `text` returns everything.
    pub fn by_edibility_substring(&self, text: &str) -> Vec<&SpeciesRecord> {
        self.filter_optional_field(text, |r| r.edibility.as_deref())
    }

    /// Records whose habitat text contains `text`. Empty `text` returns everything.
    pub fn by_habitat_substring(&self, text: &str) -> Vec<&SpeciesRecord> {
        self.filter_optional_field(text, |r| r.habitat.as_deref())
    }

    fn filter_optional_field<F>(&self, text: &str, field: F) -> Vec<&SpeciesRecord>
    where
        F: Fn(&SpeciesRecord) -> Option<&str>,
    {
        if text.is_empty() {
            return self.records.iter().collect();
        }
        let needle = text.to_lowercase();
        self.records
            .iter()
            .filter(|r| field_contains(field(r), &needle))
            .collect()
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Token-prefix search. Blank queries return the full catalog in order.
    pub fn search(&self, query: &str) -> Vec<&SpeciesRecord> {
        let query_tokens = match search::query_tokens(query) {
            Some(q) => q,
            None => return self.records.iter().collect(),
        };

        self.records
            .iter()
            .zip(&self.tokens)
            .filter(|(_, tokens)| search::matches(&query_tokens, tokens))
            .map(|(record, _)| record)
            .collect()
    }

    /// Search combined with the edibility and habitat filters. Empty
    /// arguments are no-ops; catalog order is kept.
    pub fn query(&self, query: &str, edibility: &str, habitat: &str) -> Vec<&SpeciesRecord> {
        let edibility = edibility.to_lowercase();
        let habitat = habitat.to_lowercase();

        self.search(query)
            .into_iter()
            .filter(|r| edibility.is_empty() || field_contains(r.edibility.as_deref(), &edibility))
            .filter(|r| habitat.is_empty() || field_contains(r.habitat.as_deref(), &habitat))
            .collect()
    }

    // ========================================================================
    // Sampling & counters
    // ========================================================================

    /// `n` distinct records in random order using the thread-local generator.
    pub fn random_sample(&self, n: usize) -> Vec<&SpeciesRecord> {
        self.random_sample_with(n, &mut rand::thread_rng())
    }

    /// `n` distinct records in random order drawn with `rng`.
    /// Asking for more than the catalog holds returns the whole catalog shuffled.
    pub fn random_sample_with<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<&SpeciesRecord> {
        let mut shuffled: Vec<&SpeciesRecord> = self.records.iter().collect();
        shuffled.shuffle(rng);
        shuffled.truncate(n);
        shuffled
    }

    pub fn counts(&self) -> CatalogCounts {
        let mut edible = 0;
        let mut toxic = 0;
        for record in &self.records {
            let lower = record.edibility_lower();
            if lower.contains("edible") {
                edible += 1;
            }
            if mentions_toxic(&lower) {
                toxic += 1;
            }
        }

        CatalogCounts {
            total: self.records.len(),
            edible,
            toxic,
            dropped: self.dropped,
        }
    }
}

/// Case-insensitive containment; `needle` must already be lowercase.
fn field_contains(field: Option<&str>, needle: &str) -> bool {
    field
        .map(|v| v.to_lowercase().contains(needle))
        .unwrap_or(false)
}
