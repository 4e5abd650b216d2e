//! Token-prefix search over species names.
//!
//! Each record is reduced to a token set: the scientific name split on
//! whitespace, plus the common-name aliases split on commas and whitespace,
//! all lowercased. A query matches a record when every query token is a
//! prefix of at least one record token. A single-token query therefore
//! matches when any record token starts with it.
//!
//! Prefix matching, not substring: "ama" finds "Amanita", "anita" does not.
//! Results keep catalog order; there is no scoring.

use smallvec::SmallVec;

use crate::record::SpeciesRecord;

/// Lowercased name fragments of one record
pub type RecordTokens = SmallVec<[String; 8]>;

/// Build the token set for a record.
pub fn record_tokens(record: &SpeciesRecord) -> RecordTokens {
    let mut tokens = RecordTokens::new();

    tokens.extend(
        record
            .scientific_name
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string),
    );

    tokens.extend(
        record
            .common_name
            .to_lowercase()
            .split(|c: char| c == ',' || c.is_whitespace())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string),
    );

    tokens
}

/// Normalize a query. `None` means the query is blank and matches everything.
pub fn query_tokens(query: &str) -> Option<Vec<String>> {
    let lower = query.trim().to_lowercase();
    if lower.is_empty() {
        return None;
    }
    Some(lower.split_whitespace().map(str::to_string).collect())
}

/// AND across query tokens, OR across record tokens.
pub fn matches(query: &[String], tokens: &[String]) -> bool {
    query
        .iter()
        .all(|q| tokens.iter().any(|t| t.starts_with(q.as_str())))
}
