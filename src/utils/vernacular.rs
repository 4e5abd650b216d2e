//! Common-name handling utility
//!
//! The catalog stores every alias of a species in one comma-separated
//! `common_name` field. Display picks the first listed alias.

/// Get formatted display name for a species
///
/// Returns: "Scientific Name (First Alias)" or just "Scientific Name"
pub fn get_display_name(scientific_name: &str, common_name: Option<&str>) -> String {
    match common_name.and_then(first_alias) {
        Some(alias) => format!("{} ({})", scientific_name, alias),
        None => scientific_name.to_string(),
    }
}

/// Split a comma-separated alias list, trim, drop blanks. Order is preserved.
pub fn split_aliases(raw: &str) -> Vec<&str> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect()
}

fn first_alias(raw: &str) -> Option<&str> {
    split_aliases(raw).into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_aliases() {
        assert_eq!(
            split_aliases("Fly Agaric, Fly Amanita"),
            vec!["Fly Agaric", "Fly Amanita"]
        );
        assert_eq!(split_aliases("  Porcini  ,, King Bolete "), vec!["Porcini", "King Bolete"]);
        assert_eq!(split_aliases("Morel"), vec!["Morel"]);
        assert!(split_aliases("").is_empty());
        assert!(split_aliases(" , ,").is_empty());
    }

    #[test]
    fn test_get_display_name() {
        assert_eq!(
            get_display_name("Amanita muscaria", Some("Fly Agaric, Fly Amanita")),
            "Amanita muscaria (Fly Agaric)"
        );
        assert_eq!(
            get_display_name("Amanita muscaria", Some(" , ")),
            "Amanita muscaria"
        );
        assert_eq!(get_display_name("Amanita muscaria", None), "Amanita muscaria");
    }
}
