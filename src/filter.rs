use crate::registry::Profile;

/// A normalized, case-insensitive filter query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterQuery {
    needle: String,
}

impl FilterQuery {
    pub fn new(raw: &str) -> Self {
        Self {
            needle: raw.trim().to_lowercase(),
        }
    }

    /// The trimmed, lowercased text that is matched.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.needle
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    #[must_use]
    pub fn matches(&self, profile: &Profile) -> bool {
        self.is_empty() || profile.display_name.to_lowercase().contains(&self.needle)
    }
}

/// Profiles whose display name contains `query`, in catalog order.
///
/// A blank query returns the whole catalog.
#[must_use]
pub fn filter(catalog: &[Profile], query: &str) -> Vec<Profile> {
    let query = FilterQuery::new(query);
    if query.is_empty() {
        return catalog.to_vec();
    }
    catalog
        .iter()
        .filter(|profile| query.matches(profile))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<Profile> {
        vec![
            Profile::new("Alice", "d1"),
            Profile::new("alicia", "d2"),
            Profile::new("Bob", "d3"),
            Profile::new("Work – Ålesund", "d4"),
        ]
    }

    fn is_subsequence(needle: &[Profile], haystack: &[Profile]) -> bool {
        let mut rest = haystack.iter();
        needle.iter().all(|item| rest.any(|candidate| candidate == item))
    }

    #[test]
    fn matches_case_insensitively_in_catalog_order() {
        let result = filter(&catalog(), "ali");
        assert_eq!(
            result,
            vec![Profile::new("Alice", "d1"), Profile::new("alicia", "d2")]
        );
    }

    #[test]
    fn blank_query_returns_everything() {
        assert_eq!(filter(&catalog(), ""), catalog());
        assert_eq!(filter(&catalog(), "   "), catalog());
    }

    #[test]
    fn query_is_trimmed_before_matching() {
        assert_eq!(filter(&catalog(), "  bob "), vec![Profile::new("Bob", "d3")]);
    }

    #[test]
    fn directory_ids_are_not_searched() {
        assert!(filter(&catalog(), "d1").is_empty());
    }

    #[test]
    fn folds_non_ascii_case() {
        assert_eq!(
            filter(&catalog(), "åLE"),
            vec![Profile::new("Work – Ålesund", "d4")]
        );
    }

    #[test]
    fn results_are_an_ordered_subsequence_of_matches() {
        let catalog = catalog();
        for query in ["a", "LI", "o", "x", "ic", " "] {
            let result = filter(&catalog, query);
            assert!(is_subsequence(&result, &catalog), "query {query:?}");
            let needle = query.trim().to_lowercase();
            assert!(
                result
                    .iter()
                    .all(|p| p.display_name.to_lowercase().contains(&needle)),
                "query {query:?}"
            );
        }
    }

    #[test]
    fn filtering_is_idempotent() {
        let catalog = catalog();
        for query in ["a", "ali", "B", "", "zzz"] {
            let once = filter(&catalog, query);
            assert_eq!(filter(&once, query), once, "query {query:?}");
        }
    }
}
