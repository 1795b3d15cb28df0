//! Typeahead matching
//!
//! Matching is a case-insensitive substring test against the option label.
//! Results are ranked in two tiers: labels that start with the query come
//! first, labels that merely contain it follow. Each tier keeps the original
//! option order.
//!
//! ```rust
//! use usa_combo_box::{matcher, ComboBoxOption};
//!
//! let options = [
//!     ComboBoxOption::new("grape", "Grape"),
//!     ComboBoxOption::new("apple", "Apple"),
//!     ComboBoxOption::new("banana", "Banana"),
//! ];
//!
//! let labels: Vec<_> = matcher::match_options(&options, "ap")
//!     .into_iter()
//!     .map(|o| o.label.as_str())
//!     .collect();
//! assert_eq!(labels, ["Apple", "Grape"]);
//! ```

use crate::option::ComboBoxOption;

/// How an option label relates to the query
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchRank {
    /// The label starts with the query
    Prefix,
    /// The query appears later in the label
    Substring,
}

/// Normalize a query for matching: surrounding whitespace is ignored and the
/// comparison is case-insensitive
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Rank a label against an already normalized query
pub fn rank(label: &str, normalized_query: &str) -> Option<MatchRank> {
    if normalized_query.is_empty() {
        return Some(MatchRank::Prefix);
    }
    let label = label.to_lowercase();
    match label.find(normalized_query) {
        Some(0) => Some(MatchRank::Prefix),
        Some(_) => Some(MatchRank::Substring),
        None => None,
    }
}

/// Indices of the options matching `query`, best matches first
///
/// An empty query yields every option in original order. Disabled options
/// are included; navigation skips them.
pub fn filter_options(options: &[ComboBoxOption], query: &str) -> Vec<usize> {
    let query = normalize_query(query);
    if query.is_empty() {
        return (0..options.len()).collect();
    }

    let mut prefix = Vec::new();
    let mut substring = Vec::new();
    for (index, option) in options.iter().enumerate() {
        match rank(&option.label, &query) {
            Some(MatchRank::Prefix) => prefix.push(index),
            Some(MatchRank::Substring) => substring.push(index),
            None => {}
        }
    }
    prefix.extend(substring);
    prefix
}

/// The options matching `query`, best matches first
pub fn match_options<'a>(options: &'a [ComboBoxOption], query: &str) -> Vec<&'a ComboBoxOption> {
    filter_options(options, query)
        .into_iter()
        .map(|i| &options[i])
        .collect()
}

// =========================================================================
// Navigation over a filtered sequence
// =========================================================================
//
// `filtered` holds indices into `options`; the functions below return
// positions within `filtered`.

fn is_enabled_at(options: &[ComboBoxOption], filtered: &[usize], pos: usize) -> bool {
    filtered
        .get(pos)
        .and_then(|i| options.get(*i))
        .map(ComboBoxOption::is_enabled)
        .unwrap_or(false)
}

/// First enabled position
pub fn first_enabled(options: &[ComboBoxOption], filtered: &[usize]) -> Option<usize> {
    (0..filtered.len()).find(|p| is_enabled_at(options, filtered, *p))
}

/// Last enabled position
pub fn last_enabled(options: &[ComboBoxOption], filtered: &[usize]) -> Option<usize> {
    (0..filtered.len())
        .rev()
        .find(|p| is_enabled_at(options, filtered, *p))
}

/// Next enabled position after `from`, if any
pub fn next_enabled(options: &[ComboBoxOption], filtered: &[usize], from: usize) -> Option<usize> {
    (from + 1..filtered.len()).find(|p| is_enabled_at(options, filtered, *p))
}

/// Previous enabled position before `from`, if any
pub fn previous_enabled(
    options: &[ComboBoxOption],
    filtered: &[usize],
    from: usize,
) -> Option<usize> {
    (0..from.min(filtered.len()))
        .rev()
        .find(|p| is_enabled_at(options, filtered, *p))
}

/// Whether the position holds an enabled option
pub fn is_selectable(options: &[ComboBoxOption], filtered: &[usize], pos: usize) -> bool {
    is_enabled_at(options, filtered, pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fruit() -> Vec<ComboBoxOption> {
        vec![
            ComboBoxOption::new("apple", "Apple"),
            ComboBoxOption::new("apricot", "Apricot"),
            ComboBoxOption::new("banana", "Banana"),
        ]
    }

    fn labels(options: &[ComboBoxOption], query: &str) -> Vec<String> {
        match_options(options, query)
            .into_iter()
            .map(|o| o.label.clone())
            .collect()
    }

    #[test]
    fn test_prefix_matches_keep_order() {
        assert_eq!(labels(&fruit(), "ap"), ["Apple", "Apricot"]);
    }

    #[test]
    fn test_no_matches() {
        assert!(filter_options(&fruit(), "xyz").is_empty());
    }

    #[test]
    fn test_empty_query_returns_everything() {
        assert_eq!(filter_options(&fruit(), ""), vec![0, 1, 2]);
        assert_eq!(filter_options(&fruit(), "   "), vec![0, 1, 2]);
    }

    #[test]
    fn test_prefix_ranks_before_substring() {
        let options = vec![
            ComboBoxOption::new("ba", "Banana"),
            ComboBoxOption::new("na", "Nashville"),
            ComboBoxOption::new("an", "Ananas"),
        ];
        // "Banana" and "Ananas" contain "na", "Nashville" starts with it
        assert_eq!(labels(&options, "na"), ["Nashville", "Banana", "Ananas"]);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(labels(&fruit(), "BAN"), ["Banana"]);
        assert_eq!(labels(&fruit(), "  aPr "), ["Apricot"]);
    }

    #[test]
    fn test_label_only() {
        // Values never match, only labels
        let options = vec![ComboBoxOption::new("us", "United States")];
        assert!(filter_options(&options, "us").is_empty());
        assert_eq!(filter_options(&options, "states"), vec![0]);
    }

    #[test]
    fn test_disabled_options_are_listed() {
        let options = vec![
            ComboBoxOption::new("apple", "Apple").disabled(),
            ComboBoxOption::new("apricot", "Apricot"),
        ];
        assert_eq!(filter_options(&options, "ap"), vec![0, 1]);
    }

    #[test]
    fn test_navigation_skips_disabled() {
        let options = vec![
            ComboBoxOption::new("a", "A").disabled(),
            ComboBoxOption::new("b", "B"),
            ComboBoxOption::new("c", "C").disabled(),
            ComboBoxOption::new("d", "D"),
            ComboBoxOption::new("e", "E").disabled(),
        ];
        let filtered = filter_options(&options, "");

        assert_eq!(first_enabled(&options, &filtered), Some(1));
        assert_eq!(last_enabled(&options, &filtered), Some(3));
        assert_eq!(next_enabled(&options, &filtered, 1), Some(3));
        assert_eq!(next_enabled(&options, &filtered, 3), None);
        assert_eq!(previous_enabled(&options, &filtered, 3), Some(1));
        assert_eq!(previous_enabled(&options, &filtered, 1), None);
        assert!(!is_selectable(&options, &filtered, 2));
        assert!(!is_selectable(&options, &filtered, 9));
    }

    #[test]
    fn test_navigation_on_empty() {
        let options = fruit();
        assert_eq!(first_enabled(&options, &[]), None);
        assert_eq!(last_enabled(&options, &[]), None);
        assert_eq!(previous_enabled(&options, &[], 4), None);
    }

    #[test]
    fn test_rank() {
        assert_eq!(rank("Apple", "ap"), Some(MatchRank::Prefix));
        assert_eq!(rank("Grape", "ap"), Some(MatchRank::Substring));
        assert_eq!(rank("Kiwi", "ap"), None);
        assert!(MatchRank::Prefix < MatchRank::Substring);
    }
}
