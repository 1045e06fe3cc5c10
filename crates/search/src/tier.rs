use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// How a field matched the search term. Declaration order is rank order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    Exact,
    Prefix,
    Substring,
}

impl MatchTier {
    /// Classifies an already-lowercased `value` against a lowercased `needle`.
    pub fn classify(value: &str, needle: &str) -> Option<Self> {
        if value == needle {
            Some(Self::Exact)
        } else if value.starts_with(needle) {
            Some(Self::Prefix)
        } else if value.contains(needle) {
            Some(Self::Substring)
        } else {
            None
        }
    }
}

/// Sort direction requested by the list page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// Reads a backend-style ordering parameter (`nome`, `-nome`, ...).
    pub fn from_ordering(ordering: &str) -> Self {
        if ordering.trim_start().starts_with('-') {
            Self::Descending
        } else {
            Self::Ascending
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    /// Applies the direction to an ascending comparison.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

/// A trimmed, lowercased search term.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchTerm {
    lowered: String,
}

impl SearchTerm {
    pub fn new(raw: &str) -> Self {
        Self {
            lowered: raw.trim().to_lowercase(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lowered.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.lowered
    }

    /// Tier of `value` for this term. An empty term matches nothing.
    pub fn tier(&self, value: &str) -> Option<MatchTier> {
        if self.is_empty() {
            return None;
        }
        MatchTier::classify(&value.to_lowercase(), &self.lowered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_follows_priority() {
        assert_eq!(MatchTier::classify("desc", "desc"), Some(MatchTier::Exact));
        assert_eq!(MatchTier::classify("desc5", "desc"), Some(MatchTier::Prefix));
        assert_eq!(
            MatchTier::classify("promo-desc", "desc"),
            Some(MatchTier::Substring)
        );
        assert_eq!(MatchTier::classify("natal", "desc"), None);
    }

    #[test]
    fn term_is_case_insensitive_and_trimmed() {
        let term = SearchTerm::new("  DeSc ");
        assert_eq!(term.as_str(), "desc");
        assert_eq!(term.tier("DESCONTO10"), Some(MatchTier::Prefix));
    }

    #[test]
    fn ordering_parameter_sets_direction() {
        assert_eq!(SortDirection::from_ordering("codigo"), SortDirection::Ascending);
        assert_eq!(SortDirection::from_ordering("-codigo"), SortDirection::Descending);
        assert_eq!(
            SortDirection::Descending.reversed(),
            SortDirection::Ascending
        );
    }
}
