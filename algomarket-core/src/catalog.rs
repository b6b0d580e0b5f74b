//! Catalog browsing filters.

use crate::algorithm::Algorithm;

/// Which price class to show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PriceFilter {
    #[default]
    All,
    Free,
    Paid,
}

/// Search and filter settings of the catalog page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    /// Free-text query matched against title, description and tags.
    pub query: String,
    pub pricing: PriceFilter,
    /// Restrict to one language; `None` shows every language.
    pub language: Option<String>,
}

impl CatalogFilter {
    /// Returns `true` if `algorithm` passes every active criterion.
    ///
    /// Query matching is a case-insensitive substring search; a blank query
    /// matches everything.
    #[must_use]
    pub fn matches(&self, algorithm: &Algorithm) -> bool {
        let price_ok = match self.pricing {
            PriceFilter::All => true,
            PriceFilter::Free => !algorithm.is_paid,
            PriceFilter::Paid => algorithm.is_paid,
        };
        let language_ok = self
            .language
            .as_deref()
            .is_none_or(|lang| lang.eq_ignore_ascii_case(&algorithm.language));

        price_ok && language_ok && self.query_matches(algorithm)
    }

    fn query_matches(&self, algorithm: &Algorithm) -> bool {
        let needle = self.query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        algorithm.title.to_lowercase().contains(&needle)
            || algorithm.description.to_lowercase().contains(&needle)
            || algorithm.tags.iter().any(|t| t.to_lowercase().contains(&needle))
    }

    /// Filters `algorithms`, preserving their order.
    #[must_use]
    pub fn apply<'a>(&self, algorithms: &'a [Algorithm]) -> Vec<&'a Algorithm> {
        algorithms.iter().filter(|a| self.matches(a)).collect()
    }
}
