//! Normalization of loosely-typed search input into a canonical filter.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

/// Number of products a search returns at most.
pub const SEARCH_RESULT_LIMIT: usize = 15;

/// A request field that may be absent, a single string, or a list of strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum TermsInput {
    #[default]
    Absent,
    Single(String),
    List(Vec<String>),
    /// Any other JSON shape. Normalizes to no terms.
    Unrecognized,
}

impl From<JsonValue> for TermsInput {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => TermsInput::Absent,
            JsonValue::String(s) => TermsInput::Single(s),
            JsonValue::Array(items) => TermsInput::List(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        JsonValue::String(s) => Some(s),
                        _ => None,
                    })
                    .collect(),
            ),
            _ => TermsInput::Unrecognized,
        }
    }
}

impl<'de> Deserialize<'de> for TermsInput {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        JsonValue::deserialize(deserializer).map(TermsInput::from)
    }
}

impl TermsInput {
    /// Resolves the input into its terms, dropping empty strings and keeping order.
    pub fn into_terms(self) -> Vec<String> {
        match self {
            TermsInput::Absent | TermsInput::Unrecognized => Vec::new(),
            TermsInput::Single(s) if s.is_empty() => Vec::new(),
            TermsInput::Single(s) => vec![s],
            TermsInput::List(items) => items.into_iter().filter(|s| !s.is_empty()).collect(),
        }
    }
}

/// Raw `{min, max}` price bounds. Non-positive values mean "unset".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PriceRange {
    #[serde(default, deserialize_with = "crate::domain::null_as_default")]
    pub min: f64,
    #[serde(default, deserialize_with = "crate::domain::null_as_default")]
    pub max: f64,
}

/// Canonical search parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchFilter {
    pub categories: Vec<String>,
    pub brands: Vec<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Case-insensitive substring matched against name or description. Empty disables it.
    pub search_text: String,
    pub limit: usize,
}

impl SearchFilter {
    pub fn has_text(&self) -> bool {
        !self.search_text.is_empty()
    }

    /// Whether `price` falls inside the (inclusive) bounds of this filter.
    pub fn price_in_range(&self, price: f64) -> bool {
        self.min_price.map_or(true, |min| price >= min)
            && self.max_price.map_or(true, |max| price <= max)
    }
}

/// Builds a [`SearchFilter`]. Never fails: unknown shapes become empty term sets.
pub fn normalize(
    raw_category: TermsInput,
    raw_brand: TermsInput,
    raw_price_range: Option<PriceRange>,
    raw_search_text: String,
) -> SearchFilter {
    let range = raw_price_range.unwrap_or_default();
    SearchFilter {
        categories: raw_category.into_terms(),
        brands: raw_brand.into_terms(),
        min_price: positive(range.min),
        max_price: positive(range.max),
        search_text: raw_search_text,
        limit: SEARCH_RESULT_LIMIT,
    }
}

fn positive(bound: f64) -> Option<f64> {
    (bound > 0.0).then_some(bound)
}
