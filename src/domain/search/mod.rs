//! Search input handling.

pub mod filter;

pub use filter::{normalize, PriceRange, SearchFilter, TermsInput, SEARCH_RESULT_LIMIT};
