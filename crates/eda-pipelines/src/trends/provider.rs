//! Trends provider trait for abstracting the search-interest service.
//!
//! # Implementing a New Provider
//!
//! 1. Create a new file in `src/trends/` (e.g., `cached.rs`)
//! 2. Implement [`TrendsProvider`] for your struct
//! 3. Export it from `src/trends/mod.rs`
//!
//! Tests use an in-memory provider to drive the pipeline without the network.

use crate::config::TrendsConfig;
use crate::error::Result;
use crate::types::{RegionInterest, TimelinePoint};
use serde::{Deserialize, Serialize};

/// Parameters of one trends request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendsQuery {
    /// Up to five keywords compared against each other.
    pub keywords: Vec<String>,
    pub category: u32,
    pub timeframe: String,
    pub geo: String,
    pub property: String,
}

impl TrendsQuery {
    /// Build a query for `keywords` using the window and filters from `config`.
    pub fn new<I, S>(keywords: I, config: &TrendsConfig) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords.into_iter().map(Into::into).collect(),
            category: config.category,
            timeframe: config.timeframe.clone(),
            geo: config.geo.clone(),
            property: config.property.clone(),
        }
    }
}

/// A source of search-interest data.
///
/// Both methods return one value per keyword in `query.keywords` order.
/// Any failure (transport, status, malformed body) is returned as an error;
/// implementations do not retry.
pub trait TrendsProvider {
    /// Interest score per region for the query window.
    fn interest_by_region(&self, query: &TrendsQuery) -> Result<Vec<RegionInterest>>;

    /// Interest score per time bucket for the query window.
    fn interest_over_time(&self, query: &TrendsQuery) -> Result<Vec<TimelinePoint>>;

    /// Provider name for logging.
    fn name(&self) -> &str;
}
