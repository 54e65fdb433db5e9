//! Search-trends querying.
//!
//! A [`TrendsProvider`] fetches raw interest scores; [`TrendsClient`] turns
//! them into polars tables:
//!
//! - region-interest table: `geoName` plus one `Int64` column per keyword
//! - time-series table: `date` plus one `Int64` column per keyword plus `isPartial`

mod client;
#[cfg(feature = "google")]
mod google;
mod provider;

pub use client::{TrendsClient, top_regions};
#[cfg(feature = "google")]
pub use google::GoogleTrendsProvider;
pub use provider::{TrendsProvider, TrendsQuery};

/// Region name column of the region-interest table.
pub const GEO_NAME_COLUMN: &str = "geoName";

/// Bucket start column of the time-series table.
pub const DATE_COLUMN: &str = "date";

/// Flags the last, still-open bucket of the time-series table.
pub const IS_PARTIAL_COLUMN: &str = "isPartial";

/// Keywords accepted by one comparison query.
pub const MAX_KEYWORDS: usize = 5;
