//! Pipeline module.
//!
//! The two end-to-end pipelines. Each runs its stages in a fixed order,
//! renders charts as it goes and stops at the first error.

mod listings;
mod trends;

pub use listings::{ListingsPipeline, ListingsReport};
pub use trends::{TrendsReport, TrendsSnapshot};
