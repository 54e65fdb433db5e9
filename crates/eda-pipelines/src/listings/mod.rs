//! Listings table loading and cleaning.
//!
//! - [`load_listings`] reads the CSV with fallback strategies
//! - [`ListingsCleaner`] applies the ordered cleaning steps

mod cleaner;
mod loader;

pub use cleaner::ListingsCleaner;
pub use loader::{load_listings, read_listings_str};
