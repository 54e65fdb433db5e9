//! Exploratory Data Analysis Pipelines
//!
//! Two linear load → clean → aggregate → chart pipelines built on Polars.
//!
//! # Overview
//!
//! - **Listings cleanup**: loads a rental listings CSV, parses review dates,
//!   imputes missing review data, drops unnamed rows and free-text columns,
//!   strips currency formatting, removes duplicates, then computes summary
//!   statistics and five descriptive charts
//! - **Trend snapshot**: queries a search-trends service for one keyword,
//!   ranks regions by interest, charts the top regions and the keyword over
//!   time, then compares several keywords on one timeline
//!
//! Charts are produced as serializable [`Chart`] specs and handed to a
//! [`ChartRenderer`]; nothing is rasterized here.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use eda_pipelines::{ListingsConfig, ListingsPipeline};
//!
//! let report = ListingsPipeline::new(ListingsConfig::default())?
//!     .run("compressed_data.csv")?;
//!
//! println!("{report}");
//! ```
//!
//! # Trends Providers
//!
//! Trend data comes through the [`trends::TrendsProvider`] trait. With the
//! default `google` feature, [`trends::GoogleTrendsProvider`] talks to the
//! public Google Trends endpoints:
//!
//! ```rust,ignore
//! use eda_pipelines::{GoogleTrendsProvider, TrendsClient, TrendsConfig, TrendsSnapshot};
//!
//! let config = TrendsConfig::builder().top_regions(10).build()?;
//! let provider = GoogleTrendsProvider::new(&config)?;
//! let report = TrendsSnapshot::new(TrendsClient::new(provider, config))
//!     .run("cricket", &["cricket", "data science"])?;
//! ```

pub mod charts;
pub mod config;
pub mod error;
pub mod listings;
pub mod pipeline;
pub mod reporting;
pub mod trends;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use charts::{Chart, ChartKind, ChartRenderer, JsonChartRenderer, LogChartRenderer};
pub use config::{ConfigValidationError, ListingsConfig, TrendsConfig};
pub use error::{EdaError, Result as EdaResult, ResultExt};
pub use listings::{ListingsCleaner, load_listings};
pub use pipeline::{ListingsPipeline, ListingsReport, TrendsReport, TrendsSnapshot};
pub use reporting::{DatasetOverview, DescriptiveReport, describe};
#[cfg(feature = "google")]
pub use trends::GoogleTrendsProvider;
pub use trends::{TrendsClient, TrendsProvider, TrendsQuery};
pub use types::{CleaningSummary, RegionInterest, TimelinePoint};
