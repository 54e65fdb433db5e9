//! Listings cleanup and description pipeline.

use crate::charts::{self, Chart, ChartRenderer, LogChartRenderer};
use crate::config::ListingsConfig;
use crate::error::{Result, ResultExt};
use crate::listings::{ListingsCleaner, load_listings};
use crate::reporting::{DatasetOverview, DescriptiveReport, describe};
use crate::types::CleaningSummary;
use polars::prelude::*;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Load → clean → describe → five charts.
///
/// # Example
///
/// ```rust,ignore
/// use eda_pipelines::{JsonChartRenderer, ListingsConfig, ListingsPipeline};
/// use std::sync::Arc;
///
/// let report = ListingsPipeline::new(ListingsConfig::default())?
///     .with_renderer(Arc::new(JsonChartRenderer::to_directory("charts")))
///     .run("compressed_data.csv")?;
///
/// println!("{}", report.statistics);
/// ```
pub struct ListingsPipeline {
    config: ListingsConfig,
    cleaner: ListingsCleaner,
    renderer: Arc<dyn ChartRenderer>,
}

/// Everything the listings pipeline produced.
#[derive(Debug, Clone, Serialize)]
pub struct ListingsReport {
    pub overview_before: DatasetOverview,
    pub overview_after: DatasetOverview,
    pub cleaning: CleaningSummary,
    pub statistics: DescriptiveReport,
    pub charts: Vec<Chart>,
    pub duration_ms: u64,
    /// The cleaned table; kept in memory only.
    #[serde(skip)]
    pub data: DataFrame,
}

impl ListingsPipeline {
    /// Create a pipeline that logs its charts.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the configuration does not validate.
    pub fn new(config: ListingsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            cleaner: ListingsCleaner::new(&config),
            config,
            renderer: Arc::new(LogChartRenderer),
        })
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn ChartRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Read the CSV at `path` and run every stage on it.
    pub fn run(&self, path: impl AsRef<Path>) -> Result<ListingsReport> {
        let path = path.as_ref();
        let df = load_listings(path, &self.config)
            .context(format!("Loading listings from {}", path.display()))?;
        self.process(df)
    }

    /// Run every stage on an already loaded table. Stops at the first failure.
    pub fn process(&self, df: DataFrame) -> Result<ListingsReport> {
        self.process_internal(df).inspect_err(|e| error!("Listings pipeline error: {}", e))
    }

    fn process_internal(&self, df: DataFrame) -> Result<ListingsReport> {
        let start_time = Instant::now();
        info!("Starting listings pipeline...");

        let overview_before = DatasetOverview::from_frame(&df);
        info!(
            "Step 1: Loaded {} rows x {} columns ({} missing values)",
            overview_before.rows,
            overview_before.columns.len(),
            overview_before.total_nulls()
        );

        info!("Step 2: Cleaning...");
        let (data, cleaning) = self.cleaner.clean(df)?;
        let overview_after = DatasetOverview::from_frame(&data);

        info!("Step 3: Computing summary statistics...");
        let statistics = describe(&data)?;

        info!("Step 4: Building charts with '{}' renderer...", self.renderer.name());
        let builders: [(&str, fn(&DataFrame, &ListingsConfig) -> Result<Chart>); 5] = [
            ("price distribution", charts::listings::price_distribution),
            ("room types", |df, _| charts::listings::room_type_counts(df)),
            ("neighbourhood groups", |df, _| charts::listings::neighbourhood_counts(df)),
            ("price by room type", |df, _| charts::listings::price_by_room_type(df)),
            ("reviews over time", |df, _| charts::listings::reviews_over_time(df)),
        ];
        let mut rendered = Vec::with_capacity(builders.len());
        for (label, build) in builders {
            let chart = build(&data, &self.config).context(format!("Building {label} chart"))?;
            self.renderer.render(&chart)?;
            rendered.push(chart);
        }

        let duration_ms = start_time.elapsed().as_millis() as u64;
        info!(
            "Listings pipeline completed in {}ms: {} -> {} rows",
            duration_ms, cleaning.rows_before, cleaning.rows_after
        );

        Ok(ListingsReport {
            overview_before,
            overview_after,
            cleaning,
            statistics,
            charts: rendered,
            duration_ms,
            data,
        })
    }
}

impl fmt::Display for ListingsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== Raw data ==")?;
        writeln!(f, "{}", self.overview_before)?;
        writeln!(f, "== Cleaning ==")?;
        for action in &self.cleaning.actions {
            writeln!(f, "  - {action}")?;
        }
        writeln!(
            f,
            "Rows: {} -> {}  Columns: {} -> {}",
            self.cleaning.rows_before,
            self.cleaning.rows_after,
            self.cleaning.columns_before,
            self.cleaning.columns_after
        )?;
        writeln!(f)?;
        writeln!(f, "== Cleaned data ==")?;
        writeln!(f, "{}", self.overview_after)?;
        writeln!(f, "== Summary statistics ==")?;
        writeln!(f, "{}", self.statistics)?;
        writeln!(f, "== Charts ==")?;
        for chart in &self.charts {
            writeln!(f, "  {:<24} {}", chart.id, chart.kind.summary())?;
        }
        Ok(())
    }
}
