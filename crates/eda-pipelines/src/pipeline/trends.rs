//! Trend snapshot pipeline.

use crate::charts::{self, Bar, Chart, ChartKind, ChartRenderer, LogChartRenderer};
use crate::error::{Result, ResultExt};
use crate::trends::{IS_PARTIAL_COLUMN, TrendsClient, TrendsProvider};
use polars::prelude::*;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Regions → top regions charts → keyword timeline → keyword comparison.
///
/// # Example
///
/// ```rust,ignore
/// use eda_pipelines::{GoogleTrendsProvider, TrendsClient, TrendsConfig, TrendsSnapshot};
///
/// let config = TrendsConfig::default();
/// let client = TrendsClient::new(GoogleTrendsProvider::new(&config)?, config);
/// let report = TrendsSnapshot::new(client)
///     .run("cricket", &["cricket", "data science", "machine learning"])?;
/// ```
pub struct TrendsSnapshot<P: TrendsProvider> {
    client: TrendsClient<P>,
    renderer: Arc<dyn ChartRenderer>,
}

/// Everything the trend snapshot produced.
#[derive(Debug, Clone, Serialize)]
pub struct TrendsReport {
    pub keyword: String,
    pub compared: Vec<String>,
    /// Regions in ranked order with their score.
    pub top_regions: Vec<Bar>,
    /// Number of time buckets in the keyword timeline.
    pub buckets: usize,
    /// Whether the last bucket is still open.
    pub last_bucket_partial: bool,
    pub charts: Vec<Chart>,
    pub duration_ms: u64,
    #[serde(skip)]
    pub regions: DataFrame,
    #[serde(skip)]
    pub timeline: DataFrame,
    #[serde(skip)]
    pub comparison: DataFrame,
}

impl<P: TrendsProvider> TrendsSnapshot<P> {
    /// Create a snapshot pipeline that logs its charts.
    pub fn new(client: TrendsClient<P>) -> Self {
        Self {
            client,
            renderer: Arc::new(LogChartRenderer),
        }
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn ChartRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Query and chart `keyword`, then compare `compared` over time.
    ///
    /// Any service failure aborts the run; nothing is retried.
    pub fn run<S: AsRef<str>>(&self, keyword: &str, compared: &[S]) -> Result<TrendsReport> {
        self.run_internal(keyword, compared)
            .inspect_err(|e| error!("Trends pipeline error: {}", e))
    }

    fn run_internal<S: AsRef<str>>(&self, keyword: &str, compared: &[S]) -> Result<TrendsReport> {
        let start_time = Instant::now();
        info!("Starting trend snapshot for '{}'...", keyword);
        let mut rendered = Vec::with_capacity(4);

        info!("Step 1: Interest by region...");
        let all_regions = self.client.interest_by_region(keyword)?;
        let regions = self.client.top_regions(&all_regions, keyword)?;
        info!("Kept top {} of {} regions", regions.height(), all_regions.height());

        let bar = charts::trends::top_regions_bar(&regions, keyword)?;
        let top_regions = match &bar.kind {
            ChartKind::Bar { bars, .. } => bars.clone(),
            _ => Vec::new(),
        };
        self.emit(bar, &mut rendered)?;
        self.emit(charts::trends::region_choropleth(&regions, keyword)?, &mut rendered)?;

        info!("Step 2: Interest over time...");
        let timeline = self.client.interest_over_time(&[keyword])?;
        self.emit(charts::trends::interest_line(&timeline, keyword)?, &mut rendered)?;
        let last_bucket_partial = last_bucket_partial(&timeline)?;
        if last_bucket_partial {
            warn!("The most recent bucket for '{}' is still partial", keyword);
        }

        info!("Step 3: Keyword comparison...");
        let comparison = self
            .client
            .interest_over_time(compared)
            .context("Keyword comparison")?;
        let chart = charts::trends::keyword_comparison(&comparison, compared)?;
        self.emit(chart, &mut rendered)?;

        let duration_ms = start_time.elapsed().as_millis() as u64;
        info!("Trend snapshot completed in {}ms", duration_ms);

        Ok(TrendsReport {
            keyword: keyword.to_string(),
            compared: compared.iter().map(|k| k.as_ref().to_string()).collect(),
            top_regions,
            buckets: timeline.height(),
            last_bucket_partial,
            charts: rendered,
            duration_ms,
            regions,
            timeline,
            comparison,
        })
    }

    fn emit(&self, chart: Chart, charts: &mut Vec<Chart>) -> Result<()> {
        self.renderer.render(&chart)?;
        charts.push(chart);
        Ok(())
    }
}

fn last_bucket_partial(timeline: &DataFrame) -> Result<bool> {
    let Some(flags) = timeline.column(IS_PARTIAL_COLUMN).ok() else {
        return Ok(false);
    };
    let flags = flags.as_materialized_series().bool()?;
    Ok(!flags.is_empty() && flags.get(flags.len() - 1).unwrap_or(false))
}

impl fmt::Display for TrendsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== Top regions for '{}' ==", self.keyword)?;
        for (rank, region) in self.top_regions.iter().enumerate() {
            writeln!(f, "{:>3}. {:<32} {:>5.0}", rank + 1, region.label, region.value)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "Timeline: {} buckets{}",
            self.buckets,
            if self.last_bucket_partial { " (last one partial)" } else { "" }
        )?;
        writeln!(f, "Compared: {}", self.compared.join(", "))?;
        writeln!(f)?;
        writeln!(f, "== Charts ==")?;
        for chart in &self.charts {
            writeln!(f, "  {:<32} {}", chart.id, chart.kind.summary())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrendsConfig;
    use crate::error::EdaError;
    use crate::trends::TrendsQuery;
    use crate::types::{RegionInterest, TimelinePoint};
    use chrono::NaiveDate;

    struct CannedProvider;

    impl TrendsProvider for CannedProvider {
        fn interest_by_region(&self, query: &TrendsQuery) -> Result<Vec<RegionInterest>> {
            Ok((0..20)
                .map(|i| RegionInterest {
                    geo_code: String::new(),
                    geo_name: format!("Country {i}"),
                    values: vec![i * 5; query.keywords.len()],
                })
                .collect())
        }

        fn interest_over_time(&self, query: &TrendsQuery) -> Result<Vec<TimelinePoint>> {
            Ok((1..=4)
                .map(|d| TimelinePoint {
                    date: NaiveDate::from_ymd_opt(2024, 3, d * 7).unwrap(),
                    values: vec![50; query.keywords.len()],
                    is_partial: d == 4,
                })
                .collect())
        }

        fn name(&self) -> &str {
            "canned"
        }
    }

    struct OfflineProvider;

    impl TrendsProvider for OfflineProvider {
        fn interest_by_region(&self, _query: &TrendsQuery) -> Result<Vec<RegionInterest>> {
            Err(EdaError::UnexpectedResponse("429 Too Many Requests".to_string()))
        }

        fn interest_over_time(&self, _query: &TrendsQuery) -> Result<Vec<TimelinePoint>> {
            Err(EdaError::UnexpectedResponse("429 Too Many Requests".to_string()))
        }

        fn name(&self) -> &str {
            "offline"
        }
    }

    #[test]
    fn test_snapshot_builds_four_charts() {
        let client = TrendsClient::new(CannedProvider, TrendsConfig::default());
        let snapshot = TrendsSnapshot::new(client);
        let report = snapshot
            .run("cricket", &["cricket", "data science", "machine learning"])
            .unwrap();

        let ids: Vec<&str> = report.charts.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "top_regions_cricket",
                "region_map_cricket",
                "interest_over_time_cricket",
                "keyword_comparison",
            ]
        );
        assert_eq!(report.top_regions.len(), 15);
        assert_eq!(report.top_regions[0].label, "Country 19");
        assert_eq!(report.buckets, 4);
        assert!(report.last_bucket_partial);
        assert_eq!(report.comparison.width(), 5);
    }

    #[test]
    fn test_service_failure_is_fatal() {
        let client = TrendsClient::new(OfflineProvider, TrendsConfig::default());
        let snapshot = TrendsSnapshot::new(client);
        let err = snapshot.run("cricket", &["cricket"]).unwrap_err();
        assert!(err.is_remote());
    }
}
