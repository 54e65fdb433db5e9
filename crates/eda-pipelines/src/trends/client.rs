//! Conversion of provider responses into region and time-series tables.

use super::provider::{TrendsProvider, TrendsQuery};
use super::{DATE_COLUMN, GEO_NAME_COLUMN, IS_PARTIAL_COLUMN, MAX_KEYWORDS};
use crate::config::TrendsConfig;
use crate::error::{EdaError, Result, ResultExt};
use crate::utils::{date_series, require_column};
use polars::prelude::*;
use std::collections::HashSet;
use tracing::{debug, info};

/// Queries a [`TrendsProvider`] and returns polars tables.
pub struct TrendsClient<P: TrendsProvider> {
    provider: P,
    config: TrendsConfig,
}

impl<P: TrendsProvider> TrendsClient<P> {
    pub fn new(provider: P, config: TrendsConfig) -> Self {
        Self { provider, config }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn config(&self) -> &TrendsConfig {
        &self.config
    }

    /// Interest per region for one keyword, in service order.
    pub fn interest_by_region(&self, keyword: &str) -> Result<DataFrame> {
        let query = self.query(&[keyword])?;
        let regions = self
            .provider
            .interest_by_region(&query)
            .context(format!("{} region query for '{keyword}'", self.provider.name()))?;
        info!("Received interest for {} regions", regions.len());

        let names: Vec<String> = regions.iter().map(|r| r.geo_name.clone()).collect();
        let mut columns = vec![Column::new(GEO_NAME_COLUMN.into(), names)];
        for (idx, keyword) in query.keywords.iter().enumerate() {
            let scores = regions
                .iter()
                .map(|r| score(&r.values, idx, &r.geo_name))
                .collect::<Result<Vec<_>>>()?;
            columns.push(Column::new(keyword.as_str().into(), scores));
        }
        Ok(DataFrame::new(columns)?)
    }

    /// Interest over time for up to five keywords on one shared date index.
    pub fn interest_over_time<S: AsRef<str>>(&self, keywords: &[S]) -> Result<DataFrame> {
        let query = self.query(keywords)?;
        let points = self
            .provider
            .interest_over_time(&query)
            .context(format!(
                "{} timeline query for {:?}",
                self.provider.name(),
                query.keywords
            ))?;
        debug!("Received {} time buckets", points.len());

        let dates: Vec<_> = points.iter().map(|p| Some(p.date)).collect();
        let mut columns = vec![date_series(DATE_COLUMN.into(), &dates)?.into_column()];
        for (idx, keyword) in query.keywords.iter().enumerate() {
            let scores = points
                .iter()
                .map(|p| score(&p.values, idx, &p.date.to_string()))
                .collect::<Result<Vec<_>>>()?;
            columns.push(Column::new(keyword.as_str().into(), scores));
        }
        let partial: Vec<bool> = points.iter().map(|p| p.is_partial).collect();
        columns.push(Column::new(IS_PARTIAL_COLUMN.into(), partial));
        Ok(DataFrame::new(columns)?)
    }

    /// Rank regions by `keyword` and keep the configured number (15 by default).
    pub fn top_regions(&self, regions: &DataFrame, keyword: &str) -> Result<DataFrame> {
        top_regions(regions, keyword, self.config.top_regions)
    }

    fn query<S: AsRef<str>>(&self, keywords: &[S]) -> Result<TrendsQuery> {
        if keywords.is_empty() || keywords.len() > MAX_KEYWORDS {
            return Err(EdaError::InvalidConfig(format!(
                "expected 1 to {MAX_KEYWORDS} keywords, got {}",
                keywords.len()
            )));
        }
        let mut seen = HashSet::new();
        for keyword in keywords {
            let keyword = keyword.as_ref();
            if keyword.trim().is_empty() {
                return Err(EdaError::InvalidConfig("keyword must not be empty".to_string()));
            }
            if !seen.insert(keyword) {
                return Err(EdaError::InvalidConfig(format!("duplicate keyword '{keyword}'")));
            }
        }
        Ok(TrendsQuery::new(
            keywords.iter().map(|k| k.as_ref().to_string()),
            &self.config,
        ))
    }
}

fn score(values: &[i64], idx: usize, row: &str) -> Result<i64> {
    values.get(idx).copied().ok_or_else(|| {
        EdaError::UnexpectedResponse(format!("'{row}' is missing keyword value {idx}"))
    })
}

/// The `n` rows with the highest `keyword` score, descending.
///
/// Ties keep their original order; null scores sort last.
pub fn top_regions(regions: &DataFrame, keyword: &str, n: usize) -> Result<DataFrame> {
    require_column(regions, keyword)?;
    let sorted = regions.sort(
        [keyword],
        SortMultipleOptions::default()
            .with_order_descending(true)
            .with_nulls_last(true)
            .with_maintain_order(true),
    )?;
    Ok(sorted.head(Some(n)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RegionInterest, TimelinePoint};
    use chrono::NaiveDate;

    /// Serves canned responses sized to the query.
    struct StaticProvider {
        regions: usize,
        buckets: u32,
    }

    impl TrendsProvider for StaticProvider {
        fn interest_by_region(&self, query: &TrendsQuery) -> Result<Vec<RegionInterest>> {
            Ok((0..self.regions)
                .map(|i| RegionInterest {
                    geo_code: format!("R{i}"),
                    geo_name: format!("Region {i}"),
                    values: vec![((i * 37) % 101) as i64; query.keywords.len()],
                })
                .collect())
        }

        fn interest_over_time(&self, query: &TrendsQuery) -> Result<Vec<TimelinePoint>> {
            let start = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
            Ok((0..self.buckets)
                .map(|w| TimelinePoint {
                    date: start + chrono::Days::new(u64::from(w) * 7),
                    values: (0..query.keywords.len() as i64)
                        .map(|k| k * 10 + i64::from(w))
                        .collect(),
                    is_partial: w + 1 == self.buckets,
                })
                .collect())
        }

        fn name(&self) -> &str {
            "static"
        }
    }

    fn client(regions: usize, buckets: u32) -> TrendsClient<StaticProvider> {
        TrendsClient::new(StaticProvider { regions, buckets }, TrendsConfig::default())
    }

    #[test]
    fn test_region_table_shape() {
        let df = client(4, 0).interest_by_region("cricket").unwrap();
        assert_eq!(df.get_column_names_str(), ["geoName", "cricket"]);
        assert_eq!(df.column("cricket").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.height(), 4);
    }

    #[test]
    fn test_top_regions_truncates_and_ranks() {
        let client = client(40, 0);
        let all = client.interest_by_region("cricket").unwrap();
        let top = client.top_regions(&all, "cricket").unwrap();
        assert_eq!(top.height(), 15);

        let scores: Vec<i64> = top
            .column("cricket")
            .unwrap()
            .as_materialized_series()
            .i64()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_top_regions_stable_ties() {
        let df = df!(
            "geoName" => ["A", "B", "C", "D"],
            "cricket" => [50i64, 90, 50, 50]
        )
        .unwrap();
        let top = top_regions(&df, "cricket", 3).unwrap();
        let names: Vec<&str> = top
            .column("geoName")
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(names, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_top_regions_missing_keyword() {
        let df = df!("geoName" => ["A"], "cricket" => [1i64]).unwrap();
        let err = top_regions(&df, "tennis", 15).unwrap_err();
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
    }

    #[test]
    fn test_time_series_table() {
        let keywords = ["cricket", "data science", "machine learning"];
        let df = client(0, 6).interest_over_time(&keywords).unwrap();
        assert_eq!(
            df.get_column_names_str(),
            ["date", "cricket", "data science", "machine learning", "isPartial"]
        );
        assert_eq!(df.height(), 6);
        assert_eq!(df.column("date").unwrap().dtype(), &DataType::Date);

        let partial = df
            .column("isPartial")
            .unwrap()
            .as_materialized_series()
            .bool()
            .unwrap()
            .clone();
        assert_eq!(partial.get(5), Some(true));
        assert_eq!(partial.get(0), Some(false));
    }

    #[test]
    fn test_keyword_validation() {
        let client = client(1, 1);
        let none: [&str; 0] = [];
        assert!(client.interest_over_time(&none).is_err());
        assert!(client.interest_over_time(&["a", "b", "c", "d", "e", "f"]).is_err());
        assert!(client.interest_over_time(&["a", "a"]).is_err());
        assert!(client.interest_by_region(" ").is_err());
    }
}
