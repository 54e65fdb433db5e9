//! Summary statistics over the numeric columns of a table.

use crate::error::Result;
use crate::utils::{is_numeric_dtype, mean, numeric_values, quantile_sorted, sample_std, sorted};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// count / mean / std / min / quartiles / max of one numeric column.
///
/// Every field except `count` is `None` when the column has no values;
/// `std` is also `None` with a single value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStatistics {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl ColumnStatistics {
    pub fn from_series(series: &Series) -> Result<Self> {
        let values = numeric_values(series)?;
        let ordered = sorted(&values);
        Ok(Self {
            column: series.name().to_string(),
            count: values.len(),
            mean: mean(&values),
            std: sample_std(&values),
            min: ordered.first().copied(),
            q25: quantile_sorted(&ordered, 0.25),
            median: quantile_sorted(&ordered, 0.5),
            q75: quantile_sorted(&ordered, 0.75),
            max: ordered.last().copied(),
        })
    }
}

/// Descriptive statistics for every numeric column, in column order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DescriptiveReport {
    pub columns: Vec<ColumnStatistics>,
}

impl DescriptiveReport {
    pub fn get(&self, column: &str) -> Option<&ColumnStatistics> {
        self.columns.iter().find(|c| c.column == column)
    }
}

/// Compute [`DescriptiveReport`] over the integer and float columns of `df`.
///
/// Non-numeric columns (text, dates, booleans) are skipped.
pub fn describe(df: &DataFrame) -> Result<DescriptiveReport> {
    let columns = df
        .get_columns()
        .iter()
        .map(|c| c.as_materialized_series())
        .filter(|s| is_numeric_dtype(s.dtype()))
        .map(ColumnStatistics::from_series)
        .collect::<Result<Vec<_>>>()?;
    Ok(DescriptiveReport { columns })
}

fn cell(value: Option<f64>) -> String {
    value.map_or_else(|| "NaN".to_string(), |v| format!("{v:.2}"))
}

impl fmt::Display for DescriptiveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<22} {:>8} {:>12} {:>12} {:>10} {:>10} {:>10} {:>10} {:>12}",
            "Column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
        )?;
        writeln!(f, "{}", "-".repeat(112))?;
        for s in &self.columns {
            writeln!(
                f,
                "{:<22} {:>8} {:>12} {:>12} {:>10} {:>10} {:>10} {:>10} {:>12}",
                truncate(&s.column, 21),
                s.count,
                cell(s.mean),
                cell(s.std),
                cell(s.min),
                cell(s.q25),
                cell(s.median),
                cell(s.q75),
                cell(s.max)
            )?;
        }
        Ok(())
    }
}

/// Truncate a string to max length with ellipsis.
pub(crate) fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{head}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_matches_pandas_semantics() {
        let df = df!(
            "price" => [Some(100.0), Some(200.0), None, Some(300.0), Some(400.0)],
            "room type" => ["a", "b", "c", "d", "e"],
            "minimum nights" => [1i64, 2, 3, 4, 5]
        )
        .unwrap();

        let report = describe(&df).unwrap();
        assert_eq!(report.columns.len(), 2);

        let price = report.get("price").unwrap();
        assert_eq!(price.count, 4);
        assert_eq!(price.mean, Some(250.0));
        assert!((price.std.unwrap() - 129.0994).abs() < 1e-3);
        assert_eq!(price.min, Some(100.0));
        assert_eq!(price.q25, Some(175.0));
        assert_eq!(price.median, Some(250.0));
        assert_eq!(price.q75, Some(325.0));
        assert_eq!(price.max, Some(400.0));

        let nights = report.get("minimum nights").unwrap();
        assert_eq!(nights.median, Some(3.0));
        assert!(report.get("room type").is_none());
    }

    #[test]
    fn test_describe_empty_column() {
        let df = df!("fee" => [None::<f64>, None]).unwrap();
        let report = describe(&df).unwrap();
        let fee = report.get("fee").unwrap();
        assert_eq!(fee.count, 0);
        assert_eq!(fee.mean, None);
        assert_eq!(fee.std, None);
        assert_eq!(fee.max, None);
    }

    #[test]
    fn test_display_renders_every_column() {
        let df = df!("price" => [1.0, 2.0], "service fee" => [0.5, 0.25]).unwrap();
        let text = describe(&df).unwrap().to_string();
        assert!(text.contains("price"));
        assert!(text.contains("service fee"));
        assert!(text.contains("25%"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("calculated host listings count", 12), "calculate...");
    }
}
