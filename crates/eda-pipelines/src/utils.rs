//! Shared helpers for the pipelines.
//!
//! Parsing of currency and date cells, dtype checks, and the small
//! descriptive-statistics kernels used by reports and charts.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a date or datetime type.
#[inline]
pub fn is_temporal_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Datetime(_, _) | DataType::Date)
}

/// Fetch a column as a materialized Series, mapping absence to a typed error.
pub fn require_column<'a>(df: &'a DataFrame, name: &str) -> crate::error::Result<&'a Series> {
    df.column(name)
        .map(|c| c.as_materialized_series())
        .map_err(|_| crate::error::EdaError::ColumnNotFound(name.to_string()))
}

// =============================================================================
// String Parsing Utilities
// =============================================================================

/// Currency decoration removed before parsing: the dollar sign and thousands separators.
static CURRENCY_DECORATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[$,]").expect("Invalid regex: currency decoration"));

/// Plain non-negative decimal, what must remain once decoration is gone.
static PLAIN_DECIMAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(\.\d*)?$|^\.\d+$").expect("Invalid regex: plain decimal"));

/// Outcome of parsing one currency cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CurrencyCell {
    /// Empty or whitespace-only, treated as missing.
    Missing,
    Amount(f64),
    Malformed,
}

/// Strip `$` and `,` from a currency string and parse it.
///
/// # Example
///
/// ```rust,ignore
/// assert_eq!(parse_currency("$1,200.50"), CurrencyCell::Amount(1200.5));
/// assert_eq!(parse_currency("$12x"), CurrencyCell::Malformed);
/// ```
pub fn parse_currency(raw: &str) -> CurrencyCell {
    let stripped = CURRENCY_DECORATION.replace_all(raw, "");
    let trimmed = stripped.trim();
    if trimmed.is_empty() {
        return if raw.trim().is_empty() {
            CurrencyCell::Missing
        } else {
            // "$" or "," alone
            CurrencyCell::Malformed
        };
    }
    if !PLAIN_DECIMAL.is_match(trimmed) {
        return CurrencyCell::Malformed;
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => CurrencyCell::Amount(value),
        _ => CurrencyCell::Malformed,
    }
}

/// Date-time layouts accepted in addition to the configured date formats.
/// Only the date part is kept.
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M"];

/// Parse a date cell with the given formats; `None` when nothing matches.
///
/// chrono's `%Y` also accepts one to three digits, so a `%Y` match below
/// year 1000 is skipped and later formats (such as `%m/%d/%y`) are tried.
pub fn parse_date<S: AsRef<str>>(raw: &str, formats: &[S]) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    formats
        .iter()
        .find_map(|fmt| {
            let fmt = fmt.as_ref();
            NaiveDate::parse_from_str(trimmed, fmt)
                .ok()
                .filter(|date| !fmt.contains("%Y") || date.year() >= 1000)
        })
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
                .map(|dt| dt.date())
        })
}

// =============================================================================
// Date Conversion Utilities
// =============================================================================

fn unix_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}

/// Days since the Unix epoch, the physical representation of a polars `Date`.
pub fn date_to_days(date: NaiveDate) -> i32 {
    (date - unix_epoch()).num_days() as i32
}

/// Inverse of [`date_to_days`].
pub fn days_to_date(days: i32) -> NaiveDate {
    unix_epoch() + chrono::Duration::days(days as i64)
}

/// Build a polars `Date` series from optional dates.
pub fn date_series(name: PlSmallStr, dates: &[Option<NaiveDate>]) -> PolarsResult<Series> {
    let days: Vec<Option<i32>> = dates.iter().map(|d| d.map(date_to_days)).collect();
    Series::new(name, days).cast(&DataType::Date)
}

/// Read a `Date` (or `Datetime`) series back into optional dates.
pub fn series_dates(series: &Series) -> PolarsResult<Vec<Option<NaiveDate>>> {
    let as_date = match series.dtype() {
        DataType::Date => series.clone(),
        _ => series.cast(&DataType::Date)?,
    };
    let days = as_date.cast(&DataType::Int32)?;
    Ok(days.i32()?.into_iter().map(|d| d.map(days_to_date)).collect())
}

// =============================================================================
// Series Statistics Utilities
// =============================================================================

/// Non-null values of a numeric series as `f64`, in row order.
pub fn numeric_values(series: &Series) -> PolarsResult<Vec<f64>> {
    let floats = series.cast(&DataType::Float64)?;
    Ok(floats.f64()?.into_iter().flatten().collect())
}

/// Values of any series rendered as strings; nulls stay `None`.
pub fn string_values(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    let strings = match series.dtype() {
        DataType::String => series.clone(),
        _ => series.cast(&DataType::String)?,
    };
    Ok(strings
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (ddof = 1). `None` for fewer than two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() as f64 - 1.0);
    Some(variance.sqrt())
}

/// Quantile of an ascending slice using linear interpolation between closest ranks.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

/// Sort a copy of the values ascending (NaN-free input assumed).
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(|a, b| a.total_cmp(b));
    out
}

/// Count non-null values, categories listed in order of first appearance.
pub fn counts_by_appearance(values: &[Option<String>]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for value in values.iter().flatten() {
        match counts.iter_mut().find(|(k, _)| k == value) {
            Some((_, n)) => *n += 1,
            None => counts.push((value.clone(), 1)),
        }
    }
    counts
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_currency() {
        assert_eq!(parse_currency("$1,200.50"), CurrencyCell::Amount(1200.5));
        assert_eq!(parse_currency("$50"), CurrencyCell::Amount(50.0));
        assert_eq!(parse_currency(" $1,250.00 "), CurrencyCell::Amount(1250.0));
        assert_eq!(parse_currency("193"), CurrencyCell::Amount(193.0));
        assert_eq!(parse_currency(""), CurrencyCell::Missing);
        assert_eq!(parse_currency("   "), CurrencyCell::Missing);
    }

    #[test]
    fn test_parse_currency_malformed() {
        assert_eq!(parse_currency("$12x"), CurrencyCell::Malformed);
        assert_eq!(parse_currency("USD 12"), CurrencyCell::Malformed);
        assert_eq!(parse_currency("-$5"), CurrencyCell::Malformed);
        assert_eq!(parse_currency("$"), CurrencyCell::Malformed);
        assert_eq!(parse_currency("1.2.3"), CurrencyCell::Malformed);
    }

    #[test]
    fn test_parse_date_formats() {
        let formats = ["%m/%d/%Y", "%Y-%m-%d"];
        assert_eq!(
            parse_date("10/19/2021", &formats),
            NaiveDate::from_ymd_opt(2021, 10, 19)
        );
        assert_eq!(
            parse_date("2019-05-21", &formats),
            NaiveDate::from_ymd_opt(2019, 5, 21)
        );
        assert_eq!(
            parse_date("2019-05-21 13:45:00", &formats),
            NaiveDate::from_ymd_opt(2019, 5, 21)
        );
        assert_eq!(parse_date("not a date", &formats), None);
        assert_eq!(parse_date("13/45/2020", &formats), None);
        assert_eq!(parse_date("", &formats), None);
    }

    #[test]
    fn test_parse_date_two_digit_year() {
        let formats = crate::config::ListingsConfig::default().date_formats;
        assert_eq!(
            parse_date("10/19/21", &formats),
            NaiveDate::from_ymd_opt(2021, 10, 19)
        );
        assert_eq!(
            parse_date("01/02/19", &formats),
            NaiveDate::from_ymd_opt(2019, 1, 2)
        );
        assert_eq!(
            parse_date("10/19/2021", &formats),
            NaiveDate::from_ymd_opt(2021, 10, 19)
        );
        // no two-digit fallback configured: a short year is not a date
        assert_eq!(parse_date("10/19/21", &["%m/%d/%Y"]), None);
    }

    #[test]
    fn test_date_roundtrip_through_series() {
        let dates = vec![NaiveDate::from_ymd_opt(2020, 2, 29), None];
        let series = date_series("d".into(), &dates).unwrap();
        assert_eq!(series.dtype(), &DataType::Date);
        assert_eq!(series_dates(&series).unwrap(), dates);
    }

    #[test]
    fn test_sample_std_and_mean() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(mean(&values), Some(3.0));
        assert!((sample_std(&values).unwrap() - 1.5811).abs() < 1e-4);
        assert_eq!(sample_std(&[4.0]), None);
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_quantile_linear_interpolation() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile_sorted(&values, 0.25), Some(1.75));
        assert_eq!(quantile_sorted(&values, 0.5), Some(2.5));
        assert_eq!(quantile_sorted(&values, 0.75), Some(3.25));
        assert_eq!(quantile_sorted(&values, 1.0), Some(4.0));
        assert_eq!(quantile_sorted(&[], 0.5), None);
    }

    #[test]
    fn test_counts_by_appearance() {
        let values = vec![
            Some("Private room".to_string()),
            Some("Entire home/apt".to_string()),
            None,
            Some("Private room".to_string()),
        ];
        assert_eq!(
            counts_by_appearance(&values),
            vec![
                ("Private room".to_string(), 2),
                ("Entire home/apt".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(is_temporal_dtype(&DataType::Date));
        assert!(!is_temporal_dtype(&DataType::Boolean));
    }
}
