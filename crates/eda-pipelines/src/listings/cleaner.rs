//! Cleaning of the raw listings table.

use crate::config::ListingsConfig;
use crate::error::{EdaError, Result, ResultExt};
use crate::types::{CleaningSummary, columns};
use crate::utils::{
    CurrencyCell, date_series, is_numeric_dtype, is_temporal_dtype, parse_currency, parse_date,
    require_column, series_dates, string_values,
};
use polars::prelude::*;
use tracing::{debug, info, warn};

/// Columns the cleaner cannot work without.
const REQUIRED: [&str; 6] = [
    columns::NAME,
    columns::HOST_NAME,
    columns::LAST_REVIEW,
    columns::REVIEWS_PER_MONTH,
    columns::PRICE,
    columns::SERVICE_FEE,
];

/// Turns the raw listings table into the cleaned table.
///
/// The steps run in a fixed order; later steps rely on earlier ones:
///
/// 1. parse `last review` (unparseable cells become null)
/// 2. fill `reviews per month` with 0 and `last review` with the earliest valid date
/// 3. drop rows missing `NAME` or `host name`
/// 4. drop `license` and `house_rules` when present
/// 5. strip `$` and `,` from `price` and `service fee` and parse as `f64`
/// 6. drop exact duplicate rows, keeping the first
pub struct ListingsCleaner {
    date_formats: Vec<String>,
}

impl ListingsCleaner {
    pub fn new(config: &ListingsConfig) -> Self {
        Self {
            date_formats: config.date_formats.clone(),
        }
    }

    /// Run every cleaning step and report what changed.
    pub fn clean(&self, df: DataFrame) -> Result<(DataFrame, CleaningSummary)> {
        for name in REQUIRED {
            require_column(&df, name)?;
        }

        let mut summary = CleaningSummary::new(df.height(), df.width());
        let mut df = df;

        info!("Cleaning {} listings...", df.height());

        self.parse_last_review(&mut df, &mut summary)
            .context("Parsing last review dates")?;
        impute_missing(&mut df, &mut summary).context("Imputing missing values")?;
        df = drop_unnamed_rows(df, &mut summary)?;
        df = drop_free_text_columns(df, &mut summary);
        for column in columns::CURRENCY {
            coerce_currency(&mut df, column)?;
        }
        summary.record("Stripped '$' and ',' from price and service fee");
        df = remove_duplicates(df, &mut summary)?;

        summary.rows_after = df.height();
        summary.columns_after = df.width();
        info!(
            "Cleaning complete: {} -> {} rows, {} -> {} columns",
            summary.rows_before, summary.rows_after, summary.columns_before, summary.columns_after
        );

        Ok((df, summary))
    }

    fn parse_last_review(&self, df: &mut DataFrame, summary: &mut CleaningSummary) -> Result<()> {
        let series = require_column(df, columns::LAST_REVIEW)?;
        let name = series.name().clone();

        let parsed = if is_temporal_dtype(series.dtype()) {
            series.cast(&DataType::Date)?
        } else {
            let raw = string_values(series)?;
            let dates: Vec<_> = raw
                .iter()
                .map(|cell| cell.as_deref().and_then(|s| parse_date(s, &self.date_formats)))
                .collect();
            summary.unparseable_dates = raw
                .iter()
                .zip(&dates)
                .filter(|(cell, date)| {
                    date.is_none() && cell.as_deref().is_some_and(|s| !s.trim().is_empty())
                })
                .count();
            date_series(name, &dates)?
        };

        if summary.unparseable_dates > 0 {
            debug!(
                "{} '{}' values could not be parsed and are treated as missing",
                summary.unparseable_dates,
                columns::LAST_REVIEW
            );
        }
        df.replace(columns::LAST_REVIEW, parsed)?;
        summary.record(format!(
            "Parsed '{}' as dates ({} unparseable)",
            columns::LAST_REVIEW,
            summary.unparseable_dates
        ));
        Ok(())
    }
}

/// Fill `reviews per month` with 0 and `last review` with its minimum valid date.
///
/// The minimum is taken before filling, so it only reflects present values.
fn impute_missing(df: &mut DataFrame, summary: &mut CleaningSummary) -> Result<()> {
    let reviews = require_column(df, columns::REVIEWS_PER_MONTH)?.cast(&DataType::Float64)?;
    let missing_reviews = reviews.null_count();
    let filled: Vec<f64> = reviews
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(0.0))
        .collect();
    df.replace(
        columns::REVIEWS_PER_MONTH,
        Series::new(columns::REVIEWS_PER_MONTH.into(), filled),
    )?;
    summary
        .imputed
        .insert(columns::REVIEWS_PER_MONTH.to_string(), missing_reviews);
    summary.record(format!(
        "Filled {} missing '{}' values with 0",
        missing_reviews,
        columns::REVIEWS_PER_MONTH
    ));

    let dates = series_dates(require_column(df, columns::LAST_REVIEW)?)?;
    let missing_dates = dates.iter().filter(|d| d.is_none()).count();
    match dates.iter().flatten().min().copied() {
        Some(earliest) => {
            let filled: Vec<_> = dates.iter().map(|d| Some(d.unwrap_or(earliest))).collect();
            df.replace(
                columns::LAST_REVIEW,
                date_series(columns::LAST_REVIEW.into(), &filled)?,
            )?;
            summary.last_review_fill = Some(earliest);
            summary
                .imputed
                .insert(columns::LAST_REVIEW.to_string(), missing_dates);
            summary.record(format!(
                "Filled {} missing '{}' values with {}",
                missing_dates,
                columns::LAST_REVIEW,
                earliest
            ));
        }
        None if missing_dates > 0 => {
            warn!(
                "'{}' has no valid dates; {} missing values left unfilled",
                columns::LAST_REVIEW,
                missing_dates
            );
        }
        None => {}
    }

    Ok(())
}

/// Rows without a listing name or host name cannot be imputed.
fn drop_unnamed_rows(df: DataFrame, summary: &mut CleaningSummary) -> Result<DataFrame> {
    let before = df.height();
    let mut mask = BooleanChunked::full(PlSmallStr::EMPTY, true, before);
    for column in columns::NON_IMPUTABLE {
        mask = &mask & &require_column(&df, column)?.is_not_null();
    }
    let df = df.filter(&mask)?;

    summary.rows_missing_names = before - df.height();
    if summary.rows_missing_names > 0 {
        debug!(
            "Dropped {} rows missing '{}' or '{}'",
            summary.rows_missing_names,
            columns::NAME,
            columns::HOST_NAME
        );
    }
    summary.record(format!(
        "Dropped {} rows missing '{}' or '{}'",
        summary.rows_missing_names,
        columns::NAME,
        columns::HOST_NAME
    ));
    Ok(df)
}

/// Tolerant drop: columns that are not there are skipped.
fn drop_free_text_columns(df: DataFrame, summary: &mut CleaningSummary) -> DataFrame {
    let present: Vec<PlSmallStr> = columns::DROPPED
        .iter()
        .filter(|c| df.column(c).is_ok())
        .map(|c| (*c).into())
        .collect();

    if present.is_empty() {
        summary.record("No free-text columns to drop");
        return df;
    }

    summary.dropped_columns = present.iter().map(|c| c.to_string()).collect();
    summary.record(format!("Dropped columns {:?}", summary.dropped_columns));
    df.drop_many(present)
}

/// Parse a currency column in place. Any malformed cell fails the whole run.
fn coerce_currency(df: &mut DataFrame, column: &str) -> Result<()> {
    let series = require_column(df, column)?;

    let amounts: Vec<Option<f64>> = if is_numeric_dtype(series.dtype()) {
        let floats = series.cast(&DataType::Float64)?;
        let values: Vec<Option<f64>> = floats.f64()?.into_iter().collect();
        if let Some((row, value)) = values
            .iter()
            .enumerate()
            .find_map(|(i, v)| v.filter(|x| *x < 0.0 || !x.is_finite()).map(|x| (i, x)))
        {
            return Err(EdaError::MalformedCurrency {
                column: column.to_string(),
                row,
                value: value.to_string(),
            });
        }
        values
    } else {
        let raw = string_values(series)?;
        let mut out = Vec::with_capacity(raw.len());
        for (row, cell) in raw.iter().enumerate() {
            let parsed = match cell.as_deref().map(parse_currency) {
                None | Some(CurrencyCell::Missing) => None,
                Some(CurrencyCell::Amount(value)) => Some(value),
                Some(CurrencyCell::Malformed) => {
                    return Err(EdaError::MalformedCurrency {
                        column: column.to_string(),
                        row,
                        value: cell.clone().unwrap_or_default(),
                    });
                }
            };
            out.push(parsed);
        }
        out
    };

    df.replace(column, Series::new(column.into(), amounts))?;
    Ok(())
}

fn remove_duplicates(df: DataFrame, summary: &mut CleaningSummary) -> Result<DataFrame> {
    let before = df.height();
    let df = df.unique_stable(None, UniqueKeepStrategy::First, None)?;
    summary.duplicates_removed = before - df.height();

    if summary.duplicates_removed > 0 {
        let pct = (summary.duplicates_removed as f64 / before as f64) * 100.0;
        summary.record(format!(
            "Removed {} duplicate rows ({:.1}%)",
            summary.duplicates_removed, pct
        ));
        debug!("Removed {} duplicate rows", summary.duplicates_removed);
    } else {
        summary.record("No duplicate rows found");
    }
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn raw_listings() -> DataFrame {
        df!(
            "NAME" => [Some("Loft"), None, Some("Studio"), Some("Loft"), Some("Cabin")],
            "host name" => [Some("Bob"), Some("Alice"), Some("Cara"), Some("Bob"), None],
            "neighbourhood group" => ["Brooklyn", "Manhattan", "Queens", "Brooklyn", "Bronx"],
            "room type" => ["Entire home/apt", "Private room", "Private room", "Entire home/apt", "Shared room"],
            "price" => [Some("$1,200.50"), Some("$100"), Some("$85"), Some("$1,200.50"), Some("$40")],
            "service fee" => [Some("$50"), Some("$20"), None, Some("$50"), Some("$8")],
            "reviews per month" => [Some(0.5), Some(1.0), None, Some(0.5), Some(2.0)],
            "last review" => [Some("10/19/2021"), Some("05/21/2022"), Some("garbage"), Some("10/19/2021"), None],
            "license" => [None::<&str>, None, None, None, None],
            "house_rules" => [Some("No smoking"), None, Some("Quiet hours"), Some("No smoking"), None]
        )
        .unwrap()
    }

    fn cleaner() -> ListingsCleaner {
        ListingsCleaner::new(&ListingsConfig::default())
    }

    #[test]
    fn test_clean_drops_unnamed_and_duplicates() {
        let (df, summary) = cleaner().clean(raw_listings()).unwrap();

        // row 1 has no NAME, row 4 no host, row 3 duplicates row 0
        assert_eq!(df.height(), 2);
        assert_eq!(summary.rows_missing_names, 2);
        assert_eq!(summary.duplicates_removed, 1);
        assert_eq!(summary.rows_before, 5);
        assert_eq!(summary.rows_after, 2);
    }

    #[test]
    fn test_clean_parses_currency() {
        let (df, _) = cleaner().clean(raw_listings()).unwrap();
        let price = df.column("price").unwrap().f64().unwrap().clone();
        let fee = df.column("service fee").unwrap().f64().unwrap().clone();

        assert_eq!(price.get(0), Some(1200.50));
        assert_eq!(fee.get(0), Some(50.0));
        assert_eq!(price.get(1), Some(85.0));
        // missing fees stay missing
        assert_eq!(fee.get(1), None);
    }

    #[test]
    fn test_clean_imputes_reviews_and_dates() {
        let (df, summary) = cleaner().clean(raw_listings()).unwrap();

        let reviews = df.column("reviews per month").unwrap().f64().unwrap().clone();
        assert_eq!(reviews.null_count(), 0);
        assert_eq!(reviews.get(1), Some(0.0));

        let dates = series_dates(df.column("last review").unwrap().as_materialized_series()).unwrap();
        let earliest = NaiveDate::from_ymd_opt(2021, 10, 19);
        assert_eq!(summary.last_review_fill, earliest);
        assert_eq!(summary.unparseable_dates, 1);
        assert_eq!(dates[1], earliest);
        assert!(dates.iter().all(Option::is_some));
    }

    #[test]
    fn test_clean_drops_free_text_columns() {
        let (df, summary) = cleaner().clean(raw_listings()).unwrap();
        assert!(df.column("license").is_err());
        assert!(df.column("house_rules").is_err());
        assert_eq!(summary.dropped_columns, vec!["license", "house_rules"]);
    }

    #[test]
    fn test_clean_without_free_text_columns() {
        let df = raw_listings()
            .drop_many(["license", "house_rules"])
            .select(REQUIRED)
            .unwrap();
        let (cleaned, summary) = cleaner().clean(df).unwrap();
        assert!(summary.dropped_columns.is_empty());
        assert_eq!(cleaned.width(), REQUIRED.len());
    }

    #[test]
    fn test_malformed_currency_fails() {
        let mut df = raw_listings();
        df.replace(
            "price",
            Series::new("price".into(), ["$10", "$20", "$3O", "$40", "$50"]),
        )
        .unwrap();

        let err = cleaner().clean(df).unwrap_err();
        match err {
            EdaError::MalformedCurrency { column, value, .. } => {
                assert_eq!(column, "price");
                assert_eq!(value, "$3O");
            }
            other => panic!("expected MalformedCurrency, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_required_column() {
        let df = raw_listings().drop("host name").unwrap();
        let err = cleaner().clean(df).unwrap_err();
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
    }

    #[test]
    fn test_numeric_price_column_passes_through() {
        let mut df = raw_listings();
        df.replace(
            "price",
            Series::new("price".into(), [120i64, 80, 95, 120, 40]),
        )
        .unwrap();
        let (cleaned, _) = cleaner().clean(df).unwrap();
        assert_eq!(cleaned.column("price").unwrap().dtype(), &DataType::Float64);
    }

    fn with_last_review(dates: [Option<&str>; 5]) -> DataFrame {
        let mut df = raw_listings();
        df.replace("last review", Series::new("last review".into(), dates))
            .unwrap();
        df
    }

    #[test]
    fn test_two_digit_years_in_mixed_column() {
        let df = with_last_review([
            Some("10/19/2021"),
            Some("05/21/2022"),
            Some("01/02/19"),
            Some("10/19/2021"),
            None,
        ]);
        let (cleaned, summary) = cleaner().clean(df).unwrap();
        let dates =
            series_dates(cleaned.column("last review").unwrap().as_materialized_series()).unwrap();

        assert_eq!(summary.unparseable_dates, 0);
        assert_eq!(summary.last_review_fill, NaiveDate::from_ymd_opt(2019, 1, 2));
        assert_eq!(dates[1], NaiveDate::from_ymd_opt(2019, 1, 2));
    }

    #[test]
    fn test_fill_date_taken_before_unnamed_rows_drop() {
        // the earliest date sits on the row without a NAME
        let df = with_last_review([
            Some("10/19/2021"),
            Some("03/01/2015"),
            None,
            Some("10/19/2021"),
            None,
        ]);
        let (cleaned, summary) = cleaner().clean(df).unwrap();
        let dates =
            series_dates(cleaned.column("last review").unwrap().as_materialized_series()).unwrap();

        let earliest = NaiveDate::from_ymd_opt(2015, 3, 1);
        assert_eq!(summary.last_review_fill, earliest);
        assert_eq!(cleaned.height(), 2);
        assert_eq!(dates, vec![NaiveDate::from_ymd_opt(2021, 10, 19), earliest]);
    }

    #[test]
    fn test_all_dates_missing_leaves_nulls() {
        let mut df = raw_listings();
        df.replace(
            "last review",
            Series::new("last review".into(), [None::<&str>, None, None, None, None]),
        )
        .unwrap();
        let (cleaned, summary) = cleaner().clean(df).unwrap();
        assert_eq!(summary.last_review_fill, None);
        assert_eq!(cleaned.column("last review").unwrap().null_count(), cleaned.height());
    }
}
