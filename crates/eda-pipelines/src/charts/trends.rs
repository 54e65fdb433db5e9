//! Charts over the region-interest and time-series tables.

use super::spec::{Bar, Chart, ChartKind, LineSeries, Orientation};
use crate::error::Result;
use crate::trends::{DATE_COLUMN, GEO_NAME_COLUMN};
use crate::utils::{require_column, series_dates, string_values};
use polars::prelude::*;

/// Ranked horizontal bar of region scores, in table order.
pub fn top_regions_bar(regions: &DataFrame, keyword: &str) -> Result<Chart> {
    Ok(Chart::new(
        format!("top_regions_{}", slug(keyword)),
        format!("Top Countries searching for '{keyword}' "),
        "Interest",
        "Country",
        ChartKind::Bar {
            orientation: Orientation::Horizontal,
            bars: region_scores(regions, keyword)?,
        },
    ))
}

/// World map shaded by region score, matched on country names.
pub fn region_choropleth(regions: &DataFrame, keyword: &str) -> Result<Chart> {
    Ok(Chart::new(
        format!("region_map_{}", slug(keyword)),
        format!("Search Interest for '{keyword}' by Country"),
        "",
        "",
        ChartKind::Choropleth {
            location_mode: "country names".to_string(),
            color_scale: "Blues".to_string(),
            regions: region_scores(regions, keyword)?,
        },
    ))
}

/// Interest over time for a single keyword, with markers.
pub fn interest_line(timeline: &DataFrame, keyword: &str) -> Result<Chart> {
    Ok(Chart::new(
        format!("interest_over_time_{}", slug(keyword)),
        format!("Search interest over time '{keyword}' "),
        "Date",
        "Interest",
        ChartKind::Line {
            series: vec![timeline_series(timeline, keyword)?],
            markers: true,
            legend: false,
        },
    ))
}

/// One line per keyword on a shared time axis.
pub fn keyword_comparison<S: AsRef<str>>(timeline: &DataFrame, keywords: &[S]) -> Result<Chart> {
    let series = keywords
        .iter()
        .map(|kw| timeline_series(timeline, kw.as_ref()))
        .collect::<Result<Vec<_>>>()?;

    Ok(Chart::new(
        "keyword_comparison",
        "keyword comparison over time",
        "Date",
        "Interest",
        ChartKind::Line {
            series,
            markers: false,
            legend: true,
        },
    ))
}

fn region_scores(regions: &DataFrame, keyword: &str) -> Result<Vec<Bar>> {
    let names = string_values(require_column(regions, GEO_NAME_COLUMN)?)?;
    let scores = require_column(regions, keyword)?.cast(&DataType::Float64)?;
    Ok(names
        .into_iter()
        .zip(scores.f64()?.into_iter())
        .map(|(name, score)| Bar::new(name.unwrap_or_default(), score.unwrap_or(0.0)))
        .collect())
}

fn timeline_series(timeline: &DataFrame, keyword: &str) -> Result<LineSeries> {
    let dates = series_dates(require_column(timeline, DATE_COLUMN)?)?;
    let scores = require_column(timeline, keyword)?.cast(&DataType::Float64)?;
    let points = dates
        .into_iter()
        .zip(scores.f64()?.into_iter())
        .filter_map(|(date, score)| Some(Bar::new(date?.to_string(), score?)))
        .collect();
    Ok(LineSeries {
        name: keyword.to_string(),
        points,
    })
}

/// File-name friendly form of a keyword ("data science" -> "data_science").
fn slug(keyword: &str) -> String {
    keyword
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}
