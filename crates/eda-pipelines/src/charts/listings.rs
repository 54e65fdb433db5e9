//! Descriptive charts over the cleaned listings table.

use super::spec::{Bar, BoxGroup, Chart, ChartKind, HistogramBin, LineSeries, Orientation, Point};
use crate::config::ListingsConfig;
use crate::error::Result;
use crate::types::columns;
use crate::utils::{
    counts_by_appearance, numeric_values, quantile_sorted, require_column, sample_std,
    series_dates, sorted, string_values,
};
use chrono::Datelike;
use polars::prelude::*;
use std::collections::BTreeMap;
use std::f64::consts::PI;
use tracing::warn;

/// Histogram of `price` with a Gaussian density overlay.
///
/// Without any non-null price the histogram has no bins.
pub fn price_distribution(df: &DataFrame, config: &ListingsConfig) -> Result<Chart> {
    let prices = numeric_values(require_column(df, columns::PRICE)?)?;
    let bins = if prices.is_empty() {
        warn!("No prices to bin; price histogram is empty");
        Vec::new()
    } else {
        histogram(&prices, config.histogram_bins)
    };
    let bin_width = bins.first().map_or(1.0, |b| b.end - b.start);
    let density = density_curve(&prices, config.kde_points, bin_width);

    Ok(Chart::new(
        "price_distribution",
        "Distribution of listing price",
        "Price $",
        "Frequency",
        ChartKind::Histogram { bins, density },
    ))
}

/// Listings per `room type`, categories in order of first appearance.
pub fn room_type_counts(df: &DataFrame) -> Result<Chart> {
    let values = string_values(require_column(df, columns::ROOM_TYPE)?)?;
    let bars = counts_by_appearance(&values)
        .into_iter()
        .map(|(label, n)| Bar::new(label, n as f64))
        .collect();

    Ok(Chart::new(
        "room_type_counts",
        "Room type distribution",
        "Room type",
        "Count",
        ChartKind::Bar {
            orientation: Orientation::Vertical,
            bars,
        },
    ))
}

/// Listings per `neighbourhood group`, most frequent first.
pub fn neighbourhood_counts(df: &DataFrame) -> Result<Chart> {
    let values = string_values(require_column(df, columns::NEIGHBOURHOOD_GROUP)?)?;
    let mut counts = counts_by_appearance(&values);
    // stable: ties keep first-appearance order
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    let bars = counts
        .into_iter()
        .map(|(label, n)| Bar::new(label, n as f64))
        .collect();

    Ok(Chart::new(
        "neighbourhood_counts",
        "Number of listings by Neighborhood Group",
        "Count",
        "Neighborhood Group",
        ChartKind::Bar {
            orientation: Orientation::Horizontal,
            bars,
        },
    ))
}

/// Distribution of `price` per `room type`.
pub fn price_by_room_type(df: &DataFrame) -> Result<Chart> {
    let rooms = string_values(require_column(df, columns::ROOM_TYPE)?)?;
    let prices = require_column(df, columns::PRICE)?.cast(&DataType::Float64)?;

    let mut grouped: Vec<(String, Vec<f64>)> = Vec::new();
    for (room, price) in rooms.into_iter().zip(prices.f64()?.into_iter()) {
        let (Some(room), Some(price)) = (room, price) else {
            continue;
        };
        match grouped.iter_mut().find(|(label, _)| *label == room) {
            Some((_, values)) => values.push(price),
            None => grouped.push((room, vec![price])),
        }
    }

    let groups = grouped
        .into_iter()
        .map(|(label, values)| box_group(label, &values))
        .collect();

    Ok(Chart::new(
        "price_by_room_type",
        "Price vs. Room type",
        "Room type",
        "Price ($)",
        ChartKind::BoxPlot { groups },
    ))
}

/// Number of listings per calendar month of `last review`.
pub fn reviews_over_time(df: &DataFrame) -> Result<Chart> {
    let dates = series_dates(require_column(df, columns::LAST_REVIEW)?)?;

    let mut per_month: BTreeMap<(i32, u32), usize> = BTreeMap::new();
    for date in dates.into_iter().flatten() {
        *per_month.entry((date.year(), date.month())).or_insert(0) += 1;
    }

    let points = per_month
        .into_iter()
        .map(|((year, month), n)| Bar::new(format!("{year:04}-{month:02}"), n as f64))
        .collect();

    Ok(Chart::new(
        "reviews_over_time",
        "Number of Reviews Over Time",
        "Date",
        "Number of reviews",
        ChartKind::Line {
            series: vec![LineSeries {
                name: "reviews".to_string(),
                points,
            }],
            markers: false,
            legend: false,
        },
    ))
}

/// Equal-width bins over `[min, max]`; the last bin is closed on the right.
fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (lo, hi) = if min == max {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    };
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for v in values {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            start: lo + width * i as f64,
            end: lo + width * (i + 1) as f64,
            count,
        })
        .collect()
}

/// Gaussian KDE with Scott's bandwidth, sampled across the data range and
/// scaled so its area matches the histogram (`density * n * bin_width`).
///
/// Empty when the bandwidth is zero (fewer than two distinct values).
fn density_curve(values: &[f64], points: usize, bin_width: f64) -> Vec<Point> {
    let n = values.len() as f64;
    let bandwidth = match sample_std(values) {
        Some(std) if std > 0.0 => std * n.powf(-0.2),
        _ => return Vec::new(),
    };

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let step = (max - min) / (points - 1) as f64;
    let norm = 1.0 / (n * bandwidth * (2.0 * PI).sqrt());

    (0..points)
        .map(|i| {
            let x = min + step * i as f64;
            let density = norm
                * values
                    .iter()
                    .map(|v| (-0.5 * ((x - v) / bandwidth).powi(2)).exp())
                    .sum::<f64>();
            Point {
                x,
                y: density * n * bin_width,
            }
        })
        .collect()
}

fn box_group(label: String, values: &[f64]) -> BoxGroup {
    let ordered = sorted(values);
    let q1 = quantile_sorted(&ordered, 0.25).unwrap_or_default();
    let median = quantile_sorted(&ordered, 0.5).unwrap_or_default();
    let q3 = quantile_sorted(&ordered, 0.75).unwrap_or_default();
    let iqr = q3 - q1;
    let (low_fence, high_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

    let inside = ordered
        .iter()
        .copied()
        .filter(|v| *v >= low_fence && *v <= high_fence);
    let lower_whisker = inside.clone().next().unwrap_or(q1);
    let upper_whisker = inside.last().unwrap_or(q3);
    let outliers = ordered
        .iter()
        .copied()
        .filter(|v| *v < low_fence || *v > high_fence)
        .collect();

    BoxGroup {
        label,
        count: ordered.len(),
        q1,
        median,
        q3,
        lower_whisker,
        upper_whisker,
        outliers,
    }
}
