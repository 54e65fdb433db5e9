//! Render-ready chart descriptions.

use serde::{Deserialize, Serialize};

/// A chart, fully computed and ready to hand to a plotting backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    /// Stable identifier, also used as the file stem by file-based renderers.
    pub id: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub kind: ChartKind,
}

impl Chart {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        x_label: impl Into<String>,
        y_label: impl Into<String>,
        kind: ChartKind,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartKind {
    /// Equal-width bins plus a density curve scaled to counts.
    Histogram {
        bins: Vec<HistogramBin>,
        density: Vec<Point>,
    },
    /// One bar per category, drawn in the given order.
    Bar {
        orientation: Orientation,
        bars: Vec<Bar>,
    },
    /// Five-number summary plus outliers per group.
    BoxPlot { groups: Vec<BoxGroup> },
    /// One or more series sharing a categorical x axis.
    Line {
        series: Vec<LineSeries>,
        markers: bool,
        legend: bool,
    },
    /// Regions shaded by value. Locations are matched by the renderer's
    /// gazetteer as-is; unknown names stay blank.
    Choropleth {
        location_mode: String,
        color_scale: String,
        regions: Vec<Bar>,
    },
}

impl ChartKind {
    /// Short human-readable description, used in logs.
    pub fn summary(&self) -> String {
        match self {
            Self::Histogram { bins, density } => {
                format!("histogram, {} bins, {} density points", bins.len(), density.len())
            }
            Self::Bar { bars, .. } => format!("bar chart, {} bars", bars.len()),
            Self::BoxPlot { groups } => format!("box plot, {} groups", groups.len()),
            Self::Line { series, .. } => {
                let points = series.first().map_or(0, |s| s.points.len());
                format!("line chart, {} series x {} points", series.len(), points)
            }
            Self::Choropleth { regions, .. } => format!("choropleth, {} regions", regions.len()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub label: String,
    pub value: f64,
}

impl Bar {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxGroup {
    pub label: String,
    pub count: usize,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Lowest observation within `q1 - 1.5 * IQR`.
    pub lower_whisker: f64,
    /// Highest observation within `q3 + 1.5 * IQR`.
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSeries {
    pub name: String,
    pub points: Vec<Bar>,
}
