//! Chart specifications for both pipelines.
//!
//! Builders compute everything a plot needs (bins, counts, quartiles,
//! series) and return a serializable [`Chart`]. A [`ChartRenderer`] then
//! turns the spec into an artifact.

pub mod listings;
mod renderer;
mod spec;
pub mod trends;

pub use renderer::{ChartRenderer, JsonChartRenderer, LogChartRenderer};
pub use spec::{Bar, BoxGroup, Chart, ChartKind, HistogramBin, LineSeries, Orientation, Point};
