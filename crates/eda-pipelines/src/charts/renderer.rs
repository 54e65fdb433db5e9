//! Chart renderer trait and the built-in renderers.
//!
//! The pipelines only compute [`Chart`] values; drawing them is delegated
//! to a [`ChartRenderer`]. Two renderers ship with the crate:
//!
//! - [`LogChartRenderer`] logs a one-line summary per chart
//! - [`JsonChartRenderer`] writes the full chart spec as pretty JSON, one
//!   file per chart
//!
//! # Implementing a New Renderer
//!
//! ```rust,ignore
//! struct PlottersRenderer { out_dir: PathBuf }
//!
//! impl ChartRenderer for PlottersRenderer {
//!     fn render(&self, chart: &Chart) -> Result<()> { /* draw */ }
//!     fn name(&self) -> &str { "plotters" }
//! }
//! ```

use super::spec::Chart;
use crate::error::{EdaError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Something that can turn a chart spec into a visual artifact.
pub trait ChartRenderer {
    /// Render one chart. Errors stop the pipeline.
    fn render(&self, chart: &Chart) -> Result<()>;

    /// Renderer name for logging.
    fn name(&self) -> &str;
}

/// Logs each chart at `info` level and draws nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogChartRenderer;

impl ChartRenderer for LogChartRenderer {
    fn render(&self, chart: &Chart) -> Result<()> {
        info!("Chart '{}' [{}]: {}", chart.id, chart.title.trim(), chart.kind.summary());
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}

/// Serializes chart specs as pretty-printed JSON, one `<chart id>.json` file
/// per chart. The directory is created on demand.
#[derive(Debug, Clone)]
pub struct JsonChartRenderer {
    dir: PathBuf,
}

impl JsonChartRenderer {
    pub fn to_directory(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn failure(chart: &Chart, reason: impl ToString) -> EdaError {
        EdaError::ChartRender {
            chart: chart.id.clone(),
            reason: reason.to_string(),
        }
    }
}

impl ChartRenderer for JsonChartRenderer {
    fn render(&self, chart: &Chart) -> Result<()> {
        let json = serde_json::to_string_pretty(chart)?;
        fs::create_dir_all(&self.dir).map_err(|e| Self::failure(chart, e))?;
        let path = self.dir.join(format!("{}.json", chart.id));
        fs::write(&path, json).map_err(|e| Self::failure(chart, e))?;
        debug!("Wrote chart spec to {}", path.display());
        Ok(())
    }

    fn name(&self) -> &str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::spec::{Bar, ChartKind, Orientation};

    fn chart() -> Chart {
        Chart::new(
            "room_type_counts",
            "Room type distribution",
            "Room type",
            "Count",
            ChartKind::Bar {
                orientation: Orientation::Vertical,
                bars: vec![Bar::new("Private room", 3.0)],
            },
        )
    }

    #[test]
    fn test_log_renderer_accepts_any_chart() {
        assert!(LogChartRenderer.render(&chart()).is_ok());
        assert_eq!(LogChartRenderer.name(), "log");
    }

    #[test]
    fn test_json_renderer_writes_file() {
        let dir = std::env::temp_dir().join(format!("eda-charts-{}", std::process::id()));
        let renderer = JsonChartRenderer::to_directory(dir.join("nested"));
        renderer.render(&chart()).unwrap();
        assert_eq!(renderer.dir(), dir.join("nested"));

        let written =
            fs::read_to_string(dir.join("nested").join("room_type_counts.json")).unwrap();
        let parsed: Chart = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, chart());
        assert!(written.contains("\"type\": \"bar\""));

        fs::remove_dir_all(&dir).ok();
    }
}
