//! Shape, dtypes and missing-value counts of a table.

use super::statistics::truncate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnOverview {
    pub name: String,
    pub dtype: String,
    pub null_count: usize,
}

/// What a table looks like at one point of the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetOverview {
    pub rows: usize,
    pub columns: Vec<ColumnOverview>,
}

impl DatasetOverview {
    pub fn from_frame(df: &DataFrame) -> Self {
        let columns = df
            .get_columns()
            .iter()
            .map(|c| ColumnOverview {
                name: c.name().to_string(),
                dtype: c.dtype().to_string(),
                null_count: c.null_count(),
            })
            .collect();
        Self {
            rows: df.height(),
            columns,
        }
    }

    pub fn total_nulls(&self) -> usize {
        self.columns.iter().map(|c| c.null_count).sum()
    }

    pub fn null_count(&self, column: &str) -> Option<usize> {
        self.columns
            .iter()
            .find(|c| c.name == column)
            .map(|c| c.null_count)
    }
}

impl fmt::Display for DatasetOverview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Rows: {}  Columns: {}", self.rows, self.columns.len())?;
        writeln!(f, "{:<28} {:<14} {:>10}", "Column", "Type", "Missing")?;
        writeln!(f, "{}", "-".repeat(54))?;
        for col in &self.columns {
            writeln!(
                f,
                "{:<28} {:<14} {:>10}",
                truncate(&col.name, 27),
                col.dtype,
                col.null_count
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overview_counts_nulls() {
        let df = df!(
            "NAME" => [Some("Loft"), None, Some("Cabin")],
            "price" => [Some(1.0), Some(2.0), None]
        )
        .unwrap();
        let overview = DatasetOverview::from_frame(&df);
        assert_eq!(overview.rows, 3);
        assert_eq!(overview.null_count("NAME"), Some(1));
        assert_eq!(overview.null_count("price"), Some(1));
        assert_eq!(overview.null_count("missing"), None);
        assert_eq!(overview.total_nulls(), 2);
        assert!(overview.to_string().contains("NAME"));
    }
}
