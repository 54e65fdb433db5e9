//! Descriptive reporting.
//!
//! - [`describe`] computes count, mean, std, quartiles, min and max over the
//!   numeric columns of a table
//! - [`DatasetOverview`] captures shape, dtypes and missing-value counts
//!
//! Both render as fixed-width text tables through `Display` and serialize
//! to JSON for `--json` output.

mod overview;
mod statistics;

pub use overview::{ColumnOverview, DatasetOverview};
pub use statistics::{ColumnStatistics, DescriptiveReport, describe};
