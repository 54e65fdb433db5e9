use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Column names of the listings dataset, exactly as they appear in the CSV header.
pub mod columns {
    pub const NAME: &str = "NAME";
    pub const HOST_NAME: &str = "host name";
    pub const NEIGHBOURHOOD_GROUP: &str = "neighbourhood group";
    pub const ROOM_TYPE: &str = "room type";
    pub const PRICE: &str = "price";
    pub const SERVICE_FEE: &str = "service fee";
    pub const REVIEWS_PER_MONTH: &str = "reviews per month";
    pub const LAST_REVIEW: &str = "last review";
    pub const LICENSE: &str = "license";
    pub const HOUSE_RULES: &str = "house_rules";

    /// Rows missing any of these cannot be imputed and are dropped.
    pub const NON_IMPUTABLE: [&str; 2] = [NAME, HOST_NAME];

    /// Free-text columns removed before numeric coercion.
    pub const DROPPED: [&str; 2] = [LICENSE, HOUSE_RULES];

    /// Columns holding `$`-prefixed, comma-grouped amounts.
    pub const CURRENCY: [&str; 2] = [PRICE, SERVICE_FEE];
}

/// What the listings cleaner did to the table.
///
/// Serialized as part of the listings report; `actions` is the
/// human-readable log of each step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleaningSummary {
    pub rows_before: usize,
    pub rows_after: usize,
    pub columns_before: usize,
    pub columns_after: usize,
    /// `last review` values that failed to parse and became missing.
    pub unparseable_dates: usize,
    /// Missing values filled, keyed by column.
    pub imputed: BTreeMap<String, usize>,
    /// Date used to fill missing `last review` values.
    pub last_review_fill: Option<NaiveDate>,
    /// Rows dropped because `NAME` or `host name` was missing.
    pub rows_missing_names: usize,
    pub dropped_columns: Vec<String>,
    pub duplicates_removed: usize,
    pub actions: Vec<String>,
}

impl CleaningSummary {
    pub fn new(rows_before: usize, columns_before: usize) -> Self {
        Self {
            rows_before,
            columns_before,
            ..Default::default()
        }
    }

    pub(crate) fn record(&mut self, action: impl Into<String>) {
        self.actions.push(action.into());
    }
}

/// One ranked region from an interest-by-region query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionInterest {
    pub geo_code: String,
    pub geo_name: String,
    /// One score per queried keyword, in query order.
    pub values: Vec<i64>,
}

/// One time bucket from an interest-over-time query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub date: NaiveDate,
    /// One score per queried keyword, in query order.
    pub values: Vec<i64>,
    /// The bucket is still open and its score may change.
    pub is_partial: bool,
}
