//! Configuration types for the listings and trends pipelines.
//!
//! Both configs follow the same shape: a serde-friendly struct with a
//! `Default`, a fluent builder, and `validate()`.

use serde::{Deserialize, Serialize};

/// Default date formats tried, in order, when parsing `last review`.
pub const DEFAULT_DATE_FORMATS: [&str; 5] =
    ["%m/%d/%Y", "%Y-%m-%d", "%Y/%m/%d", "%m-%d-%Y", "%m/%d/%y"];

/// Default trends host root.
pub const DEFAULT_TRENDS_BASE_URL: &str = "https://trends.google.com";

/// Trailing 12-month window used for every trends query.
pub const TRAILING_12_MONTHS: &str = "today 12-m";

/// Configuration for the listings pipeline (Pipeline A).
///
/// # Example
///
/// ```rust,ignore
/// use eda_pipelines::config::ListingsConfig;
///
/// let config = ListingsConfig::builder()
///     .histogram_bins(30)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingsConfig {
    /// Number of equal-width bins in the price histogram.
    /// Default: 50
    pub histogram_bins: usize,

    /// Number of points the price density curve is sampled at.
    /// Default: 200
    pub kde_points: usize,

    /// `chrono` formats accepted for the `last review` column, tried in order.
    pub date_formats: Vec<String>,

    /// Rows used by the CSV reader for schema inference.
    /// Default: 100
    pub infer_schema_length: usize,
}

impl Default for ListingsConfig {
    fn default() -> Self {
        Self {
            histogram_bins: 50,
            kde_points: 200,
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect(),
            infer_schema_length: 100,
        }
    }
}

impl ListingsConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ListingsConfigBuilder {
        ListingsConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.histogram_bins == 0 {
            return Err(ConfigValidationError::ZeroCount("histogram_bins".to_string()));
        }
        if self.kde_points < 2 {
            return Err(ConfigValidationError::ZeroCount("kde_points".to_string()));
        }
        if self.date_formats.is_empty() {
            return Err(ConfigValidationError::Empty("date_formats".to_string()));
        }
        if self.infer_schema_length == 0 {
            return Err(ConfigValidationError::ZeroCount(
                "infer_schema_length".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`ListingsConfig`].
#[derive(Debug, Default)]
pub struct ListingsConfigBuilder {
    histogram_bins: Option<usize>,
    kde_points: Option<usize>,
    date_formats: Option<Vec<String>>,
    infer_schema_length: Option<usize>,
}

impl ListingsConfigBuilder {
    /// Set the number of histogram bins.
    pub fn histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = Some(bins);
        self
    }

    /// Set how many points the density curve is sampled at.
    pub fn kde_points(mut self, points: usize) -> Self {
        self.kde_points = Some(points);
        self
    }

    /// Replace the accepted date formats.
    pub fn date_formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.date_formats = Some(formats.into_iter().map(Into::into).collect());
        self
    }

    /// Set the schema inference length of the CSV reader.
    pub fn infer_schema_length(mut self, rows: usize) -> Self {
        self.infer_schema_length = Some(rows);
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<ListingsConfig, ConfigValidationError> {
        let defaults = ListingsConfig::default();
        let config = ListingsConfig {
            histogram_bins: self.histogram_bins.unwrap_or(defaults.histogram_bins),
            kde_points: self.kde_points.unwrap_or(defaults.kde_points),
            date_formats: self.date_formats.unwrap_or(defaults.date_formats),
            infer_schema_length: self
                .infer_schema_length
                .unwrap_or(defaults.infer_schema_length),
        };

        config.validate()?;
        Ok(config)
    }
}

/// Configuration for the trends pipeline (Pipeline B).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendsConfig {
    /// Host language sent as `hl`. Default: "en-US"
    pub host_language: String,
    /// Timezone offset in minutes sent as `tz`. Default: 360
    pub tz_offset: i32,
    /// Query window. Default: "today 12-m"
    pub timeframe: String,
    /// Category id, 0 = all categories.
    pub category: u32,
    /// Geography filter, empty = worldwide.
    pub geo: String,
    /// Google property filter (`images`, `news`, `youtube`, `froogle`), empty = web search.
    pub property: String,
    /// Number of regions kept after ranking. Default: 15
    pub top_regions: usize,
    /// Request timeout in seconds. Default: 30
    pub timeout_secs: u64,
    /// Root URL of the trends service.
    pub base_url: String,
}

impl Default for TrendsConfig {
    fn default() -> Self {
        Self {
            host_language: "en-US".to_string(),
            tz_offset: 360,
            timeframe: TRAILING_12_MONTHS.to_string(),
            category: 0,
            geo: String::new(),
            property: String::new(),
            top_regions: 15,
            timeout_secs: 30,
            base_url: DEFAULT_TRENDS_BASE_URL.to_string(),
        }
    }
}

impl TrendsConfig {
    /// Create a new configuration builder.
    pub fn builder() -> TrendsConfigBuilder {
        TrendsConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.timeframe.trim().is_empty() {
            return Err(ConfigValidationError::Empty("timeframe".to_string()));
        }
        if self.top_regions == 0 {
            return Err(ConfigValidationError::ZeroCount("top_regions".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigValidationError::ZeroCount("timeout_secs".to_string()));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigValidationError::InvalidUrl(self.base_url.clone()));
        }
        const PROPERTIES: [&str; 5] = ["", "images", "news", "youtube", "froogle"];
        if !PROPERTIES.contains(&self.property.as_str()) {
            return Err(ConfigValidationError::InvalidProperty(self.property.clone()));
        }
        Ok(())
    }
}

/// Builder for [`TrendsConfig`].
#[derive(Debug, Default)]
pub struct TrendsConfigBuilder {
    host_language: Option<String>,
    tz_offset: Option<i32>,
    timeframe: Option<String>,
    category: Option<u32>,
    geo: Option<String>,
    property: Option<String>,
    top_regions: Option<usize>,
    timeout_secs: Option<u64>,
    base_url: Option<String>,
}

impl TrendsConfigBuilder {
    /// Set the host language.
    pub fn host_language(mut self, hl: impl Into<String>) -> Self {
        self.host_language = Some(hl.into());
        self
    }

    /// Set the timezone offset in minutes.
    pub fn tz_offset(mut self, tz: i32) -> Self {
        self.tz_offset = Some(tz);
        self
    }

    /// Set the query window.
    pub fn timeframe(mut self, timeframe: impl Into<String>) -> Self {
        self.timeframe = Some(timeframe.into());
        self
    }

    /// Set the category id.
    pub fn category(mut self, category: u32) -> Self {
        self.category = Some(category);
        self
    }

    /// Restrict to a geography (ISO country code, empty for worldwide).
    pub fn geo(mut self, geo: impl Into<String>) -> Self {
        self.geo = Some(geo.into());
        self
    }

    /// Set the Google property filter.
    pub fn property(mut self, property: impl Into<String>) -> Self {
        self.property = Some(property.into());
        self
    }

    /// Set how many regions survive ranking.
    pub fn top_regions(mut self, n: usize) -> Self {
        self.top_regions = Some(n);
        self
    }

    /// Set the request timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Set a custom base URL (useful for proxies).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<TrendsConfig, ConfigValidationError> {
        let defaults = TrendsConfig::default();
        let config = TrendsConfig {
            host_language: self.host_language.unwrap_or(defaults.host_language),
            tz_offset: self.tz_offset.unwrap_or(defaults.tz_offset),
            timeframe: self.timeframe.unwrap_or(defaults.timeframe),
            category: self.category.unwrap_or(defaults.category),
            geo: self.geo.unwrap_or(defaults.geo),
            property: self.property.unwrap_or(defaults.property),
            top_regions: self.top_regions.unwrap_or(defaults.top_regions),
            timeout_secs: self.timeout_secs.unwrap_or(defaults.timeout_secs),
            base_url: self.base_url.unwrap_or(defaults.base_url),
        };

        config.validate()?;
        Ok(config)
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid value for '{0}': must be greater than zero")]
    ZeroCount(String),

    #[error("Invalid value for '{0}': must not be empty")]
    Empty(String),

    #[error("Invalid base URL: '{0}'")]
    InvalidUrl(String),

    #[error("Invalid Google property filter: '{0}'")]
    InvalidProperty(String),
}

impl From<ConfigValidationError> for crate::error::EdaError {
    fn from(err: ConfigValidationError) -> Self {
        crate::error::EdaError::InvalidConfig(err.to_string())
    }
}
