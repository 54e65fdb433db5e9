//! Error types for the listings and trends pipelines.
//!
//! Errors are built with `thiserror` and serialize as `{code, message}` so a
//! caller can print them as JSON next to the reports.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for both pipelines.
#[derive(Error, Debug)]
pub enum EdaError {
    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// A currency cell could not be parsed after stripping `$` and `,`.
    #[error("Malformed currency value in column '{column}' at row {row}: '{value}'")]
    MalformedCurrency {
        column: String,
        row: usize,
        value: String,
    },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The trends explore response did not contain the requested widget.
    #[error("Trends widget '{0}' not present in explore response")]
    WidgetNotFound(String),

    /// The trends service answered with something we could not interpret.
    #[error("Unexpected trends response: {0}")]
    UnexpectedResponse(String),

    /// A chart renderer failed.
    #[error("Failed to render chart '{chart}': {reason}")]
    ChartRender { chart: String, reason: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error (only with the "google" feature).
    #[cfg(feature = "google")]
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<EdaError>,
    },
}

impl EdaError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        EdaError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code, preserved through [`EdaError::with_context`].
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::MalformedCurrency { .. } => "MALFORMED_CURRENCY",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::WidgetNotFound(_) => "WIDGET_NOT_FOUND",
            Self::UnexpectedResponse(_) => "UNEXPECTED_RESPONSE",
            Self::ChartRender { .. } => "CHART_RENDER_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            #[cfg(feature = "google")]
            Self::HttpRequest(_) => "HTTP_REQUEST_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Whether the error came from talking to the trends service.
    pub fn is_remote(&self) -> bool {
        match self {
            Self::WidgetNotFound(_) | Self::UnexpectedResponse(_) => true,
            #[cfg(feature = "google")]
            Self::HttpRequest(_) => true,
            Self::WithContext { source, .. } => source.is_remote(),
            _ => false,
        }
    }
}

impl Serialize for EdaError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("EdaError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, EdaError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| EdaError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            EdaError::ColumnNotFound("price".to_string()).error_code(),
            "COLUMN_NOT_FOUND"
        );
        let err = EdaError::MalformedCurrency {
            column: "price".to_string(),
            row: 3,
            value: "$12x".to_string(),
        };
        assert_eq!(err.error_code(), "MALFORMED_CURRENCY");
        assert!(err.to_string().contains("row 3"));
    }

    #[test]
    fn test_is_remote() {
        assert!(EdaError::WidgetNotFound("GEO_MAP".to_string()).is_remote());
        assert!(
            EdaError::UnexpectedResponse("bad".to_string())
                .with_context("region query")
                .is_remote()
        );
        assert!(!EdaError::ColumnNotFound("NAME".to_string()).is_remote());
    }

    #[test]
    fn test_error_serialization() {
        let error = EdaError::ColumnNotFound("host name".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("COLUMN_NOT_FOUND"));
        assert!(json.contains("host name"));
    }

    #[test]
    fn test_with_context() {
        let error = EdaError::ColumnNotFound("NAME".to_string()).with_context("During cleaning");
        assert!(error.to_string().contains("During cleaning"));
        assert_eq!(error.error_code(), "COLUMN_NOT_FOUND");
    }
}
