//! CSV loading for the listings table.

use crate::config::ListingsConfig;
use crate::error::{EdaError, Result};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

/// Load the listings CSV with a cascade of fallback strategies.
///
/// 1. Header row, `"` quoting, schema inferred from the first
///    `infer_schema_length` rows.
/// 2. Same, but with every column read as a string (inference can trip on
///    mixed columns such as `house_rules`).
/// 3. Read the file into memory, collapse doubled quotes, drop blank lines,
///    and parse the cleaned text.
pub fn load_listings(path: impl AsRef<Path>, config: &ListingsConfig) -> Result<DataFrame> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(EdaError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Input file not found: {}", path.display()),
        )));
    }

    info!("Loading listings from: {}", path.display());

    match CsvReadOptions::default()
        .with_infer_schema_length(Some(config.infer_schema_length))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
    {
        Ok(df) => {
            debug!("Loaded {:?} with inferred schema", df.shape());
            return Ok(df);
        }
        Err(e) => debug!("Standard loading failed: {}", e),
    }

    match CsvReadOptions::default()
        .with_infer_schema_length(Some(0))
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
    {
        Ok(df) => {
            debug!("Loaded {:?} with all-string schema", df.shape());
            return Ok(df);
        }
        Err(e) => debug!("String-schema loading failed: {}", e),
    }

    let content = std::fs::read_to_string(path)?;
    let df = read_listings_str(&clean_csv_content(&content), config)?;
    debug!("Loaded {:?} from pre-cleaned content", df.shape());
    Ok(df)
}

/// Parse listings from in-memory CSV text.
pub fn read_listings_str(content: &str, config: &ListingsConfig) -> Result<DataFrame> {
    let cursor = Cursor::new(content.as_bytes().to_vec());
    let df = CsvReadOptions::default()
        .with_infer_schema_length(Some(config.infer_schema_length))
        .with_has_header(true)
        .into_reader_with_file_handle(cursor)
        .finish()?;
    Ok(df)
}

fn clean_csv_content(content: &str) -> String {
    content
        .replace("\"\"\"", "\"")
        .replace("\"\"", "\"")
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_listings_str() {
        let csv = "NAME,host name,price\nLoft,Bob,\"$1,200.50\"\nStudio,Ann,$80\n";
        let df = read_listings_str(csv, &ListingsConfig::default()).unwrap();
        assert_eq!(df.shape(), (2, 3));
        assert_eq!(df.column("price").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_listings("does/not/exist.csv", &ListingsConfig::default()).unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
    }

    #[test]
    fn test_clean_csv_content_drops_blank_lines() {
        let cleaned = clean_csv_content("a,b\n\n1,2\n   \n3,4");
        assert_eq!(cleaned, "a,b\n1,2\n3,4");
    }
}
