//! Temporal keys parsed from raster filenames.

use chrono::NaiveDate;
use thiserror::Error;

/// Parse the acquisition date out of a filename using a chrono format
/// string.
///
/// The format spans the whole filename, extension included; literal text
/// in the format must match exactly. `"%Y%m%d.tif"` parses
/// `20240107.tif`, `"ndvi_%Y-%m-%d.tif"` parses `ndvi_2024-01-07.tif`.
pub fn parse_filename_date(name: &str, format: &str) -> Result<NaiveDate, TimeParseError> {
    NaiveDate::parse_from_str(name, format).map_err(|_| TimeParseError::NoMatch {
        name: name.to_string(),
        format: format.to_string(),
    })
}

#[derive(Debug, Error)]
pub enum TimeParseError {
    #[error("filename '{name}' does not match date format '{format}'")]
    NoMatch { name: String, format: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compact_date() {
        let date = parse_filename_date("20240107.tif", "%Y%m%d.tif").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 7).unwrap());
    }

    #[test]
    fn test_parse_with_prefix() {
        let date = parse_filename_date("ndvi_2023-12-31.tif", "ndvi_%Y-%m-%d.tif").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
    }

    #[test]
    fn test_mismatch_is_an_error() {
        assert!(matches!(
            parse_filename_date("readme.txt", "%Y%m%d.tif"),
            Err(TimeParseError::NoMatch { .. })
        ));
        // Right shape, impossible date.
        assert!(parse_filename_date("20241301.tif", "%Y%m%d.tif").is_err());
    }
}
