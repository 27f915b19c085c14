//! Chronological catalog of dated raster files.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{debug, warn};

use stack_common::parse_filename_date;

use crate::error::{Result, StackError};

/// Default filename suffix accepted by directory scans.
pub const DEFAULT_RASTER_EXTENSION: &str = ".tif";

/// Outcome of one directory scan.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    /// Entries inserted or overwritten.
    pub added: usize,
    /// Filenames that matched the suffix but not the date format.
    pub skipped: Vec<String>,
}

/// Ordered association of acquisition date to source file path.
///
/// Dates are unique; inserting a duplicate date replaces the prior path
/// (last writer wins). Chronological ascending order is authoritative for
/// everything downstream: aligned views and stacked arrays follow it.
#[derive(Debug, Clone, Default)]
pub struct FileCatalog {
    entries: BTreeMap<NaiveDate, PathBuf>,
}

impl FileCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one file under an explicit date.
    pub fn insert(&mut self, date: NaiveDate, path: impl Into<PathBuf>) {
        self.entries.insert(date, path.into());
    }

    /// Insert one file under the date parsed from its filename. Strict:
    /// a filename that does not match the format is an error here, unlike
    /// the scan's skip-and-continue.
    pub fn insert_path(&mut self, path: impl Into<PathBuf>, date_format: &str) -> Result<NaiveDate> {
        let path = path.into();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| StackError::path(&path, "path has no usable filename"))?;

        let date = parse_filename_date(&name, date_format)?;
        self.entries.insert(date, path);
        Ok(date)
    }

    /// Scan one directory (non-recursive) for raster files and insert an
    /// entry per parseable filename.
    ///
    /// Filenames matching the suffix but not the date format are skipped
    /// and collected rather than fatal: one stray file in a directory of
    /// hundreds must not abort the whole scan.
    pub fn scan_directory(
        &mut self,
        dir: &Path,
        extension: &str,
        date_format: &str,
    ) -> Result<ScanOutcome> {
        let entries = fs::read_dir(dir).map_err(|e| StackError::path(dir, e.to_string()))?;

        let mut outcome = ScanOutcome::default();
        for entry in entries {
            let entry = entry.map_err(|e| StackError::path(dir, e.to_string()))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !name.ends_with(extension) {
                continue;
            }

            match parse_filename_date(name, date_format) {
                Ok(date) => {
                    self.entries.insert(date, path.clone());
                    outcome.added += 1;
                }
                Err(error) => {
                    warn!(file = name, error = %error, "skipping file with unparseable date");
                    outcome.skipped.push(name.to_string());
                }
            }
        }

        debug!(
            dir = %dir.display(),
            added = outcome.added,
            skipped = outcome.skipped.len(),
            "directory scan complete"
        );
        Ok(outcome)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dates in ascending order.
    pub fn sorted_dates(&self) -> Vec<NaiveDate> {
        self.entries.keys().copied().collect()
    }

    /// Paths in ascending date order.
    pub fn sorted_paths(&self) -> Vec<PathBuf> {
        self.entries.values().cloned().collect()
    }

    /// The path cataloged for a date, if any.
    pub fn get(&self, date: NaiveDate) -> Option<&Path> {
        self.entries.get(&date).map(PathBuf::as_path)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{date, file_path, temp_raster_dir};

    #[test]
    fn test_insert_path_parses_date() {
        let mut catalog = FileCatalog::new();
        let inserted = catalog
            .insert_path("/data/20240107.tif", "%Y%m%d.tif")
            .unwrap();
        assert_eq!(inserted, date(2024, 1, 7));
        assert_eq!(catalog.get(inserted), Some(Path::new("/data/20240107.tif")));
    }

    #[test]
    fn test_insert_path_rejects_mismatch() {
        let mut catalog = FileCatalog::new();
        assert!(matches!(
            catalog.insert_path("/data/readme.txt", "%Y%m%d.tif"),
            Err(StackError::Format { .. })
        ));
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_duplicate_date_last_writer_wins() {
        let mut catalog = FileCatalog::new();
        catalog.insert(date(2024, 1, 7), "/a/20240107.tif");
        catalog.insert(date(2024, 1, 7), "/b/20240107.tif");

        assert_eq!(catalog.len(), 1);
        assert_eq!(
            catalog.get(date(2024, 1, 7)),
            Some(Path::new("/b/20240107.tif"))
        );
    }

    #[test]
    fn test_sorted_order_is_chronological() {
        let mut catalog = FileCatalog::new();
        catalog.insert(date(2024, 3, 1), "/data/c.tif");
        catalog.insert(date(2024, 1, 1), "/data/a.tif");
        catalog.insert(date(2024, 2, 1), "/data/b.tif");

        assert_eq!(
            catalog.sorted_dates(),
            vec![date(2024, 1, 1), date(2024, 2, 1), date(2024, 3, 1)]
        );
        assert_eq!(
            catalog.sorted_paths(),
            vec![
                PathBuf::from("/data/a.tif"),
                PathBuf::from("/data/b.tif"),
                PathBuf::from("/data/c.tif"),
            ]
        );
    }

    #[test]
    fn test_scan_skips_malformed_and_filters_suffix() {
        let dir = temp_raster_dir(&[
            "20240101.tif",
            "20240102.tif",
            "notadate.tif",
            "notes.txt",
        ]);

        let mut catalog = FileCatalog::new();
        let outcome = catalog
            .scan_directory(dir.path(), DEFAULT_RASTER_EXTENSION, "%Y%m%d.tif")
            .unwrap();

        assert_eq!(outcome.added, 2);
        assert_eq!(outcome.skipped, vec!["notadate.tif".to_string()]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.get(date(2024, 1, 2)),
            Some(file_path(&dir, "20240102.tif").as_path())
        );
    }

    #[test]
    fn test_scan_missing_directory_fails() {
        let mut catalog = FileCatalog::new();
        assert!(matches!(
            catalog.scan_directory(Path::new("/no/such/dir"), ".tif", "%Y%m%d.tif"),
            Err(StackError::Path { .. })
        ));
    }
}
