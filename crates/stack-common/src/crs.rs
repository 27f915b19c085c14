//! Coordinate reference system identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A canonical CRS identifier string, e.g. `EPSG:32633`.
///
/// Source files arrive in arbitrary reference systems, so the identifier is
/// open-world rather than a closed enum. Identifiers in `authority:code`
/// form are stored with the authority upper-cased, so `epsg:4326` and
/// `EPSG:4326` compare equal. Anything else (WKT, proj strings) is kept
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Crs(String);

impl Crs {
    /// Create a CRS identifier, normalizing `authority:code` forms.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        match id.split_once(':') {
            Some((authority, code))
                if !authority.is_empty()
                    && !code.is_empty()
                    && authority.chars().all(|c| c.is_ascii_alphabetic()) =>
            {
                Self(format!("{}:{}", authority.to_ascii_uppercase(), code))
            }
            _ => Self(id),
        }
    }

    /// The canonical identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The authority prefix (`EPSG` in `EPSG:4326`), if the identifier has
    /// `authority:code` form.
    pub fn authority(&self) -> Option<&str> {
        self.0.split_once(':').map(|(authority, _)| authority)
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Crs {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_authority_case() {
        assert_eq!(Crs::new("epsg:4326"), Crs::new("EPSG:4326"));
        assert_eq!(Crs::new("epsg:4326").as_str(), "EPSG:4326");
    }

    #[test]
    fn test_distinct_codes_differ() {
        assert_ne!(Crs::new("EPSG:4326"), Crs::new("EPSG:32633"));
    }

    #[test]
    fn test_authority() {
        assert_eq!(Crs::new("epsg:3857").authority(), Some("EPSG"));
        assert_eq!(Crs::new("+proj=longlat +datum=WGS84").authority(), None);
    }

    #[test]
    fn test_non_code_identifiers_kept_verbatim() {
        let wkt = "GEOGCS[\"WGS 84\"]";
        assert_eq!(Crs::new(wkt).as_str(), wkt);
    }
}
