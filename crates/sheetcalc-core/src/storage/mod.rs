//! Sheet storage formats.
//!
//! - JSON: array of objects keyed by column number (the wire format)
//! - CSV: line `i` is row `i`, field `j` is column `j + 1`

mod csv;
mod json;

pub use csv::{parse_csv, write_csv};
pub use json::{read_json, write_json};

use crate::error::{Result, SheetcalcError};
use std::path::Path;

/// On-disk representation of a sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Json,
    Csv,
}

impl Format {
    /// Pick a format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Format> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("json") => Ok(Format::Json),
            Some("csv") => Ok(Format::Csv),
            Some(other) => Err(SheetcalcError::UnsupportedFormat(other.to_string())),
            None => Err(SheetcalcError::UnsupportedFormat(format!(
                "{} has no extension",
                path.display()
            ))),
        }
    }
}

impl std::str::FromStr for Format {
    type Err = SheetcalcError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "csv" => Ok(Format::Csv),
            other => Err(SheetcalcError::UnsupportedFormat(other.to_string())),
        }
    }
}
