//! Error types for sheetcalc core.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading, saving or configuring a sheet.
#[derive(Error, Debug)]
pub enum SheetcalcError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid config {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },

    #[error("Unsupported sheet format: {0}")]
    UnsupportedFormat(String),

    #[error("Refusing to read {}: file too large ({size} bytes, max {max})", .path.display())]
    FileTooLarge { path: PathBuf, size: u64, max: u64 },
}

pub type Result<T> = std::result::Result<T, SheetcalcError>;
