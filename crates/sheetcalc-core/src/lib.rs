//! sheetcalc-core - Document model, storage formats and configuration.

pub mod config;
pub mod document;
pub mod error;
pub mod storage;

pub use config::{Config, load_config};
pub use document::{Document, EvalSummary, write_sheet};
pub use error::{Result, SheetcalcError};
pub use storage::Format;

pub use sheetcalc_engine::engine::{CellRef, EvalOptions, Sheet};
