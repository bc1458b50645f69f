//! Spreadsheet engine API.
//!
//! This module provides the formula evaluation core for a sheet of text cells:
//!
//! - [`Sheet`], [`Row`] - Sparse sheet storage and whole-sheet evaluation
//! - [`CellRef`] - Cell address parsing (A1 notation to 1-based col/row)
//! - [`Resolver`] - Reference substitution with cycle detection
//! - [`eval_arithmetic`] - `+ - * /` and parentheses over plain numbers
//! - [`format_number`] - Minimal decimal formatting of results
//! - [`EvalError`] - Why a formula cell became [`ERROR_MARKER`]

mod arith;
mod cell_ref;
mod error;
mod format;
mod resolve;
mod sheet;

pub use arith::eval_arithmetic;
pub use cell_ref::CellRef;
pub use error::{EvalError, EvalResult};
pub use format::{ERROR_MARKER, format_number};
pub use resolve::{EvalOptions, FORMULA_MARKER, Resolver, evaluate_formula, is_formula};
pub use sheet::{CellDiagnostic, Row, Sheet, evaluate_cell};
