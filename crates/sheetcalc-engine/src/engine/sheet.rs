//! Sheet data structures and whole-sheet evaluation.
//!
//! - [`Row`] - Sparse mapping from 1-based column index to cell text
//! - [`Sheet`] - Ordered rows; row 0 usually holds headers but is not special
//! - [`CellDiagnostic`] - Why a particular formula cell became `#ERROR`

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

use super::cell_ref::CellRef;
use super::error::{EvalError, EvalResult};
use super::format::{ERROR_MARKER, format_number};
use super::resolve::{EvalOptions, evaluate_formula, is_formula};

/// A sparse row: column index (1-based) to raw cell text.
pub type Row = BTreeMap<usize, String>;

/// A grid of textual cells.
///
/// On the wire a sheet is a JSON array of objects keyed by string-encoded
/// column numbers. `null` rows deserialize as empty rows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Sheet {
    rows: Vec<Row>,
}

/// A formula cell that failed to evaluate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellDiagnostic {
    pub cell: CellRef,
    pub formula: String,
    pub error: EvalError,
}

impl Sheet {
    pub fn new() -> Sheet {
        Sheet::default()
    }

    pub fn from_rows<I>(rows: I) -> Sheet
    where
        I: IntoIterator<Item = Row>,
    {
        Sheet {
            rows: rows.into_iter().collect(),
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, idx: usize) -> Option<&Row> {
        self.rows.get(idx)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Text at (row, col), if populated.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(&col).map(String::as_str)
    }

    /// Set a cell, growing the sheet with empty rows as needed.
    pub fn set(&mut self, row: usize, col: usize, text: impl Into<String>) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Row::new);
        }
        self.rows[row].insert(col, text.into());
    }

    pub fn push_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Evaluate every formula cell with default options.
    pub fn evaluate(&self) -> Sheet {
        self.evaluate_with(EvalOptions::default())
    }

    /// Produce a new sheet of the same shape where formula cells hold
    /// their numeric result or `#ERROR`. Never fails.
    pub fn evaluate_with(&self, options: EvalOptions) -> Sheet {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|(col, text)| {
                        let value = if is_formula(text) {
                            evaluate_cell(text, self, options)
                                .unwrap_or_else(|_| ERROR_MARKER.to_string())
                        } else {
                            text.clone()
                        };
                        (*col, value)
                    })
                    .collect()
            })
            .collect();
        Sheet { rows }
    }

    /// List every formula cell that would evaluate to `#ERROR`, in row-major order.
    pub fn diagnose(&self, options: EvalOptions) -> Vec<CellDiagnostic> {
        let mut out = Vec::new();
        for (row_idx, row) in self.rows.iter().enumerate() {
            for (col, text) in row {
                if !is_formula(text) {
                    continue;
                }
                if let Err(error) = evaluate_cell(text, self, options) {
                    out.push(CellDiagnostic {
                        cell: CellRef::new(*col, row_idx),
                        formula: text.clone(),
                        error,
                    });
                }
            }
        }
        out
    }

    /// Number of cells holding a formula.
    pub fn formula_count(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|row| row.values())
            .filter(|text| is_formula(text))
            .count()
    }
}

/// Evaluate and format a single formula cell.
pub fn evaluate_cell(formula: &str, sheet: &Sheet, options: EvalOptions) -> EvalResult<String> {
    let value = evaluate_formula(formula, sheet, options)?;
    format_number(value).ok_or_else(|| EvalError::invalid("result is not a finite number"))
}

impl Serialize for Sheet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.rows.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Sheet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let rows = Vec::<Option<Row>>::deserialize(deserializer)?;
        Ok(Sheet {
            rows: rows.into_iter().map(Option::unwrap_or_default).collect(),
        })
    }
}
