//! Reference resolution for formula cells.
//!
//! A formula body like `A1 * B1` is rewritten into a purely numeric
//! expression by replacing every address token with the value of the cell
//! it points at. Referenced formulas are evaluated recursively first.
//!
//! Two kinds of failure behave differently:
//!
//! - A reference that cannot be resolved (bad address, missing row or
//!   column, empty or non-numeric text, a nested formula that fails) is
//!   replaced with `0` and evaluation continues.
//! - A circular reference, or a chain deeper than the configured ceiling,
//!   fails every formula on the chain.

use log::{debug, trace};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

use super::arith::eval_arithmetic;
use super::cell_ref::CellRef;
use super::error::{EvalError, EvalResult};
use super::sheet::Sheet;

/// Marker character that starts a formula.
pub const FORMULA_MARKER: char = '=';

const ZERO: &str = "0";

/// Knobs for a single evaluation pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EvalOptions {
    /// Maximum number of formulas that may be in flight along one
    /// reference chain. `None` leaves recursion unbounded.
    pub max_depth: Option<usize>,
}

/// Whether the text is a formula (first non-whitespace char is `=`).
pub fn is_formula(text: &str) -> bool {
    text.trim_start().starts_with(FORMULA_MARKER)
}

fn reference_re() -> &'static Regex {
    static REFERENCE_RE: OnceLock<Regex> = OnceLock::new();
    REFERENCE_RE.get_or_init(|| {
        Regex::new(r"[A-Z]+[0-9]+").expect("formula reference regex must compile")
    })
}

/// Resolves formulas against one sheet, tracking which formulas are
/// currently being resolved so that cycles are caught.
pub struct Resolver<'a> {
    sheet: &'a Sheet,
    options: EvalOptions,
    in_flight: HashSet<String>,
}

impl<'a> Resolver<'a> {
    pub fn new(sheet: &'a Sheet, options: EvalOptions) -> Self {
        Resolver {
            sheet,
            options,
            in_flight: HashSet::new(),
        }
    }

    /// Rewrite a formula into its numeric expression (marker stripped).
    ///
    /// The formula's text stays in the in-flight set only while its own
    /// references are being resolved.
    pub fn resolve(&mut self, formula: &str) -> EvalResult<String> {
        let text = formula.trim();
        if text.is_empty() {
            return Err(EvalError::EmptyCell);
        }
        let Some(body) = text.strip_prefix(FORMULA_MARKER) else {
            return Err(EvalError::NotAFormula);
        };

        if self.in_flight.contains(text) {
            return Err(EvalError::CircularReference);
        }
        if let Some(limit) = self.options.max_depth {
            if self.in_flight.len() >= limit {
                return Err(EvalError::MaxDepthExceeded(limit));
            }
        }

        self.in_flight.insert(text.to_string());
        let substituted = self.substitute(body);
        self.in_flight.remove(text);

        let substituted = substituted?;
        trace!("{} => {}", text, substituted);
        Ok(substituted)
    }

    /// Resolve and evaluate a formula to a number.
    pub fn evaluate(&mut self, formula: &str) -> EvalResult<f64> {
        let expr = self.resolve(formula)?;
        eval_arithmetic(&expr)
    }

    fn substitute(&mut self, body: &str) -> EvalResult<String> {
        let mut out = String::with_capacity(body.len());
        let mut last = 0;

        for token in reference_re().find_iter(body) {
            out.push_str(&body[last..token.start()]);
            out.push_str(&self.reference_value(token.as_str())?);
            last = token.end();
        }
        out.push_str(&body[last..]);

        Ok(out)
    }

    /// Textual value substituted for one address token.
    fn reference_value(&mut self, token: &str) -> EvalResult<String> {
        let split = token
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(token.len());
        let (letters, digits) = token.split_at(split);

        let sheet = self.sheet;
        let Some(cell) = CellRef::from_parts(letters, digits) else {
            debug!("{}: address does not decode to a cell, using 0", token);
            return Ok(ZERO.to_string());
        };

        if cell.row >= sheet.len() {
            debug!(
                "{}: row {} out of bounds ({} rows), using 0",
                token,
                cell.row,
                sheet.len()
            );
            return Ok(ZERO.to_string());
        }

        let Some(raw) = sheet.row(cell.row).and_then(|row| row.get(&cell.col)) else {
            debug!("{}: column {} not present in row {}, using 0", token, cell.col, cell.row);
            return Ok(ZERO.to_string());
        };

        let text = raw.trim();
        if text.is_empty() {
            return Ok(ZERO.to_string());
        }

        if text.starts_with(FORMULA_MARKER) {
            // Display for f64 never uses exponent notation; non-finite values
            // render as `inf`/`NaN` and are rejected by the arithmetic pass.
            return match self.evaluate(text) {
                Ok(value) => Ok(value.to_string()),
                Err(err) if err.is_structural() => Err(err),
                Err(err) => {
                    debug!("{}: referenced formula failed ({}), using 0", token, err);
                    Ok(ZERO.to_string())
                }
            };
        }

        match text.parse::<f64>() {
            Ok(value) => Ok(value.to_string()),
            Err(_) => {
                debug!("{}: '{}' is not a number, using 0", token, text);
                Ok(ZERO.to_string())
            }
        }
    }
}

/// Evaluate one formula against a sheet with a fresh cycle set.
pub fn evaluate_formula(formula: &str, sheet: &Sheet, options: EvalOptions) -> EvalResult<f64> {
    Resolver::new(sheet, options).evaluate(formula)
}
