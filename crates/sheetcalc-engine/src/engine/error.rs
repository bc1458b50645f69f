//! Errors raised while evaluating a single formula cell.

use thiserror::Error;

/// Why a formula cell evaluated to the error marker.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("cell is empty")]
    EmptyCell,

    #[error("not a formula")]
    NotAFormula,

    #[error("circular reference detected")]
    CircularReference,

    #[error("invalid expression: {0}")]
    InvalidExpression(String),

    #[error("mismatched parentheses")]
    MismatchedParentheses,

    #[error("division by zero")]
    DivisionByZero,

    #[error("reference chain deeper than {0} formulas")]
    MaxDepthExceeded(usize),
}

impl EvalError {
    pub(crate) fn invalid(reason: impl Into<String>) -> EvalError {
        EvalError::InvalidExpression(reason.into())
    }

    /// Errors that poison every formula on the current resolution chain
    /// instead of degrading the offending reference to zero.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            EvalError::CircularReference | EvalError::MaxDepthExceeded(_)
        )
    }
}

pub type EvalResult<T> = std::result::Result<T, EvalError>;
