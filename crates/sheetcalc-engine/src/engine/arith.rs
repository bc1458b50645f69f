//! Arithmetic evaluation of fully substituted formula bodies.
//!
//! By the time an expression reaches this module every cell reference has
//! been replaced with a number, so the only legal characters are digits,
//! `.`, the four binary operators, parentheses and whitespace. Evaluation is
//! a single left-to-right scan over two stacks (operands and operators).
//!
//! There is deliberately no unary sign and no exponent notation: `-5`,
//! `2*-3` and `1e3` are all rejected.

use regex::Regex;
use std::sync::OnceLock;

use super::error::{EvalError, EvalResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Open,
}

impl Op {
    fn from_byte(b: u8) -> Option<Op> {
        match b {
            b'+' => Some(Op::Add),
            b'-' => Some(Op::Sub),
            b'*' => Some(Op::Mul),
            b'/' => Some(Op::Div),
            _ => None,
        }
    }

    fn precedence(self) -> u8 {
        match self {
            Op::Add | Op::Sub => 1,
            Op::Mul | Op::Div => 2,
            Op::Open => 0,
        }
    }
}

fn allowed_re() -> &'static Regex {
    static ALLOWED_RE: OnceLock<Regex> = OnceLock::new();
    ALLOWED_RE.get_or_init(|| {
        Regex::new(r"^[0-9.+\-*/()\s]+$").expect("arithmetic character class regex must compile")
    })
}

struct Stacks {
    nums: Vec<f64>,
    ops: Vec<Op>,
}

impl Stacks {
    fn apply_top(&mut self) -> EvalResult<()> {
        let op = match self.ops.pop() {
            Some(Op::Open) => return Err(EvalError::MismatchedParentheses),
            Some(op) => op,
            None => return Err(EvalError::invalid("missing operator")),
        };
        let (Some(b), Some(a)) = (self.nums.pop(), self.nums.pop()) else {
            return Err(EvalError::invalid("missing operand"));
        };
        let value = match op {
            Op::Add => a + b,
            Op::Sub => a - b,
            Op::Mul => a * b,
            Op::Div => {
                if b == 0.0 {
                    return Err(EvalError::DivisionByZero);
                }
                a / b
            }
            Op::Open => unreachable!("open paren handled above"),
        };
        self.nums.push(value);
        Ok(())
    }
}

/// Evaluate a numeric expression such as `(10 + 2) * 3`.
pub fn eval_arithmetic(expr: &str) -> EvalResult<f64> {
    if !allowed_re().is_match(expr) {
        return Err(EvalError::invalid("expression contains invalid characters"));
    }

    let bytes = expr.as_bytes();
    let mut stacks = Stacks {
        nums: Vec::new(),
        ops: Vec::new(),
    };

    let mut i = 0;
    while i < bytes.len() {
        let ch = bytes[i];
        if ch.is_ascii_whitespace() {
            i += 1;
        } else if ch.is_ascii_digit() || ch == b'.' {
            let start = i;
            while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                i += 1;
            }
            let literal = &expr[start..i];
            let n = literal
                .parse::<f64>()
                .map_err(|_| EvalError::invalid(format!("malformed number '{}'", literal)))?;
            stacks.nums.push(n);
        } else if ch == b'(' {
            stacks.ops.push(Op::Open);
            i += 1;
        } else if ch == b')' {
            loop {
                match stacks.ops.last() {
                    None => return Err(EvalError::MismatchedParentheses),
                    Some(Op::Open) => {
                        stacks.ops.pop();
                        break;
                    }
                    Some(_) => stacks.apply_top()?,
                }
            }
            i += 1;
        } else if let Some(op) = Op::from_byte(ch) {
            while stacks
                .ops
                .last()
                .is_some_and(|top| top.precedence() >= op.precedence())
            {
                stacks.apply_top()?;
            }
            stacks.ops.push(op);
            i += 1;
        } else {
            return Err(EvalError::invalid(format!("invalid character '{}'", ch as char)));
        }
    }

    while !stacks.ops.is_empty() {
        stacks.apply_top()?;
    }

    match stacks.nums.as_slice() {
        [value] => Ok(*value),
        [] => Err(EvalError::invalid("no operands")),
        _ => Err(EvalError::invalid("too many operands")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence() {
        assert_eq!(eval_arithmetic("2+3*4"), Ok(14.0));
        assert_eq!(eval_arithmetic("(2+3)*4"), Ok(20.0));
        assert_eq!(eval_arithmetic("10-4-3"), Ok(3.0));
        assert_eq!(eval_arithmetic("64/4/2"), Ok(8.0));
        assert_eq!(eval_arithmetic("2*3+4*5"), Ok(26.0));
    }

    #[test]
    fn test_whitespace_and_decimals() {
        assert_eq!(eval_arithmetic(" 1.5 *\t2 "), Ok(3.0));
        assert_eq!(eval_arithmetic(".5+5."), Ok(5.5));
        assert_eq!(eval_arithmetic("((7))"), Ok(7.0));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(eval_arithmetic("1/0"), Err(EvalError::DivisionByZero));
        assert_eq!(eval_arithmetic("1/(2-2)"), Err(EvalError::DivisionByZero));
        assert_eq!(eval_arithmetic("0/5"), Ok(0.0));
    }

    #[test]
    fn test_mismatched_parentheses() {
        assert_eq!(eval_arithmetic("1+2)"), Err(EvalError::MismatchedParentheses));
        assert_eq!(eval_arithmetic("(1+2"), Err(EvalError::MismatchedParentheses));
    }

    #[test]
    fn test_rejects_disallowed_characters() {
        assert!(matches!(
            eval_arithmetic("A1+2"),
            Err(EvalError::InvalidExpression(_))
        ));
        assert!(matches!(
            eval_arithmetic("1e3"),
            Err(EvalError::InvalidExpression(_))
        ));
        assert!(matches!(eval_arithmetic(""), Err(EvalError::InvalidExpression(_))));
    }

    #[test]
    fn test_no_unary_operators() {
        assert!(matches!(eval_arithmetic("-5"), Err(EvalError::InvalidExpression(_))));
        assert!(matches!(eval_arithmetic("2*-3"), Err(EvalError::InvalidExpression(_))));
        assert!(matches!(eval_arithmetic("+1"), Err(EvalError::InvalidExpression(_))));
    }

    #[test]
    fn test_malformed_operand_counts() {
        assert!(matches!(eval_arithmetic("1 2"), Err(EvalError::InvalidExpression(_))));
        assert!(matches!(eval_arithmetic("3+"), Err(EvalError::InvalidExpression(_))));
        assert!(matches!(eval_arithmetic("()"), Err(EvalError::InvalidExpression(_))));
        assert!(matches!(eval_arithmetic("1.2.3"), Err(EvalError::InvalidExpression(_))));
    }
}
