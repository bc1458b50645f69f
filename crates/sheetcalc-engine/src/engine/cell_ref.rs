//! Cell address parsing and formatting.
//!
//! Converts between spreadsheet-style addresses (e.g. "A1", "C2", "AA10")
//! and 1-based column/row coordinates. Column letters are a bijective
//! base-26 number (A=1, Z=26, AA=27); the digit run is the row number.
//!
//! # Examples
//!
//! ```
//! use sheetcalc_engine::engine::CellRef;
//!
//! let cell: CellRef = "B3".parse().unwrap();
//! assert_eq!(cell.col, 2);
//! assert_eq!(cell.row, 3);
//! assert_eq!(cell.to_string(), "B3");
//! ```

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// A reference to a cell by column and row (both 1-based).
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct CellRef {
    pub col: usize,
    pub row: usize,
}

impl CellRef {
    pub fn new(col: usize, row: usize) -> CellRef {
        CellRef { col, row }
    }

    /// Build a reference from an already split letter run and digit run.
    ///
    /// Returns `None` when either part is empty, contains unexpected
    /// characters, overflows, or decodes to zero.
    pub fn from_parts(letters: &str, digits: &str) -> Option<CellRef> {
        let col = Self::letters_to_col(letters)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let row = digits.parse::<usize>().ok().filter(|r| *r >= 1)?;
        Some(CellRef::new(col, row))
    }

    fn parse_a1(name: &str) -> Option<CellRef> {
        let caps = address_re().captures(name)?;
        Self::from_parts(&caps["letters"], &caps["numbers"])
    }

    /// Decode column letters to a 1-based index (A -> 1, Z -> 26, AA -> 27).
    pub fn letters_to_col(letters: &str) -> Option<usize> {
        if letters.is_empty() {
            return None;
        }
        let mut acc = 0usize;
        for c in letters.bytes() {
            if !c.is_ascii_uppercase() {
                return None;
            }
            let digit = (c - b'A') as usize + 1;
            acc = acc.checked_mul(26)?.checked_add(digit)?;
        }
        Some(acc)
    }

    /// Convert a 1-based column index to letters (1 -> A, 26 -> Z, 27 -> AA).
    /// Column 0 has no letter form and yields an empty string.
    pub fn col_to_letters(col: usize) -> String {
        let mut result = String::new();
        let mut n = col as u128;
        while n > 0 {
            n -= 1;
            result.insert(0, (b'A' + (n % 26) as u8) as char);
            n /= 26;
        }
        result
    }
}

fn address_re() -> &'static Regex {
    static ADDRESS_RE: OnceLock<Regex> = OnceLock::new();
    ADDRESS_RE.get_or_init(|| {
        Regex::new(r"^(?<letters>[A-Z]+)(?<numbers>[0-9]+)$")
            .expect("cell address regex must compile")
    })
}

impl std::str::FromStr for CellRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_a1(s).ok_or_else(|| format!("Invalid cell reference: {}", s))
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", CellRef::col_to_letters(self.col), self.row)
    }
}
