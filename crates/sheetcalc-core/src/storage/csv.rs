//! CSV import/export.
//!
//! Record `i` of the file becomes row `i` of the sheet and field `j` becomes
//! column `j + 1`, so the first record is the usual header row. Empty fields
//! are left out of the row entirely.

use crate::error::{Result, SheetcalcError};
use log::warn;
use sheetcalc_engine::engine::{Row, Sheet};
use std::io::Write;

/// Parse CSV text into a sheet.
///
/// Quoted fields may span line breaks, so records are split while scanning
/// rather than per line. Parse errors report the line the record starts on.
pub fn parse_csv(content: &str) -> Result<Sheet> {
    let mut sheet = Sheet::new();

    for fields in split_records(content)? {
        let row: Row = fields
            .into_iter()
            .enumerate()
            .filter(|(_, field)| !field.is_empty())
            .map(|(col_idx, field)| (col_idx + 1, field))
            .collect();
        sheet.push_row(row);
    }

    Ok(sheet)
}

/// Split CSV text into records of fields.
///
/// Unquoted fields are trimmed; quoted fields keep their whitespace and
/// may contain commas, doubled quotes and line breaks. A record ends at a
/// `\n` (or `\r\n`) outside quotes; a trailing newline adds no record.
fn split_records(content: &str) -> Result<Vec<Vec<String>>> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut in_quotes = false;
    let mut pending = false;
    let mut line = 1;
    let mut record_line = 1;
    let mut chars = content.chars().peekable();

    let finish = |current: &mut String, quoted: bool| {
        let field = std::mem::take(current);
        if quoted { field } else { field.trim().to_string() }
    };

    while let Some(c) = chars.next() {
        if !pending {
            pending = true;
            record_line = line;
        }
        if c == '\n' {
            line += 1;
        }
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    current.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => current.push(c),
            }
            continue;
        }
        match c {
            '"' if current.trim().is_empty() => {
                current.clear();
                in_quotes = true;
                quoted = true;
            }
            ',' => {
                fields.push(finish(&mut current, quoted));
                quoted = false;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                fields.push(finish(&mut current, quoted));
                records.push(std::mem::take(&mut fields));
                quoted = false;
                pending = false;
            }
            c if quoted && c.is_whitespace() => {}
            _ => current.push(c),
        }
    }

    if in_quotes {
        return Err(SheetcalcError::Parse {
            line: record_line,
            message: "unterminated quoted field".to_string(),
        });
    }
    if pending {
        fields.push(finish(&mut current, quoted));
        records.push(fields);
    }
    Ok(records)
}

fn escape_field(field: &str) -> String {
    let needs_quotes = field.contains([',', '"', '\n', '\r'])
        || field.starts_with(char::is_whitespace)
        || field.ends_with(char::is_whitespace);
    if needs_quotes {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Write a sheet as CSV. Each row is written up to its highest populated
/// column; gaps become empty fields.
pub fn write_csv<W: Write>(mut writer: W, sheet: &Sheet) -> Result<()> {
    for (row_idx, row) in sheet.rows().iter().enumerate() {
        if row.contains_key(&0) {
            warn!("row {}: column 0 has no CSV position, dropping it", row_idx);
        }
        let max_col = row.keys().next_back().copied().unwrap_or(0);
        let line = (1..=max_col)
            .map(|col| row.get(&col).map(|text| escape_field(text)).unwrap_or_default())
            .collect::<Vec<_>>()
            .join(",");
        writeln!(writer, "{}", line)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_layout() {
        let sheet = parse_csv("Hours,Rate,Total\n10,2,=A1*B1\n,,\n").unwrap();
        assert_eq!(sheet.len(), 3);
        assert_eq!(sheet.get(0, 1), Some("Hours"));
        assert_eq!(sheet.get(1, 3), Some("=A1*B1"));
        assert!(sheet.row(2).unwrap().is_empty());
        assert_eq!(sheet.evaluate().get(1, 3), Some("20"));
    }

    #[test]
    fn test_split_records_quotes() {
        assert_eq!(
            split_records(r#" a , "b, c" ,"say ""hi""", "  pad  ""#).unwrap(),
            vec![vec!["a", "b, c", "say \"hi\"", "  pad  "]]
        );
    }

    #[test]
    fn test_split_records_crlf_and_multiline_fields() {
        assert_eq!(
            split_records("a,\"one\r\ntwo\"\r\nb\r\n").unwrap(),
            vec![vec!["a", "one\r\ntwo"], vec!["b"]]
        );
    }

    #[test]
    fn test_unterminated_quote_reports_record_start() {
        let err = parse_csv("a\n\"first\nsecond,\nthird").unwrap_err();
        assert!(matches!(err, SheetcalcError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_embedded_newline_survives_write_then_parse() {
        let mut sheet = Sheet::new();
        sheet.set(0, 1, "Notes");
        sheet.set(0, 2, "Total");
        sheet.set(1, 1, "line one\nline two");
        sheet.set(1, 2, "=2*3");
        sheet.set(2, 2, "=B1+1");

        let mut out = Vec::new();
        write_csv(&mut out, &sheet).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "Notes,Total\n\"line one\nline two\",=2*3\n,=B1+1\n");

        let parsed = parse_csv(&text).unwrap();
        assert_eq!(parsed, sheet);
        assert_eq!(parsed.evaluate().get(2, 2), Some("7"));
    }

    #[test]
    fn test_parse_csv_unterminated_quote() {
        let err = parse_csv("ok\n\"broken").unwrap_err();
        assert!(matches!(err, SheetcalcError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_write_csv_fills_gaps_and_escapes() {
        let mut sheet = Sheet::new();
        sheet.set(0, 1, "name");
        sheet.set(0, 3, "a,b");
        sheet.set(2, 2, " x");
        let mut out = Vec::new();
        write_csv(&mut out, &sheet).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "name,,\"a,b\"\n\n,\" x\"\n"
        );
    }
}
