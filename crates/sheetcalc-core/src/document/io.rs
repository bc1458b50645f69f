use super::Document;
use crate::error::{Result, SheetcalcError};
use crate::storage::{Format, parse_csv, read_json, write_csv, write_json};
use log::debug;
use sheetcalc_engine::engine::Sheet;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

const MAX_SHEET_FILE_BYTES: u64 = 64 * 1_048_576; // 64 MiB

fn check_size(path: &Path) -> Result<()> {
    let meta = std::fs::metadata(path)?;
    if meta.len() > MAX_SHEET_FILE_BYTES {
        return Err(SheetcalcError::FileTooLarge {
            path: path.to_path_buf(),
            size: meta.len(),
            max: MAX_SHEET_FILE_BYTES,
        });
    }
    Ok(())
}

impl Document {
    /// Load a sheet from disk, choosing the format from the extension.
    pub fn open(path: &Path) -> Result<Document> {
        let format = Format::from_path(path)?;
        check_size(path)?;
        let file = File::open(path)?;
        let mut doc = Document::read_from(file, format)?;
        debug!("loaded {} rows from {}", doc.sheet.len(), path.display());
        doc.file_path = Some(path.to_path_buf());
        Ok(doc)
    }

    /// Load a sheet from any reader in the given format.
    pub fn read_from<R: Read>(mut reader: R, format: Format) -> Result<Document> {
        let sheet = match format {
            Format::Json => read_json(reader)?,
            Format::Csv => {
                let mut content = String::new();
                reader.read_to_string(&mut content)?;
                parse_csv(&content)?
            }
        };
        Ok(Document::from_sheet(sheet))
    }

    /// Evaluate and write the result to `writer`.
    pub fn write_evaluated<W: Write>(&self, writer: W, format: Format, pretty: bool) -> Result<()> {
        write_sheet(writer, &self.evaluated(), format, pretty)
    }

    /// Evaluate and write the result to a file, format chosen by extension.
    pub fn save_evaluated(&self, path: &Path, pretty: bool) -> Result<()> {
        let format = Format::from_path(path)?;
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_evaluated(&mut writer, format, pretty)?;
        writer.flush()?;
        Ok(())
    }
}

/// Write a sheet in the given format.
pub fn write_sheet<W: Write>(writer: W, sheet: &Sheet, format: Format, pretty: bool) -> Result<()> {
    match format {
        Format::Json => write_json(writer, sheet, pretty),
        Format::Csv => write_csv(writer, sheet),
    }
}
