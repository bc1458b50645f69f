//! JSON wire format.

use crate::error::Result;
use sheetcalc_engine::engine::Sheet;
use std::io::{Read, Write};

/// Deserialize a sheet from a JSON array of row objects.
pub fn read_json<R: Read>(reader: R) -> Result<Sheet> {
    Ok(serde_json::from_reader(reader)?)
}

/// Serialize a sheet as JSON followed by a newline.
pub fn write_json<W: Write>(mut writer: W, sheet: &Sheet, pretty: bool) -> Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut writer, sheet)?;
    } else {
        serde_json::to_writer(&mut writer, sheet)?;
    }
    writer.write_all(b"\n")?;
    Ok(())
}
