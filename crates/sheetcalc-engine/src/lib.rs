//! sheetcalc_engine - Formula evaluation for sheets of text cells.

pub mod engine;
