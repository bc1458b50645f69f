//! Document state and logic (UI-agnostic).

mod io;
mod state;

pub use io::write_sheet;
pub use state::{Document, EvalSummary};
