use log::info;
use sheetcalc_engine::engine::{CellDiagnostic, EvalOptions, Sheet};
use std::path::PathBuf;

/// Counts from one evaluation pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EvalSummary {
    pub formulas: usize,
    pub errors: usize,
}

/// A loaded sheet plus the settings used to evaluate it.
#[derive(Clone, Debug, Default)]
pub struct Document {
    /// Source sheet as read from disk; never modified by evaluation.
    pub sheet: Sheet,
    /// Where the sheet was loaded from, if anywhere.
    pub file_path: Option<PathBuf>,
    pub options: EvalOptions,
}

impl Document {
    pub fn from_sheet(sheet: Sheet) -> Self {
        Document {
            sheet,
            ..Document::default()
        }
    }

    pub fn with_options(mut self, options: EvalOptions) -> Self {
        self.options = options;
        self
    }

    /// Evaluate every formula into a fresh sheet.
    pub fn evaluated(&self) -> Sheet {
        let out = self.sheet.evaluate_with(self.options);
        info!(
            "evaluated {} rows ({} formulas)",
            self.sheet.len(),
            self.sheet.formula_count()
        );
        out
    }

    /// Formula cells that evaluate to the error marker, with the reason.
    pub fn diagnostics(&self) -> Vec<CellDiagnostic> {
        self.sheet.diagnose(self.options)
    }

    pub fn summary(&self) -> EvalSummary {
        EvalSummary {
            formulas: self.sheet.formula_count(),
            errors: self.diagnostics().len(),
        }
    }
}
