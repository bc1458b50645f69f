//! sheetcalc - Evaluate the formulas in a JSON or CSV sheet.

mod logging;

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{info, warn};
use sheetcalc_core::{Config, Document, Format, load_config, write_sheet};
use sheetcalc_engine::engine::{
    ERROR_MARKER, EvalOptions, FORMULA_MARKER, Sheet, evaluate_formula, format_number,
};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

/// Exit status when `--strict` is set and some cell evaluated to `#ERROR`.
const EXIT_CELL_ERRORS: u8 = 2;

#[derive(Parser)]
#[command(name = "sheetcalc")]
#[command(version, about = "Evaluate spreadsheet formulas in a JSON or CSV sheet")]
struct Cli {
    /// Input sheet (.json or .csv). Reads JSON from stdin when omitted or `-`.
    input: Option<PathBuf>,

    /// Write the evaluated sheet here instead of stdout (format by extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Format used for stdin/stdout (json or csv)
    #[arg(short, long, default_value = "json")]
    format: Format,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Fail formulas whose reference chain is deeper than this
    #[arg(long, value_parser = parse_depth)]
    max_depth: Option<usize>,

    /// Config file (default: the user config directory's sheetcalc/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Evaluate a single formula against the input sheet and print the number
    #[arg(short, long, value_name = "FORMULA")]
    expr: Option<String>,

    /// Explain every cell that evaluated to #ERROR on stderr
    #[arg(long)]
    explain: bool,

    /// Exit with status 2 if any cell evaluated to #ERROR
    #[arg(long)]
    strict: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(logging::level_for(cli.verbose, cli.quiet));

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let (config, warnings) = load_config(cli.config.as_deref());
    for warning in warnings {
        warn!("{}", warning);
    }
    let options = eval_options(cli, &config);
    let pretty = cli.pretty || config.output.pretty;

    if let Some(formula) = &cli.expr {
        let sheet = match &cli.input {
            Some(_) => load_document(cli)?.sheet,
            None => Sheet::new(),
        };
        return eval_expr(formula, &sheet, options);
    }

    let doc = load_document(cli)?.with_options(options);

    match &cli.output {
        Some(path) => {
            doc.save_evaluated(path, pretty)
                .with_context(|| format!("Failed to write '{}'", path.display()))?;
            info!("wrote {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            write_sheet(&mut out, &doc.evaluated(), cli.format, pretty)
                .context("Failed to write to stdout")?;
            out.flush()?;
        }
    }

    if cli.explain {
        for diag in doc.diagnostics() {
            eprintln!("{}: {} ({})", diag.cell, diag.error, diag.formula.trim());
        }
    }
    let summary = doc.summary();
    if summary.errors > 0 {
        info!(
            "{} of {} formula(s) evaluated to {}",
            summary.errors, summary.formulas, ERROR_MARKER
        );
        if cli.strict {
            return Ok(ExitCode::from(EXIT_CELL_ERRORS));
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn eval_options(cli: &Cli, config: &Config) -> EvalOptions {
    let mut options = config.eval_options();
    if cli.max_depth.is_some() {
        options.max_depth = cli.max_depth;
    }
    options
}

fn parse_depth(s: &str) -> std::result::Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

fn load_document(cli: &Cli) -> Result<Document> {
    match &cli.input {
        Some(path) if path.as_os_str() != "-" => {
            Document::open(path).with_context(|| format!("Failed to open '{}'", path.display()))
        }
        _ => {
            let mut input = Vec::new();
            io::stdin()
                .read_to_end(&mut input)
                .context("Failed to read stdin")?;
            Document::read_from(input.as_slice(), cli.format).context("Failed to parse stdin")
        }
    }
}

fn eval_expr(formula: &str, sheet: &Sheet, options: EvalOptions) -> Result<ExitCode> {
    let formula = formula.trim();
    // Bare arithmetic is accepted without the leading marker.
    let formula = if formula.starts_with(FORMULA_MARKER) {
        formula.to_string()
    } else {
        format!("{}{}", FORMULA_MARKER, formula)
    };

    let value = evaluate_formula(&formula, sheet, options)
        .with_context(|| format!("Failed to evaluate '{}'", formula))?;
    let Some(text) = format_number(value) else {
        bail!("'{}' evaluated to a non-finite number", formula);
    };
    println!("{}", text);
    Ok(ExitCode::SUCCESS)
}
