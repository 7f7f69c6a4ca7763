//! multalpha - streaming matrix-chain log-norm over a symbol alphabet
//!
//! Usage: multalpha <MODEL.bin> <SYMBOLS.txt>
//!
//! Prints `ln Σ_i (1ᵀ · M_i[s1] · … · M_i[sn] · 1)` with 14 decimals on
//! stdout, or a diagnostic on stderr and exit status 1.

use clap::error::ErrorKind;
use clap::Parser;
use multalpha::cli::Display;
use multalpha::run::{self, SymbolSource};
use multalpha::{model, ChainError, RunConfig};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "multalpha", version)]
#[command(about = "Log-norm of a symbol-indexed matrix chain read from a text file")]
struct Args {
    /// Binary model file (k, shifts, simplex height, delta, mode, block rows, matrices)
    model: PathBuf,

    /// Symbol string file, digits '1'..; `-` reads stdin
    symbols: String,

    /// Lines concatenated per read batch
    #[arg(short, long)]
    lines_per_batch: Option<usize>,

    /// JSON run configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write per-block-row results as JSON
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// Do not echo the model header
    #[arg(short, long)]
    quiet: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn execute(args: &Args, display: &Display) -> Result<f64, ChainError> {
    let mut config = match &args.config {
        Some(path) => RunConfig::from_file(path)?,
        None => RunConfig::default(),
    };
    if let Some(n) = args.lines_per_batch {
        config = config.with_lines_per_batch(n);
    }
    config.validate()?;

    let model = model::load(&args.model)?;
    // a broken stderr should not fail the run
    let _ = display.show_model_summary(model.header());

    let source = SymbolSource::from_arg(&args.symbols);
    let outcome = run::evaluate_source(&model, &source, &config)?;

    if let Some(path) = &args.report {
        run::write_report(path, model.header(), &outcome)?;
    }
    Ok(outcome.log_norm)
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                let _ = e.print();
                return ExitCode::SUCCESS;
            }
            let message = e.to_string();
            let first = message.lines().next().unwrap_or("invalid arguments");
            let first = first.trim_start_matches("error: ").to_string();
            let _ = Display::new(true).show_error(&ChainError::Argument(first));
            return ExitCode::FAILURE;
        }
    };

    multalpha::init_logging(args.verbose);
    let display = Display::new(args.quiet);

    match execute(&args, &display) {
        Ok(log_norm) => match display.show_result(log_norm) {
            Ok(()) => ExitCode::SUCCESS,
            Err(_) => ExitCode::FAILURE,
        },
        Err(e) => {
            log::debug!("run failed: {:?}", e);
            let _ = display.show_error(&e);
            ExitCode::FAILURE
        }
    }
}
