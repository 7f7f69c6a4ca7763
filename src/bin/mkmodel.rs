//! Model file builder
//!
//! Turns a JSON model description into the binary layout `multalpha` reads.
//! Usage: cargo run --bin mkmodel -- model.json model.bin

use clap::Parser;
use multalpha::cli::Display;
use multalpha::model::{self, writer, ModelDescription};
use std::error::Error;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mkmodel", version)]
#[command(about = "Encode a JSON matrix-set description as a binary model file")]
struct Args {
    /// JSON description (symbol_count, shift_values, ..., block_rows)
    description: PathBuf,

    /// Output .bin file
    output: PathBuf,

    /// Read the written file back and compare
    #[arg(long)]
    verify: bool,

    /// Do not echo the model header
    #[arg(short, long)]
    quiet: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    multalpha::init_logging(args.verbose);
    let display = Display::new(args.quiet);

    let model = ModelDescription::from_file(&args.description)?.into_model()?;
    display.show_model_summary(model.header())?;
    writer::write_model_file(&args.output, &model)?;

    if args.verify {
        let reloaded = model::load(&args.output)?;
        if reloaded != model {
            return Err(format!("{} does not read back as written", args.output.display()).into());
        }
        log::info!("verified {}", args.output.display());
    }

    Ok(())
}
