//! Terminal output: model summary and diagnostics on stderr, result on stdout
//!
//! Colors are only emitted when stderr is a terminal.

use crate::error::ChainError;
use crate::model::ModelHeader;
use crossterm::{
    queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    tty::IsTty,
};
use std::io::{self, stderr, stdout, Write};

pub struct Display {
    use_color: bool,
    quiet: bool,
}

impl Display {
    pub fn new(quiet: bool) -> Self {
        Display {
            use_color: stderr().is_tty(),
            quiet,
        }
    }

    fn colored(&self, out: &mut impl Write, color: Color, text: &str) -> io::Result<()> {
        if self.use_color {
            queue!(out, SetForegroundColor(color), Print(text), ResetColor)
        } else {
            queue!(out, Print(text))
        }
    }

    /// Echo of the model header
    pub fn show_model_summary(&self, header: &ModelHeader) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut err = stderr().lock();
        self.colored(&mut err, Color::Cyan, "Matrix data read:\n")?;
        queue!(
            err,
            Print(summary_line(header)),
            Print("\n"),
            Print(shift_line(header)),
            Print("\n")
        )?;
        err.flush()
    }

    pub fn show_error(&self, error: &ChainError) -> io::Result<()> {
        let mut err = stderr().lock();
        self.colored(&mut err, Color::Red, "error: ")?;
        queue!(err, Print(error), Print("\n"))?;
        err.flush()
    }

    /// The one line written to stdout on success
    pub fn show_result(&self, log_norm: f64) -> io::Result<()> {
        let mut out = stdout().lock();
        writeln!(out, "{}", format_result(log_norm))?;
        out.flush()
    }
}

pub fn format_result(log_norm: f64) -> String {
    format!("{:.14}", log_norm)
}

fn summary_line(header: &ModelHeader) -> String {
    format!(
        "{} symbols; simplex height={}; delta={}; {}; {} block rows.",
        header.symbol_count,
        header.simplex_height,
        header.delta,
        header.regularity,
        header.block_row_count()
    )
}

fn shift_line(header: &ModelHeader) -> String {
    let shifts: Vec<String> = header.shift_values.iter().map(|d| d.to_string()).collect();
    format!("shift amounts: {}", shifts.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RegularityMode;

    #[test]
    fn test_format_result_has_fourteen_decimals() {
        assert_eq!(format_result(5f64.ln()), "1.60943791243410");
        assert_eq!(format_result(0.0), "0.00000000000000");
        assert_eq!(format_result(-2.5), "-2.50000000000000");
    }

    #[test]
    fn test_summary_lines() {
        let header = ModelHeader {
            symbol_count: 3,
            shift_values: vec![0, 1, -2],
            simplex_height: 6,
            delta: 0.5,
            regularity: RegularityMode::SpliceOnly,
            block_row_sizes: vec![4, 3],
        };
        assert_eq!(
            summary_line(&header),
            "3 symbols; simplex height=6; delta=0.5; splice only; 2 block rows."
        );
        assert_eq!(shift_line(&header), "shift amounts: 0 1 -2");
    }
}
