// GridMind CLI - headless selection tools
//
// Column labels, range compression and settings inspection without a grid.

mod exit_codes;

use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use gridmind_config::Settings;
use gridmind_core::{col_to_letter, compress_cells, letter_to_col, parse_range_ref, Cell, Range};
use serde::{Deserialize, Serialize};

use exit_codes::{EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};

/// Most cells `ranges` will expand from its arguments and stdin combined.
const MAX_EXPANDED_CELLS: usize = 1 << 20;

#[derive(Parser)]
#[command(name = "gridmind")]
#[command(about = "Spreadsheet selection tools (headless)")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert 0-indexed column numbers to letters, or letters back with --reverse
    #[command(after_help = "\
Examples:
  gridmind label 0 25 26 701      # A Z AA ZZ
  gridmind label --reverse AA XFD # 26 16383")]
    Label {
        /// Column numbers (or letters with --reverse)
        #[arg(required = true)]
        columns: Vec<String>,

        /// Convert letters to 0-indexed column numbers
        #[arg(long, short = 'r')]
        reverse: bool,
    },

    /// Compress selected cells into A1 ranges
    #[command(after_help = "\
Cells are A1 references (C5), A1 ranges (A1:B3) or 0-indexed row,col pairs (4,2).

Examples:
  gridmind ranges A1 A2 B1 B2 F6        # A1:B2, F6
  gridmind ranges 0,0 0,1 1,0 1,1       # A1:B2
  echo '[{\"row\":4,\"col\":2}]' | gridmind ranges --stdin --json")]
    Ranges {
        /// Selected cells
        cells: Vec<String>,

        /// Read a JSON array of {row, col, value} cells from stdin
        #[arg(long)]
        stdin: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show effective settings
    Config {
        /// Read this settings file instead of the default location
        #[arg(long, env = "GRIDMIND_SETTINGS")]
        file: Option<PathBuf>,

        /// Only print the settings file path
        #[arg(long)]
        path: bool,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        None => {
            // No subcommand = show help
            eprintln!("Usage: gridmind <command> [options]");
            eprintln!("       gridmind --help for more information");
            Ok(())
        }
        Some(Commands::Label { columns, reverse }) => cmd_label(columns, reverse),
        Some(Commands::Ranges { cells, stdin, json }) => cmd_ranges(cells, stdin, json),
        Some(Commands::Config { file, path }) => cmd_config(file, path),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// label
// ============================================================================

fn cmd_label(columns: Vec<String>, reverse: bool) -> Result<(), CliError> {
    for arg in &columns {
        if reverse {
            let col = letter_to_col(arg)
                .ok_or_else(|| CliError::usage(format!("not a column label: {}", arg)))?;
            println!("{}", col);
        } else {
            let col: usize = arg.parse().map_err(|_| {
                CliError::usage(format!("not a column number: {}", arg))
                    .with_hint("columns are 0-indexed; use --reverse to convert letters")
            })?;
            println!("{}", col_to_letter(col));
        }
    }
    Ok(())
}

// ============================================================================
// ranges
// ============================================================================

/// Stdin cell before coordinate validation.
#[derive(Deserialize)]
struct RawCell {
    row: i64,
    col: i64,
    #[serde(default)]
    value: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RangesOutput {
    cell_count: usize,
    ranges: Vec<String>,
    bounds: Vec<Range>,
}

fn cmd_ranges(args: Vec<String>, stdin: bool, json: bool) -> Result<(), CliError> {
    let mut cells = Vec::new();
    for arg in &args {
        cells.extend(parse_cell_arg(arg)?);
        check_expanded(cells.len())?;
    }
    if stdin {
        let mut input = String::new();
        io::stdin()
            .read_to_string(&mut input)
            .map_err(|e| CliError::error(format!("reading stdin: {}", e)))?;
        cells.extend(parse_stdin_cells(&input)?);
        check_expanded(cells.len())?;
    }
    log::debug!("compressing {} cell(s)", cells.len());

    let bounds = compress_cells(&cells);
    let ranges: Vec<String> = bounds.iter().map(Range::a1).collect();

    if json {
        let mut unique: Vec<(usize, usize)> = cells.iter().map(Cell::pos).collect();
        unique.sort_unstable();
        unique.dedup();
        let output = RangesOutput { cell_count: unique.len(), ranges, bounds };
        let text = serde_json::to_string_pretty(&output)
            .map_err(|e| CliError::error(e.to_string()))?;
        println!("{}", text);
    } else if !ranges.is_empty() {
        println!("{}", ranges.join(", "));
    }
    Ok(())
}

/// One CLI cell argument: `C5`, `A1:B3`, or `row,col`.
fn parse_cell_arg(arg: &str) -> Result<Vec<Cell>, CliError> {
    if let Some((row, col)) = arg.split_once(',') {
        let row = row.trim().parse::<usize>();
        let col = col.trim().parse::<usize>();
        return match (row, col) {
            (Ok(row), Ok(col)) => Ok(vec![Cell::new(row, col, "")]),
            _ => Err(CliError::usage(format!("not a row,col pair: {}", arg))),
        };
    }

    let range = parse_range_ref(arg).ok_or_else(|| {
        CliError::usage(format!("not a cell reference: {}", arg))
            .with_hint("use A1 notation (C5, A1:B3) or 0-indexed row,col")
    })?;
    check_expanded(range.cell_count())?;
    Ok(range.cells().map(|(row, col)| Cell::new(row, col, "")).collect())
}

fn check_expanded(count: usize) -> Result<(), CliError> {
    if count > MAX_EXPANDED_CELLS {
        return Err(CliError::usage(format!("selection expands to more than {} cells", MAX_EXPANDED_CELLS))
            .with_hint("pass smaller ranges, or the selected cells themselves on --stdin"));
    }
    Ok(())
}

/// Parse a JSON array of cells. Entries with negative or missing
/// coordinates are dropped; a payload that is not an array is an error.
fn parse_stdin_cells(input: &str) -> Result<Vec<Cell>, CliError> {
    let entries: Vec<serde_json::Value> = serde_json::from_str(input)
        .map_err(|e| CliError::usage(format!("stdin is not a JSON cell array: {}", e)))?;

    let mut cells = Vec::with_capacity(entries.len());
    for (i, entry) in entries.into_iter().enumerate() {
        let cell = serde_json::from_value::<RawCell>(entry)
            .ok()
            .and_then(|raw| Cell::from_raw(raw.row, raw.col, raw.value));
        match cell {
            Some(cell) => cells.push(cell),
            None => log::warn!("skipping invalid cell at index {}", i),
        }
    }
    Ok(cells)
}

// ============================================================================
// config
// ============================================================================

fn cmd_config(file: Option<PathBuf>, path_only: bool) -> Result<(), CliError> {
    let path = file.unwrap_or_else(Settings::config_path);
    if path_only {
        println!("{}", path.display());
        return Ok(());
    }

    let settings = if path.exists() {
        Settings::load_from(&path).map_err(|e| CliError::error(e.to_string()))?
    } else {
        log::info!("{} not found, showing defaults", path.display());
        Settings::default()
    };

    let text = serde_json::to_string_pretty(&settings).map_err(|e| CliError::error(e.to_string()))?;
    println!("{}", text);
    Ok(())
}
