//! Formscan CLI - OCR layout reconstruction tool
//!
//! Converts OCR fragment JSON into a `label,value` table and concatenates
//! per-page CSV files.

mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use formscan_core::{
    CsvOptions, CsvSerializer, DocumentTable, FragmentReader, InvalidFragmentPolicy,
    JsonSerializer, LayoutPipeline, LineTerminator, PipelineConfig, RowGrouperConfig,
    DEFAULT_Y_TOLERANCE,
};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use crate::config::{Config, OutputFormat};

#[derive(Parser, Debug)]
#[command(
    name = "formscan",
    about = "Rebuild label/value tables from OCR fragments",
    long_about = "Rebuild the row and field structure of scanned forms from OCR output.\n\
                  \n\
                  Input is the JSON an OCR engine returns: per page, a list of text\n\
                  fragments with 4-corner bounding boxes. Output is a two-column\n\
                  label,value CSV (or JSON).",
    version
)]
struct Args {
    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Show detailed processing information
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Use this config file instead of ~/.formscan.toml and ./.formscan.toml
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert OCR fragment JSON to a label/value table
    #[command(long_about = "Convert OCR fragment JSON to a label/value table.\n\
                      \n\
                      INPUT is an array of pages or an object {\"pages\": [...]}. Each page\n\
                      is an array of [bbox, text] / [bbox, text, confidence] entries or\n\
                      {\"bbox\", \"text\"} objects. Use - to read from stdin.\n\
                      \n\
                      Defaults can be set via .formscan.toml configuration file.")]
    Convert {
        /// Input JSON file, or - for stdin
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Treat INPUT as a single page (an array of fragments)
        #[arg(long)]
        single_page: bool,

        /// Maximum vertical-center distance for fragments on one row
        #[arg(long, value_name = "PIXELS")]
        y_tolerance: Option<f64>,

        /// Sort rows top to bottom instead of keeping provider order
        #[arg(long, overrides_with = "no_sort_rows")]
        sort_rows: bool,

        /// Keep provider row order even if the config enables sorting
        #[arg(long, overrides_with = "sort_rows")]
        no_sort_rows: bool,

        /// Process pages one after another on the current thread
        #[arg(long, overrides_with = "parallel")]
        sequential: bool,

        /// Process pages in parallel even if the config disables it
        #[arg(long, overrides_with = "sequential")]
        parallel: bool,

        /// Drop malformed fragments with a warning instead of failing
        #[arg(long, overrides_with = "no_skip_invalid")]
        skip_invalid: bool,

        /// Fail on malformed fragments even if the config skips them
        #[arg(long, overrides_with = "skip_invalid")]
        no_skip_invalid: bool,

        /// Write a Label,Value header row (CSV only)
        #[arg(long, overrides_with = "no_header_row")]
        header_row: bool,

        /// Omit the header row even if the config enables it
        #[arg(long, overrides_with = "header_row")]
        no_header_row: bool,

        /// CSV row terminator
        #[arg(long, value_name = "crlf|lf")]
        line_terminator: Option<LineTerminator>,
    },

    /// Concatenate per-page CSV files into one document
    Merge {
        /// Per-page CSV files, in page order
        #[arg(value_name = "CSV", required = true)]
        inputs: Vec<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// CSV row terminator
        #[arg(long, value_name = "crlf|lf")]
        line_terminator: Option<LineTerminator>,
    },
}

fn init_logging(quiet: bool, verbose: bool) {
    let default_filter = if quiet {
        "error"
    } else if verbose {
        "info"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .init();
}

/// Value of an `--x` / `--no-x` pair; `None` when neither was given
fn switch(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

fn read_input(input: &Path) -> Result<String> {
    if input == Path::new("-") {
        let mut content = String::new();
        io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read input from stdin")?;
        return Ok(content);
    }
    fs::read_to_string(input)
        .with_context(|| format!("Failed to read input file: {}", input.display()))
}

fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content)
                .with_context(|| format!("Failed to write output file: {}", path.display()))?;
            log::info!("Wrote {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(content.as_bytes())
                .context("Failed to write to stdout")?;
            stdout.flush().context("Failed to write to stdout")?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.quiet, args.verbose);

    let config = Config::load(args.config.as_deref())?;
    let csv_config = config.csv();

    match args.command {
        Commands::Convert {
            input,
            output,
            format,
            single_page,
            y_tolerance,
            sort_rows,
            no_sort_rows,
            sequential,
            parallel,
            skip_invalid,
            no_skip_invalid,
            header_row,
            no_header_row,
            line_terminator,
        } => {
            // CLI args override config
            let defaults = config.convert();
            let format = format.or(defaults.format).unwrap_or_default();
            let policy = if switch(skip_invalid, no_skip_invalid)
                .or(defaults.skip_invalid)
                .unwrap_or(false)
            {
                InvalidFragmentPolicy::Skip
            } else {
                InvalidFragmentPolicy::Abort
            };
            let pipeline_config = PipelineConfig {
                grouping: RowGrouperConfig {
                    y_tolerance: y_tolerance
                        .or(defaults.y_tolerance)
                        .unwrap_or(DEFAULT_Y_TOLERANCE),
                    sort_rows_by_y: switch(sort_rows, no_sort_rows)
                        .or(defaults.sort_rows)
                        .unwrap_or(false),
                },
                parallel: switch(parallel, sequential)
                    .or(defaults.parallel)
                    .unwrap_or(true),
            };
            let csv_options = CsvOptions {
                line_terminator: line_terminator
                    .or(csv_config.line_terminator)
                    .unwrap_or_default(),
                header_row: switch(header_row, no_header_row)
                    .or(csv_config.header_row)
                    .unwrap_or(false),
            };

            let json = read_input(&input)?;
            let reader = FragmentReader::with_policy(policy);
            let pages = if single_page {
                vec![reader.read_page(&json)?]
            } else {
                reader.read_document(&json)?
            };
            log::info!(
                "Read {} pages, {} fragments from {}",
                pages.len(),
                pages.iter().map(Vec::len).sum::<usize>(),
                input.display()
            );

            let pipeline = LayoutPipeline::with_config(pipeline_config)?;
            let table = pipeline.process_document(pages);
            log::info!("Reconstructed {} records", table.len());

            let rendered = render(&table, format, csv_options)?;
            write_output(output.as_deref(), &rendered)?;
        }

        Commands::Merge {
            inputs,
            output,
            line_terminator,
        } => {
            let pages = inputs
                .iter()
                .map(|path| read_input(path))
                .collect::<Result<Vec<_>>>()?;

            let serializer = CsvSerializer::with_options(CsvOptions {
                line_terminator: line_terminator
                    .or(csv_config.line_terminator)
                    .unwrap_or_default(),
                header_row: false,
            });
            let merged = serializer
                .concat_pages(&pages)
                .context("Failed to merge CSV pages")?;
            log::info!("Merged {} CSV files", pages.len());

            write_output(output.as_deref(), &merged)?;
        }
    }

    Ok(())
}

fn render(table: &DocumentTable, format: OutputFormat, csv_options: CsvOptions) -> Result<String> {
    let rendered = match format {
        OutputFormat::Csv => CsvSerializer::with_options(csv_options).serialize_table(table)?,
        OutputFormat::Json => {
            let mut json = JsonSerializer::new().serialize_table(table)?;
            json.push('\n');
            json
        }
    };
    Ok(rendered)
}
