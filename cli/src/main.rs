//! cbcxml CLI - CbC reporting spreadsheet to OECD XML conversion
//!
//! A command-line tool that converts a Country-by-Country Reporting workbook
//! into an OECD CbC XML document.

mod input;

use cbcxml::render::{JsonFormat, XmlOptions};
use cbcxml::{CbcTables, XlsxReader};
use clap::{ArgAction, Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// CbC reporting spreadsheet to OECD CbC XML conversion
#[derive(Parser)]
#[command(
    name = "cbcxml",
    author = "iyulab",
    version,
    about = "Convert CbC reporting spreadsheets to OECD CbC XML",
    long_about = "cbcxml - Country-by-Country Reporting conversion tool.\n\n\
                  Reads the 'Table 1', 'Table 2' and 'Table 3' sheets of a CbC template \
                  workbook and writes an OECD CbC XML (urn:oecd:ties:cbc:v2) document."
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a workbook to CbC XML
    Convert {
        /// Input workbook (.xlsx)
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output compact XML (no indentation)
        #[arg(long)]
        compact: bool,

        /// Spaces per indentation level
        #[arg(long, default_value = "2")]
        indent: usize,

        /// Refuse inputs larger than this many megabytes
        #[arg(long, default_value_t = input::DEFAULT_MAX_SIZE_MB)]
        max_size_mb: u64,
    },

    /// Show the extracted tables as JSON
    Inspect {
        /// Input workbook (.xlsx)
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output compact JSON (no indentation)
        #[arg(long)]
        compact: bool,
    },

    /// Show workbook sheets, table metadata and record counts
    Info {
        /// Input workbook (.xlsx)
        input: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "error",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Convert {
            input,
            output,
            compact,
            indent,
            max_size_mb,
        } => {
            input::validate(&input, max_size_mb)?;
            tracing::info!(input = %input.display(), compact, indent, "converting workbook");

            let pb = create_spinner("Reading workbook...");
            let tables = cbcxml::extract_file(&input)?;
            pb.set_message("Generating XML...");

            let options = if compact {
                XmlOptions::compact()
            } else {
                XmlOptions::new().with_indent(indent)
            };
            let xml = cbcxml::render::to_xml(&tables, &options)?;
            tracing::debug!(bytes = xml.len(), warnings = tables.warnings.len(), "rendered");

            pb.finish_and_clear();
            print_warnings(&tables);
            write_output(output.as_deref(), &xml)?;

            if let Some(path) = output {
                println!(
                    "{} Converted to CbC XML: {}",
                    "✓".green().bold(),
                    path.display()
                );
            }
        }

        Commands::Inspect {
            input,
            output,
            compact,
        } => {
            input::validate(&input, input::DEFAULT_MAX_SIZE_MB)?;

            let pb = create_spinner("Reading workbook...");
            let tables = cbcxml::extract_file(&input)?;

            let format = if compact {
                JsonFormat::Compact
            } else {
                JsonFormat::Pretty
            };
            let json = cbcxml::render::to_json(&tables, format)?;

            pb.finish_and_clear();
            write_output(output.as_deref(), &json)?;

            if let Some(path) = output {
                println!(
                    "{} Extracted tables written to: {}",
                    "✓".green().bold(),
                    path.display()
                );
            }
        }

        Commands::Info { input } => {
            input::validate(&input, input::DEFAULT_MAX_SIZE_MB)?;

            let pb = create_spinner("Analyzing workbook...");
            let reader = XlsxReader::open(&input)?;
            let sheet_names: Vec<String> =
                reader.sheet_names().into_iter().map(String::from).collect();
            let tables = cbcxml::Extractor::new().extract(&reader);
            pb.finish_and_clear();

            print_info(&input, &sheet_names, &tables);
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

fn print_info(input: &Path, sheet_names: &[String], tables: &CbcTables) {
    let meta = &tables.table1.metadata;

    println!("{}", "Workbook Information".cyan().bold());
    println!("{}", "─".repeat(40));
    println!(
        "{}: {}",
        "File".bold(),
        input.file_name().unwrap_or_default().to_string_lossy()
    );
    println!("{}: {}", "Sheets".bold(), sheet_names.join(", "));
    if !meta.mne_group.is_empty() {
        println!("{}: {}", "MNE Group".bold(), meta.mne_group);
    }
    if !meta.fiscal_year.is_empty() {
        println!("{}: {}", "Fiscal Year".bold(), meta.fiscal_year);
    }
    if !meta.currency.is_empty() {
        println!("{}: {}", "Currency".bold(), meta.currency);
    }

    println!("\n{}", "Extracted Records".cyan().bold());
    println!("{}", "─".repeat(40));
    println!(
        "{}: {}",
        "Jurisdictions (Table 1)".bold(),
        tables.table1.jurisdictions.len()
    );
    println!(
        "{}: {}",
        "Constituent entities (Table 2)".bold(),
        tables.table2.entities.len()
    );
    println!(
        "{}: {}",
        "Additional info items (Table 3)".bold(),
        tables.table3.additional_info.len()
    );

    let orphans = tables.orphan_entities();
    if !orphans.is_empty() {
        println!(
            "{}: {}",
            "Entities not in Table 1".bold(),
            orphans.len()
        );
    }

    print_warnings(tables);
}

fn print_warnings(tables: &CbcTables) {
    for warning in &tables.warnings {
        eprintln!("{} {}", "!".yellow().bold(), warning);
    }
}

fn print_version() {
    println!("{} {}", "cbcxml".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Country-by-Country Reporting spreadsheet to OECD CbC XML conversion");
    println!();
    println!("Input: .xlsx workbooks with 'Table 1', 'Table 2', 'Table 3' sheets");
    println!("Output: OECD CbC XML (urn:oecd:ties:cbc:v2)");
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn write_output(path: Option<&Path>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", content)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_convert_args() {
        let cli = Cli::try_parse_from([
            "cbcxml", "-vv", "convert", "cbcr.xlsx", "-o", "out.xml", "--compact",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Convert {
                input,
                output,
                compact,
                indent,
                max_size_mb,
            } => {
                assert_eq!(input, PathBuf::from("cbcr.xlsx"));
                assert_eq!(output, Some(PathBuf::from("out.xml")));
                assert!(compact);
                assert_eq!(indent, 2);
                assert_eq!(max_size_mb, input::DEFAULT_MAX_SIZE_MB);
            }
            _ => panic!("expected convert"),
        }
    }
}
