pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use picaquote_core::config::LoadOptions;
use picaquote_export::ExportFormat;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "picaquote",
    about = "Picaquote operator CLI",
    long_about = "Price quote documents, export client quotes, inspect currency rates and configuration.",
    after_help = "Examples:\n  picaquote price quote.json\n  picaquote export quote.toml --format xlsx\n  picaquote rates --refresh\n  picaquote doctor --json"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a picaquote.toml config file")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Price a quote document (JSON or TOML) and print its summary")]
    Price {
        quote: PathBuf,
        #[arg(long, help = "Emit the full evaluation as JSON")]
        json: bool,
    },
    #[command(about = "Render a quote document as a client PDF or XLSX file")]
    Export {
        quote: PathBuf,
        #[arg(long, default_value = "pdf", help = "pdf | xlsx")]
        format: ExportFormat,
        #[arg(long, short, help = "Output file (defaults to <name>_Client_Quote.<ext>)")]
        output: Option<PathBuf>,
    },
    #[command(about = "List configured currencies, optionally refreshing rates from the provider")]
    Rates {
        #[arg(long, help = "Fetch current USD rates before listing")]
        refresh: bool,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, rate tables, templates and PDF converter readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let options = LoadOptions { config_path: cli.config, ..LoadOptions::default() };

    let result = match cli.command {
        Command::Price { quote, json } => commands::price::run(&options, &quote, json),
        Command::Export { quote, format, output } => {
            commands::export::run(&options, &quote, format, output)
        }
        Command::Rates { refresh } => commands::rates::run(&options, refresh),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run(&options) }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(&options, json) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Diagnostics go to stderr so stdout stays machine-readable.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}
