//! Packload CLI - CSV import/export for travel packages
//!
//! # Main Commands
//!
//! ```bash
//! packload serve                     # Start HTTP server (port 3000)
//! packload export -o packages.csv   # Export all packages to CSV
//! packload import packages.csv      # Import a CSV into the package API
//! ```
//!
//! # Debug Commands (for development)
//!
//! ```bash
//! packload validate packages.csv    # Parse + validate locally, no network
//! packload import file.csv --dry-run
//! ```

use clap::{Parser, Subcommand};
use packload::{
    csv, pipeline, validation, ImportOutcome, PackagesApi, ValidationReport,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "packload")]
#[command(about = "CSV import/export for travel package administration", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start HTTP server
    Serve {
        /// Port to listen on (PACKLOAD_PORT overrides the default)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Export all packages from the API to a CSV file
    Export {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import a CSV file into the package API
    Import {
        /// Input CSV file
        input: PathBuf,

        /// Validate and check categories, but create nothing
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate a CSV file locally (no network, no category check)
    Validate {
        /// Input CSV file
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve { port } => cmd_serve(port).await,
        Commands::Export { output } => cmd_export(output.as_deref()).await,
        Commands::Import { input, dry_run } => cmd_import(&input, dry_run).await,
        Commands::Validate { input } => cmd_validate(&input),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn cmd_serve(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let port = port
        .or_else(|| {
            std::env::var("PACKLOAD_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
        })
        .unwrap_or(3000);
    packload::server::start_server(port).await
}

async fn cmd_export(output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let api = PackagesApi::from_env()?;
    eprintln!("📦 Exporting packages from {}", api.base_url());

    let text = pipeline::export_csv(&api).await?;
    let row_count = text.lines().count().saturating_sub(1);
    eprintln!("✅ Exported {} packages", row_count);

    write_output(&text, output)?;
    Ok(())
}

async fn cmd_import(input: &Path, dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
    let api = PackagesApi::from_env()?;
    eprintln!("📄 Importing: {}", input.display());

    match pipeline::import_file(&api, input, dry_run).await? {
        ImportOutcome::EmptyFile => {
            return Err("Invalid CSV format or empty file".into());
        }
        ImportOutcome::Rejected(report) => {
            eprintln!("❌ Validation failed. {} rows have errors.", report.failed);
            print_report(&report);
            std::process::exit(1);
        }
        ImportOutcome::Completed(report) => {
            eprintln!(
                "\n📊 Import completed. {} successful, {} failed",
                report.successful, report.failed
            );
            print_report(&report);
            if report.failed > 0 {
                std::process::exit(1);
            }
        }
    }
    Ok(())
}

fn cmd_validate(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("✔️  Validating: {}", input.display());

    let text = csv::read_file(input)?;
    let sheet = csv::parse(&text);
    if sheet.rows.is_empty() && sheet.malformed.is_empty() {
        return Err("Invalid CSV format or empty file".into());
    }

    let mut report = validation::validate(&sheet.rows);
    for malformed in &sheet.malformed {
        report.record_malformed(malformed);
    }

    eprintln!(
        "\n📊 Results: {} rows, {} valid, {} invalid",
        report.total, report.successful, report.failed
    );
    print_report(&report);

    if report.failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

/// Print up to 5 detailed error lines, then a "+N more" indicator.
fn print_report(report: &ValidationReport) {
    for error in report.errors.iter().take(5) {
        eprintln!("   Row {} [{}]: {}", error.row, error.field, error.message);
    }
    if report.errors.len() > 5 {
        eprintln!("   +{} more", report.errors.len() - 5);
    }
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
