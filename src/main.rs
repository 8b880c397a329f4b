use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use tally_export::artifact;
use tally_export::config::Config;
use tally_export::logging;
use tally_export::pipeline::validator::IssueSeverity;
use tally_export::{Converter, ProfileRegistry};

#[derive(Parser)]
#[command(name = "tally-export")]
#[command(about = "Converts ERP CSV exports into Tally ERP 9 import XML")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the configuration file (defaults to ./config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a CSV export into a Tally import document
    Convert {
        /// Record type to convert (see list-types)
        #[arg(long = "type")]
        type_name: String,
        /// Path to the CSV file
        #[arg(long)]
        input: PathBuf,
        /// Directory for the generated XML (defaults to the configured one)
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Print the conversion summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// List supported record types and their download filenames
    ListTypes,
    /// Validate the profile registry and report filename-table gaps
    CheckRegistry,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize logging
    logging::init_logging();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let registry = Arc::new(ProfileRegistry::with_builtins());
    registry.validate();

    match cli.command {
        Commands::Convert {
            type_name,
            input,
            output_dir,
            json,
        } => {
            // The file read is the only blocking I/O in a conversion; bound
            // it so a stalled upload can't pin the request.
            let bytes = tokio::time::timeout(
                Duration::from_secs(config.read_timeout_seconds),
                tokio::fs::read(&input),
            )
            .await
            .map_err(|_| anyhow::anyhow!("timed out reading {}", input.display()))??;

            let converter = Converter::new(Arc::clone(&registry), config.company.clone());
            let result = converter.convert(&type_name, &bytes)?;

            for diagnostic in &result.diagnostics {
                let column = diagnostic.column.as_deref().unwrap_or("-");
                let label = match diagnostic.severity {
                    IssueSeverity::Error => "skipped",
                    IssueSeverity::Warning => "warning",
                };
                warn!(
                    "{} line {} [{}]: {}",
                    label, diagnostic.line, column, diagnostic.message
                );
            }

            let output_dir = output_dir.unwrap_or_else(|| PathBuf::from(&config.output_dir));
            let written = artifact::write_artifact(&output_dir, &result)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!(
                    "Converted {}: {} rows ({} valid, {} skipped)",
                    result.type_name, result.rows_total, result.rows_valid, result.rows_skipped
                );
                println!(
                    "Wrote {} (download as {})",
                    written.file_path.display(),
                    result.suggested_filename
                );
            }
        }
        Commands::ListTypes => {
            for type_name in registry.type_names() {
                println!("{:<20} {}", type_name, registry.filename_for(type_name));
            }
        }
        Commands::CheckRegistry => {
            let missing = registry.validate();
            if missing.is_empty() {
                println!("All conversion types have filename entries");
            } else {
                for type_name in missing {
                    println!("Missing filename entry: {}", type_name);
                }
            }
        }
    }

    Ok(())
}
