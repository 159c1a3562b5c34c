mod error;
mod parser;
mod report;
mod settings;
mod sheets;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::SheetsError;
use crate::settings::Settings;

#[derive(Parser)]
#[command(
    name = "route_report",
    about = "Match a Postman collection against API docs and report every output field"
)]
struct Cli {
    /// Defaults to `report` with the configured file names
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the route details CSV
    Report {
        /// Collection export (default: postman_collection.json)
        #[arg(long)]
        collection: Option<PathBuf>,
        /// Markdown API documentation (default: API_ENDPOINTS.md)
        #[arg(long)]
        docs: Option<PathBuf>,
        /// CSV to write (default: route_details_final.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Publish a CSV file to a spreadsheet, replacing its first worksheet
    Upload {
        /// Spreadsheet title; created if no spreadsheet has it
        sheet_name: String,
        /// CSV to upload (default: the report output)
        csv: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load().context("Invalid ROUTE_REPORT_* configuration")?;
    tracing::debug!(
        collection = %settings.collection_path.display(),
        docs = %settings.docs_path.display(),
        output = %settings.output_path.display(),
        token_set = settings.sheets_token.is_some(),
        "Loaded settings"
    );

    let command = cli.command.unwrap_or(Commands::Report {
        collection: None,
        docs: None,
        output: None,
    });

    match command {
        Commands::Report {
            collection,
            docs,
            output,
        } => {
            let collection = collection.unwrap_or(settings.collection_path);
            let docs = docs.unwrap_or(settings.docs_path);
            let output = output.unwrap_or(settings.output_path);

            let summary = report::run(&collection, &docs, &output)
                .with_context(|| format!("Report run failed for {}", collection.display()))?;
            println!("Generated {}", output.display());
            summary.print();
        }
        Commands::Upload { sheet_name, csv } => {
            let csv = csv.unwrap_or(settings.output_path);
            let rows = sheets::read_csv_rows(&csv)?;
            let token = settings.sheets_token.ok_or(SheetsError::MissingToken)?;
            let client = sheets::SheetsClient::new(
                token,
                &settings.sheets_api_base,
                &settings.drive_api_base,
            )?;

            let pb = ProgressBar::new_spinner();
            pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
            pb.set_message(format!("Uploading {} rows to '{}'", rows.len(), sheet_name));
            pb.enable_steady_tick(Duration::from_millis(100));
            let outcome = client.publish(&sheet_name, &rows).await;
            pb.finish_and_clear();

            let outcome = outcome.with_context(|| format!("Upload to '{}' failed", sheet_name))?;
            if outcome.created {
                println!("Created new sheet: {}", sheet_name);
                println!("Share it with your account if the token belongs to a service account.");
            }
            println!(
                "Successfully uploaded {} rows to '{}'.",
                outcome.rows, sheet_name
            );
            println!("Link: {}", outcome.url);
            tracing::debug!(id = %outcome.spreadsheet_id, "Upload complete");
        }
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }
    Ok(())
}
