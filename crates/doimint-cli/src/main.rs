use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use doimint_cli::Config;
use doimint_client::DataCiteClient;
use doimint_core::{
    landing_url_with_suffix, map_row, AppError, RowOutcome, RowResult, RunConfig, RunSummary,
    SheetRow,
};
use doimint_sheet::SheetReader;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    // Setup logging (stderr to keep stdout clean for report lines)
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    // Parse command line arguments
    let config = Config::parse();
    let run = config
        .run_config()
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    let client = DataCiteClient::new(&run).context("Failed to initialise API client")?;

    // Read-only credential check; never reaches the row loop.
    if config.preflight {
        return preflight(&client, &run).await;
    }

    info!("Reading {}", config.file.display());
    let rows = read_rows(&config).map_err(|e| anyhow::anyhow!(e.user_message()))?;
    if rows.is_empty() {
        println!("No data rows found in {}", config.file.display());
        return Ok(());
    }

    // A blank doi needs a prefix to mint under; refuse the whole run before
    // the first request rather than skipping rows halfway through.
    if run.prefix.is_none() {
        if let Some(row) = rows.iter().find(|&row| blank_doi(row)) {
            anyhow::bail!(
                "row {}: {}",
                row.row_number,
                AppError::MissingPrefix.user_message()
            );
        }
    }

    info!("Found {} rows. Processing sequentially...", rows.len());
    let summary = process_rows(&client, &run, &rows).await;

    println!();
    println!("=== Summary ===");
    println!("Total rows: {}", summary.total());
    println!("Successful: {}", summary.successful());
    println!("Failed:     {}", summary.failed());

    if summary.failed() > 0 {
        anyhow::bail!("{} of {} rows failed", summary.failed(), summary.total());
    }
    Ok(())
}

/// Run the authentication-only check and exit.
async fn preflight(client: &DataCiteClient, run: &RunConfig) -> anyhow::Result<()> {
    if run.dry_run {
        println!("[preflight] skipped (dry-run)");
        return Ok(());
    }
    match client.preflight().await {
        Ok(label) => {
            println!("[preflight] authentication OK: {}", label);
            Ok(())
        }
        Err(e) => anyhow::bail!("Preflight failed: {}", e.user_message()),
    }
}

/// Reads the whole input up front so header problems and the missing-prefix
/// check surface before any request is sent.
fn read_rows(config: &Config) -> Result<Vec<SheetRow>, AppError> {
    SheetReader::open(&config.file)?.collect()
}

fn blank_doi(row: &SheetRow) -> bool {
    row.doi.as_deref().map_or(true, |doi| doi.trim().is_empty())
}

/// Processes rows strictly one at a time, in spreadsheet order. A failed
/// row is recorded and the run moves on to the next one.
async fn process_rows(
    client: &DataCiteClient,
    run: &RunConfig,
    rows: &[SheetRow],
) -> RunSummary {
    let total = rows.len();
    let mut summary = RunSummary::new();

    for (i, row) in rows.iter().enumerate() {
        let result = process_row(client, run, row).await;
        print_row_line(i + 1, total, run, &result);
        summary.record(result);
    }

    summary
}

/// Takes one row through validate -> build -> request -> record.
async fn process_row(client: &DataCiteClient, run: &RunConfig, row: &SheetRow) -> RowResult {
    let mapped = match map_row(row, run) {
        Ok(mapped) => mapped,
        Err(e) => return RowResult::failure(row.row_number, row.title.clone(), e.user_message()),
    };

    let sent = match &mapped.known_doi {
        // The row already carries an identifier: update in place. Any
        // suffix appending happened in the mapper, before the request.
        Some(doi) => client
            .update_doi(doi, mapped.attributes)
            .await
            .map(|returned| (RowOutcome::Updated, returned.or_else(|| Some(doi.clone())))),

        // No identifier: create and let the server mint the suffix. The
        // landing URL can only gain its suffix once the DOI exists, via a
        // corrective PATCH.
        None => match client.create_doi(mapped.attributes).await {
            Ok(minted) => {
                if run.append_suffix_to_url {
                    if let Some(doi) = &minted {
                        append_suffix_after_mint(client, row, &mapped.base_url, doi).await;
                    }
                }
                Ok((RowOutcome::Created, minted))
            }
            Err(e) => Err(e),
        },
    };

    match sent {
        Ok((outcome, doi)) => {
            let outcome = if run.dry_run {
                RowOutcome::Simulated
            } else {
                outcome
            };
            RowResult::success(row.row_number, row.title.clone(), outcome, doi)
        }
        Err(e) => RowResult::failure(row.row_number, row.title.clone(), e.user_message()),
    }
}

/// Post-mint half of the suffix rule. The record itself was created, so a
/// failed PATCH is logged rather than failing the row.
async fn append_suffix_after_mint(
    client: &DataCiteClient,
    row: &SheetRow,
    base_url: &str,
    doi: &str,
) {
    let Some(url) = landing_url_with_suffix(base_url, doi) else {
        warn!("row {}: minted DOI '{}' has no suffix to append", row.row_number, doi);
        return;
    };
    info!("row {}: appending suffix of {} to landing URL", row.row_number, doi);
    if let Err(e) = client.patch_landing_url(doi, &url).await {
        warn!(
            "row {}: failed to update landing URL for {}: {}",
            row.row_number,
            doi,
            e.user_message()
        );
    }
}

/// One status line per row, as the run progresses.
fn print_row_line(index: usize, total: usize, run: &RunConfig, result: &RowResult) {
    match result.outcome {
        RowOutcome::Created => println!(
            "[{}/{}] ✓ created: {} ({})",
            index,
            total,
            result.title,
            result.doi.as_deref().unwrap_or("no DOI returned")
        ),
        RowOutcome::Updated => println!(
            "[{}/{}] ✓ updated: {} ({})",
            index,
            total,
            result.title,
            result.doi.as_deref().unwrap_or("no DOI returned")
        ),
        RowOutcome::Simulated => {
            let detail = match &result.doi {
                Some(doi) => doi.clone(),
                None => format!(
                    "would mint under prefix {}",
                    run.prefix.as_deref().unwrap_or("-")
                ),
            };
            println!(
                "[{}/{}] ~ simulated: {} ({})",
                index, total, result.title, detail
            );
        }
        RowOutcome::Failed => println!(
            "[{}/{}] ✗ failed: {} (row {}): {}",
            index,
            total,
            result.title,
            result.row_number,
            result.error.as_deref().unwrap_or("unknown error")
        ),
    }
}
