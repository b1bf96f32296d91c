//! History command - list and prune completed upscales.

use chrono::{DateTime, Utc};
use clap::Subcommand;
use pixelift::events::NullEventSink;
use pixelift::history::{HistoryFilter, HistoryItem, HistorySort};
use std::sync::Arc;

use super::common::{format_size, FormatArg, SortArg};
use crate::error::CliError;
use crate::runner::CliRunner;

/// History subcommands.
#[derive(Debug, Subcommand)]
pub enum HistoryCommands {
    /// List completed upscales
    List {
        /// Keep only items of this content type
        #[arg(long = "type", value_enum)]
        image_type: Option<FormatArg>,

        /// Keep only items expiring within this many days
        #[arg(long, value_name = "DAYS")]
        expiring: Option<u32>,

        /// Ordering of the listing
        #[arg(long, value_enum, default_value = "newest")]
        sort: SortArg,
    },
    /// Delete specific items by ID
    Delete {
        /// History item IDs to remove
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Delete all history items
    Clear,
}

/// Run a history command.
pub async fn run(command: HistoryCommands, offline: bool, verbose: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(verbose)?;
    runner.log_startup("history");

    let retention_days = runner.config().history.retention_days;
    let service = runner
        .create_service(offline, Arc::new(NullEventSink))
        .await?;

    match command {
        HistoryCommands::List {
            image_type,
            expiring,
            sort,
        } => {
            let filter = HistoryFilter {
                image_type: image_type.map(Into::into),
                expiring_within_days: expiring,
            };
            let view = service.history(&filter, sort.into()).await;
            let total = service
                .history(&HistoryFilter::default(), HistorySort::default())
                .await
                .len();
            run_list(&view, total, retention_days)
        }
        HistoryCommands::Delete { ids } => {
            let removed = service.delete_history(&ids).await.map_err(CliError::History)?;
            println!("✓ Removed {} item(s)", removed);
            if removed < ids.len() {
                println!(
                    "{} ID(s) did not match any history item",
                    ids.len() - removed
                );
            }
            Ok(())
        }
        HistoryCommands::Clear => {
            let removed = service.clear_history().await.map_err(CliError::History)?;
            println!("✓ Cleared {} item(s) from history", removed);
            Ok(())
        }
    }
}

fn run_list(view: &[HistoryItem], total: usize, retention_days: u32) -> Result<(), CliError> {
    if view.is_empty() {
        println!("No history items found.");
        println!();
        println!(
            "Completed upscales stay listed here for {} days.",
            retention_days
        );
        return Ok(());
    }

    println!("Found {} item(s) ({} in history):", view.len(), total);
    println!();

    let now = Utc::now();
    for item in view {
        print_item_info(item, now, retention_days);
    }
    Ok(())
}

/// Print information about a single history item.
fn print_item_info(item: &HistoryItem, now: DateTime<Utc>, retention_days: u32) {
    println!(
        "  {} (x{}, {}, {})",
        item.file_name,
        item.scale,
        item.image_type,
        format_size(item.file_size_bytes)
    );
    println!("      ID: {}", item.id);
    println!(
        "      Completed: {}",
        item.timestamp.format("%Y-%m-%d %H:%M UTC")
    );
    println!(
        "      Expires: {}",
        expiry_label(item.days_until_expiry(now, retention_days))
    );
    println!("      Result: {}", item.url);
    println!();
}

fn expiry_label(days: i64) -> String {
    match days {
        d if d < 0 => "expired".to_string(),
        0 => "today".to_string(),
        1 => "in 1 day".to_string(),
        d => format!("in {} days", d),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_label_wording() {
        assert_eq!(expiry_label(-3), "expired");
        assert_eq!(expiry_label(0), "today");
        assert_eq!(expiry_label(1), "in 1 day");
        assert_eq!(expiry_label(28), "in 28 days");
    }
}
