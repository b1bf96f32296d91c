//! Usage command - show plan consumption for the current period.

use pixelift::events::NullEventSink;
use std::sync::Arc;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the usage command.
pub async fn run(offline: bool, verbose: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(verbose)?;
    runner.log_startup("usage");

    let service = runner
        .create_service(offline, Arc::new(NullEventSink))
        .await?;
    let stats = service.usage().await.map_err(CliError::Upscale)?;

    println!("Plan: {}", service.tier());
    match stats.monthly_limit {
        Some(limit) => {
            println!("Used this month: {} of {}", stats.upscales_used, limit);
            let remaining = stats
                .remaining_upscales
                .unwrap_or_else(|| limit.saturating_sub(stats.upscales_used));
            println!("Remaining: {}", remaining);
        }
        None => {
            println!("Used this month: {}", stats.upscales_used);
            println!("Remaining: unmetered");
        }
    }

    Ok(())
}
