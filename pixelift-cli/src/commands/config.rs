//! Config command - inspect and create the configuration file.

use clap::Subcommand;
use pixelift::config::{config_file_path, ConfigFile};

use crate::error::CliError;
use crate::runner::CliRunner;

/// Configuration subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Create the default config file if it does not exist
    Init,
    /// Print the config file path
    Path,
}

/// Run a config command.
pub fn run(command: ConfigCommands, verbose: bool) -> Result<(), CliError> {
    match command {
        ConfigCommands::Show => run_show(verbose),
        ConfigCommands::Init => run_init(),
        ConfigCommands::Path => run_path(),
    }
}

/// Show all effective settings, defaults applied.
fn run_show(verbose: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(verbose)?;
    runner.log_startup("config show");
    let config = runner.config();

    println!("Configuration Settings");
    println!("======================");
    println!();
    println!("File: {}", config_file_path().display());
    println!("Plan tier: {}", config.plan_tier());
    println!();

    println!("[account]");
    println!("  user_id = {}", config.account.user_id);
    println!("  plan = {}", unset_or(config.account.plan.as_deref()));
    println!(
        "  monthly_quota = {}",
        unset_or(config.account.monthly_quota.map(|q| q.to_string()).as_deref())
    );
    println!();

    println!("[service]");
    println!("  api_url = {}", config.service.api_url);
    // Never echo the bearer token.
    println!(
        "  api_key = {}",
        if config.service.api_key.is_some() {
            "(set)"
        } else {
            "(not set)"
        }
    );
    println!("  state_dir = {}", config.service.state_dir.display());
    println!();

    println!("[validator]");
    println!("  pixel_ceiling = {}", config.validator.pixel_ceiling);
    println!("  memory_budget_mib = {}", config.validator.memory_budget_mib);
    println!("  max_segments = {}", config.validator.max_segments);
    println!();

    println!("[queue]");
    println!("  progress_tick_ms = {}", config.queue.progress_tick_ms);
    println!("  eta_base_secs = {}", config.queue.eta_base_secs);
    println!("  eta_secs_per_mib = {}", config.queue.eta_secs_per_mib);
    println!(
        "  eta_secs_per_scale_step = {}",
        config.queue.eta_secs_per_scale_step
    );
    println!("  max_depth = {}", config.queue.max_depth);
    println!();

    println!("[history]");
    println!("  retention_days = {}", config.history.retention_days);
    println!("  max_items = {}", config.history.max_items);
    println!(
        "  cleanup_interval_hours = {}",
        config.history.cleanup_interval_hours
    );
    println!("  janitor_check_secs = {}", config.history.janitor_check_secs);
    println!();

    println!("[logging]");
    println!("  file = {}", config.logging.file.display());

    Ok(())
}

/// Create the default config file if missing.
fn run_init() -> Result<(), CliError> {
    let path = config_file_path();
    if path.exists() {
        println!("Configuration already exists at {}", path.display());
        return Ok(());
    }

    let created = ConfigFile::ensure_exists().map_err(|e| CliError::Config(e.to_string()))?;
    println!("✓ Created {}", created.display());
    println!("Edit it to set your account and plan, then run 'pixelift config show'.");
    Ok(())
}

/// Print the config file path.
fn run_path() -> Result<(), CliError> {
    println!("{}", config_file_path().display());
    Ok(())
}

fn unset_or(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => "(not set)",
    }
}
