//! Upscale command - submit a file and follow it to completion.

use bytes::Bytes;
use clap::Args;
use pixelift::events::{BroadcastEventSink, CoreEvent};
use pixelift::queue::JobHandle;
use pixelift::service::UpscaleService;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;

use super::common::{format_size, FormatArg, PresetArg, TierArg};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the upscale command.
#[derive(Debug, Args)]
pub struct UpscaleArgs {
    /// Image file to upscale (PNG, JPEG, or WebP)
    pub file: PathBuf,

    /// Scale factor to apply
    #[arg(long, short)]
    pub scale: u32,

    /// Quality preset selecting the model family
    #[arg(long, value_enum, default_value = "photo")]
    pub preset: PresetArg,

    /// Output encoding (defaults to the source format)
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Act as this plan tier instead of the configured one
    #[arg(long, value_enum)]
    pub tier: Option<TierArg>,
}

/// Run the upscale command.
pub async fn run(args: UpscaleArgs, offline: bool, verbose: bool) -> Result<(), CliError> {
    let mut runner = CliRunner::new(verbose)?;
    runner.log_startup("upscale");

    if let Some(tier) = args.tier {
        runner.config_mut().account.plan = Some(tier.config_name().to_string());
    }

    let bytes = tokio::fs::read(&args.file)
        .await
        .map_err(|e| CliError::FileRead {
            path: args.file.display().to_string(),
            error: e,
        })?;
    let file_name = args
        .file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "upload".to_string());

    let events = Arc::new(BroadcastEventSink::new(256));
    let mut rx = events.subscribe();
    let service = runner.create_service(offline, events).await?;

    let upload = service
        .select_upload(file_name, Bytes::from(bytes))
        .await
        .map_err(CliError::Upscale)?;

    println!("Upscaling {}:", upload.file_name);
    if let Some((width, height)) = upload.dimensions {
        println!(
            "  Source: {}x{} {} ({})",
            width,
            height,
            upload.format,
            format_size(upload.size_bytes())
        );
    }
    println!("  Scale: x{}, {:?} preset", args.scale, args.preset);
    println!("  Plan: {}", service.tier());
    println!();

    let handle = service
        .submit(args.scale, args.preset.into(), args.format.map(Into::into))
        .map_err(CliError::Upscale)?;

    follow_job(&mut rx, &service, handle).await
}

/// Renders progress from the event stream until the job settles.
async fn follow_job(
    rx: &mut broadcast::Receiver<CoreEvent>,
    service: &UpscaleService,
    mut handle: JobHandle,
) -> Result<(), CliError> {
    loop {
        match rx.recv().await {
            Ok(event) if event.job_id() == Some(handle.id()) => match event {
                CoreEvent::JobStarted { eta_seconds, .. } => {
                    println!("Processing (about {}s)...", eta_seconds);
                }
                CoreEvent::JobProgress {
                    progress,
                    eta_seconds,
                    phase,
                    ..
                } => {
                    print!(
                        "\r  {:<10} {:>3}% (about {}s left)      ",
                        phase.to_string(),
                        progress,
                        eta_seconds
                    );
                    let _ = std::io::stdout().flush();
                }
                CoreEvent::JobCompleted { result_url, .. } => {
                    println!();
                    println!("✓ Upscale complete: {}", result_url);
                    if let Some((width, height)) =
                        service.job(handle.id()).and_then(|job| job.result_dimensions())
                    {
                        println!("  Result: {}x{}", width, height);
                    }
                    return Ok(());
                }
                CoreEvent::JobFailed { error, .. } => {
                    println!();
                    return Err(CliError::JobFailed(error));
                }
                CoreEvent::JobCancelled { .. } => {
                    println!();
                    return Err(CliError::JobFailed("cancelled".to_string()));
                }
                _ => {}
            },
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => {
                // Event stream gone; fall back to the handle.
                let status = handle.wait().await;
                if status.is_success() {
                    return Ok(());
                }
                let reason = service
                    .job(handle.id())
                    .and_then(|job| job.error().map(String::from))
                    .unwrap_or_else(|| "job ended without a result".to_string());
                return Err(CliError::JobFailed(reason));
            }
        }
    }
}
