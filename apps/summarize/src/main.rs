use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    ControllerEvent, DirectorySink, HttpSummarizer, SelectedFile, SummarizerTransport,
    UploadController,
};
use tokio::{
    sync::broadcast::{self, error::RecvError},
    task::JoinHandle,
};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod config;

/// Upload a PDF to the summarizer service and save the generated summary.
#[derive(Parser, Debug)]
#[command(name = "summarize", version)]
struct Args {
    /// PDF file to summarize.
    file: Option<PathBuf>,
    /// Summarizer base URL; overrides the config file and environment.
    #[arg(long)]
    base_url: Option<String>,
    /// Directory the summary is saved into.
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Config file to read instead of ./summarize.toml.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Abort the upload after this many seconds; 0 waits indefinitely.
    #[arg(long)]
    timeout_seconds: Option<u64>,
    /// Query the summarizer's health endpoint before uploading.
    #[arg(long)]
    check: bool,
    /// Keep the summary in memory only; skip saving it.
    #[arg(long)]
    no_download: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let settings = config::load_settings(args.config.as_deref())?.with_overrides(
        args.base_url.clone(),
        args.output_dir.clone(),
        args.timeout_seconds,
    );
    info!(
        base_url = %settings.base_url,
        output_dir = %settings.output_dir.display(),
        timeout_seconds = ?settings.request_timeout_seconds,
        "loaded settings"
    );

    let summarizer = Arc::new(
        HttpSummarizer::with_timeout(&settings.base_url, settings.request_timeout())
            .context("failed to build summarizer client")?,
    );

    if args.check {
        let health = summarizer
            .health()
            .await
            .with_context(|| format!("summarizer at {} is not healthy", summarizer.base_url()))?;
        println!("{} -> {}", summarizer.base_url(), health.message);
        if args.file.is_none() {
            return Ok(ExitCode::SUCCESS);
        }
    }

    let file = match &args.file {
        Some(path) => Some(
            SelectedFile::from_path(path)
                .await
                .with_context(|| format!("failed to read '{}'", path.display()))?,
        ),
        None => None,
    };

    let controller = UploadController::new(
        summarizer,
        Arc::new(DirectorySink::new(&settings.output_dir)),
    );
    let printer = spawn_status_printer(controller.subscribe_events());

    let succeeded = run(&controller, file, !args.no_download).await;

    // Dropping the controller closes the event channel and lets the printer finish.
    drop(controller);
    join_status_printer(printer).await;

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn run(controller: &UploadController, file: Option<SelectedFile>, download: bool) -> bool {
    if controller.submit(file).await.is_err() {
        return false;
    }
    if !download {
        return true;
    }
    controller.download().await.is_ok()
}

async fn join_status_printer(printer: JoinHandle<()>) -> bool {
    match printer.await {
        Ok(()) => true,
        Err(err) => {
            warn!(%err, "status printer task failed");
            false
        }
    }
}

fn spawn_status_printer(mut events: broadcast::Receiver<ControllerEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(ControllerEvent::StatusChanged(status)) => println!("{status}"),
                Ok(ControllerEvent::ArtifactSaved(path)) => {
                    println!("saved {}", path.display())
                }
                Ok(ControllerEvent::SubmitControlChanged { enabled, label }) => {
                    debug!(enabled, label, "submit control changed")
                }
                Ok(ControllerEvent::DownloadAvailabilityChanged(available)) => {
                    debug!(available, "download availability changed")
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "status printer fell behind"),
                Err(RecvError::Closed) => break,
            }
        }
    })
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
