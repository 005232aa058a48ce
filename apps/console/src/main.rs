use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{ControllerEvent, HttpPredictionApi, RequestController};
use shared::domain::Flow;
use tokio::{
    io::AsyncReadExt,
    sync::broadcast::{self, error::RecvError},
    task::JoinHandle,
};
use tracing_subscriber::EnvFilter;

mod config;
mod terminal;

use config::load_settings;
use terminal::TerminalViewHost;

#[derive(Parser, Debug)]
#[command(name = "predict-console", about = "Submit inputs to a prediction service")]
struct Cli {
    #[arg(long, default_value = "console.toml")]
    config: PathBuf,
    /// Origin of the prediction service, e.g. http://127.0.0.1:5000
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    log_level: Option<String>,
    #[arg(long)]
    timeout_secs: Option<u64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show model metadata.
    Info,
    /// Single prediction from JSON or whitespace-separated numbers (stdin if omitted).
    Predict { input: Option<String> },
    /// Batch prediction from a JSON array of inputs (stdin if omitted).
    Batch { input: Option<String> },
    /// Print the server's example inputs.
    Example,
    /// Check service health.
    Health,
    /// Load the example and run both prediction flows with it.
    Demo,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let mut settings = load_settings(&cli.config)?;
    if let Some(v) = cli.server_url {
        settings.server_url = v;
    }
    if let Some(v) = cli.log_level {
        settings.log_level = v;
    }
    if let Some(v) = cli.timeout_secs {
        settings.request_timeout_secs = Some(v);
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_level))
        .context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let api = HttpPredictionApi::with_timeout(&settings.server_url, settings.request_timeout())?;
    tracing::debug!(api_base = api.api_base(), "prediction client ready");
    let host = Arc::new(TerminalViewHost::new());
    let controller = RequestController::new(Arc::new(api), host.clone());
    let notifications = print_notifications(controller.subscribe_events());

    let failed = match cli.command {
        Command::Health => match controller.check_health().await {
            Ok(health) => {
                println!(
                    "status: {}\nmodel_loaded: {}\nservice: {}",
                    health.status, health.model_loaded, health.service
                );
                health.status != "healthy" || !health.model_loaded
            }
            Err(err) => {
                eprintln!("Error: {err}");
                true
            }
        },
        command => {
            controller.start().await;
            run_command(&controller, &host, command).await?
        }
    };

    drop(controller);
    notifications.await.context("notification printer")?;

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Returns whether any touched result region ended in an error view.
async fn run_command(
    controller: &RequestController,
    host: &TerminalViewHost,
    command: Command,
) -> Result<bool> {
    match command {
        Command::Info => Ok(!host.has_model_info()),
        Command::Health => Ok(false),
        Command::Predict { input } => {
            let raw = input_or_stdin(input).await?;
            controller.submit_single_prediction(&raw).await;
            Ok(host.result_failed(Flow::Single))
        }
        Command::Batch { input } => {
            let raw = input_or_stdin(input).await?;
            controller.submit_batch_prediction(&raw).await;
            Ok(host.result_failed(Flow::Batch))
        }
        Command::Example => {
            controller.load_example().await;
            Ok(host.input_text(Flow::Single).is_none())
        }
        Command::Demo => {
            controller.load_example().await;
            let (Some(single), Some(batch)) =
                (host.input_text(Flow::Single), host.input_text(Flow::Batch))
            else {
                return Ok(true);
            };
            tokio::join!(
                controller.submit_single_prediction(&single),
                controller.submit_batch_prediction(&batch)
            );
            Ok(host.result_failed(Flow::Single) || host.result_failed(Flow::Batch))
        }
    }
}

async fn input_or_stdin(input: Option<String>) -> Result<String> {
    if let Some(input) = input {
        return Ok(input);
    }
    let mut raw = String::new();
    tokio::io::stdin()
        .read_to_string(&mut raw)
        .await
        .context("failed to read input from stdin")?;
    Ok(raw)
}

fn print_notifications(mut rx: broadcast::Receiver<ControllerEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(ControllerEvent::Notification(message)) => eprintln!("Error: {message}"),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "notification printer lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}
