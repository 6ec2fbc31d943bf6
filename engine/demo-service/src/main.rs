//! Live Demo Service
//!
//! Runs the live demo engine headless: metric updates are logged as they arrive, and panel
//! keys typed on stdin (`rtls`, `scheduling`, `mapping`, `analytics`) switch the active panel.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;
use tracing::{error, info};

use demo_service::{
    graceful_shutdown, initialize_logging, load_configuration, setup_signal_handlers,
    CommandOutcome, ConfigOverrides, DemoService, ServiceConfig,
};
use panel_selector::PanelKey;

#[derive(Parser, Debug)]
#[command(name = "live-demo", version, about = "Headless live demo engine")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for a reproducible metric sequence
    #[arg(long)]
    seed: Option<u64>,

    /// Tick interval in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Panel shown at startup
    #[arg(long)]
    panel: Option<PanelKey>,

    /// Log level or filter directive
    #[arg(long)]
    log_level: Option<String>,

    /// Log format (pretty, json, compact)
    #[arg(long)]
    log_format: Option<String>,

    /// Do not read panel commands from stdin
    #[arg(long)]
    no_stdin: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            seed: self.seed,
            interval_ms: self.interval_ms,
            panel: self.panel,
            log_level: self.log_level.clone(),
            log_format: self.log_format.clone(),
            no_stdin: self.no_stdin,
        }
    }
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config = load_configuration(cli.config.as_deref(), &cli.overrides())?;

    if cli.print_config {
        print!("{}", toml::to_string_pretty(&config).context("Failed to render configuration")?);
        return Ok(());
    }

    // Held until exit so file logs get flushed
    let _log_guard = initialize_logging(&config.logging)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("live-demo")
        .build()
        .context("Failed to build tokio runtime")?;

    let result = runtime.block_on(run(config));

    // Stdin reads sit on a blocking thread that would otherwise keep the runtime alive
    runtime.shutdown_timeout(Duration::from_secs(1));
    result
}

async fn run(config: ServiceConfig) -> Result<()> {
    info!("Starting Live Demo Service v{}", env!("CARGO_PKG_VERSION"));

    if config.metrics.enabled {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(config.metrics.listen_addr)
            .install()
            .context("Failed to install Prometheus exporter")?;
        info!("Prometheus metrics served on {}", config.metrics.listen_addr);
    }

    let service = Arc::new(DemoService::new(config)?);
    info!("Service state initialized");

    let shutdown_signal = setup_signal_handlers()?;
    info!("Signal handlers configured");

    let logger_handle = tokio::spawn(service.clone().run_snapshot_logger());

    let (quit_tx, quit_rx) = tokio::sync::oneshot::channel();
    let command_handle = if service.config.service.read_commands {
        let state = service.clone();
        Some(tokio::spawn(async move {
            match state.run_commands(BufReader::new(tokio::io::stdin())).await {
                Ok(CommandOutcome::Shutdown) => {}
                Ok(outcome) => {
                    info!(?outcome, "Command input finished");
                    let _ = quit_tx.send(());
                }
                Err(e) => {
                    error!("Command reader failed: {}", e);
                    let _ = quit_tx.send(());
                }
            }
        }))
    } else {
        drop(quit_tx);
        None
    };

    service.start()?;
    let panel = service.current_panel().await;
    info!(
        panel = %panel,
        "Live demo running. Type a panel key (rtls, scheduling, mapping, analytics), 'status' or 'quit'."
    );

    tokio::select! {
        _ = shutdown_signal => info!("Shutdown signal received"),
        Ok(()) = quit_rx => info!("Quit requested"),
    }

    graceful_shutdown(service, logger_handle, command_handle).await?;

    info!("Live Demo Service shutdown complete");
    Ok(())
}
