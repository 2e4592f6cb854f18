//! autohook - vehicle event webhook receiver
//!
//! Receives telemetry event webhooks over HTTP and fans each one out to the
//! configured voice, SMS and light alerts.

use anyhow::{Context, Result};
use autohook::{app::App, cli::Cli, config::Config, server::WebhookServer};
use clap::Parser;
use std::sync::Arc;
use tokio::{net::TcpListener, sync::watch};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration by layering sources: defaults, file, environment, and CLI args.
    let config = Config::load(&cli).unwrap_or_else(|err| {
        // Initialize a default subscriber just to report this error
        tracing_subscriber::fmt().init();
        error!("Failed to load configuration: {:#}", err);
        std::process::exit(1);
    });

    // Initialize logging; RUST_LOG takes precedence over the configured level.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("autohook starting up...");

    // Log the loaded configuration settings for visibility
    info!("-------------------- Configuration --------------------");
    info!("Log Level: {}", config.log_level);
    info!("Listen Address: {}", config.server.listen_addr);
    info!("Webhook Path: {}", config.server.webhook_path);
    if config.event_log.enabled {
        info!("Event Log: {}", config.event_log.path.display());
    } else {
        info!("Event Log: Disabled");
    }
    if config.voice.enabled {
        info!("Voice Alerts: Enabled ({})", config.voice.command);
    } else {
        info!("Voice Alerts: Disabled");
    }
    if config.sms.enabled {
        info!(
            "SMS Alerts: Enabled ({} recipients)",
            config.sms.recipients.len()
        );
    } else {
        info!("SMS Alerts: Disabled");
    }
    if config.lights.enabled {
        info!("Light Alerts: Enabled (groups: {})", config.lights.groups.join(", "));
    } else {
        info!("Light Alerts: Disabled");
    }
    match config.dispatch.timeout_seconds {
        Some(secs) => info!("Dispatch Timeout: {}s", secs),
        None => info!("Dispatch Timeout: None"),
    }
    info!("-------------------------------------------------------");

    let listen_addr = config.server.listen_addr.clone();
    let app = Arc::new(App::builder(config).build()?);

    let listener = TcpListener::bind(&listen_addr)
        .await
        .with_context(|| format!("failed to bind {listen_addr}"))?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let server = tokio::spawn(WebhookServer::new(listener, app, shutdown_rx).run());

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Shutting down gracefully...");
    shutdown_tx.send(true).ok();

    if let Err(e) = server.await {
        error!("Webhook server task panicked: {}", e);
    }
    info!("autohook shut down.");
    Ok(())
}
