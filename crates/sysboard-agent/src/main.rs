use anyhow::Result;
use chrono::Utc;
use sysboard_agent::config::{AgentConfig, DEFAULT_CONFIG_PATH};
use sysboard_agent::refresher::Refresher;
use sysboard_collector::sampler;
use sysboard_collector::system::SystemProvider;
use sysboard_collector::MetricsProvider;
use sysboard_notify::plugin::SinkRegistry;
use tokio::signal;
use tokio::sync::watch;
use tokio::time::{sleep, Duration};
use tracing_subscriber::EnvFilter;

#[allow(clippy::print_stderr)]
fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  sysboard-agent [config.toml]         Keep the dashboard message up to date");
    eprintln!("  sysboard-agent once [config.toml]    Print one report to stdout and exit");
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("sysboard=info".parse()?))
        .init();

    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("-h") | Some("--help") => {
            print_usage();
            Ok(())
        }
        Some("once") => {
            let config_path = args.get(2).map(|s| s.as_str()).unwrap_or(DEFAULT_CONFIG_PATH);
            let config = AgentConfig::load(config_path)?;
            print_once(&config).await
        }
        other => {
            let config_path = other.unwrap_or(DEFAULT_CONFIG_PATH);
            let config = AgentConfig::load(config_path)?;
            run_agent(config).await
        }
    }
}

async fn run_agent(config: AgentConfig) -> Result<()> {
    let registry = SinkRegistry::default();
    let redacted = registry.redact_config(&config.sink.sink_type, &config.sink.config)?;
    tracing::info!(
        sink = %config.sink.sink_type,
        sink_config = %redacted,
        interval_ms = config.refresh_interval_ms,
        "sysboard-agent starting"
    );

    let sink = registry.create_sink(&config.sink.sink_type, &config.sink.config)?;
    let provider = SystemProvider::new();

    let mut refresher = Refresher::new(
        Box::new(provider),
        sink,
        config.report.clone(),
        config.refresh_interval(),
    )
    .with_shutdown_grace(config.shutdown_grace());

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Shutting down gracefully");
                let _ = stop_tx.send(true);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Cannot listen for Ctrl-C, running until killed");
                // Keep the sender alive; dropping it would stop the loop.
                std::future::pending::<()>().await;
            }
        }
    });

    refresher.run(stop_rx).await?;
    Ok(())
}

/// Samples twice one second apart so the network rate is meaningful.
#[allow(clippy::print_stdout)]
async fn print_once(config: &AgentConfig) -> Result<()> {
    let mut provider = SystemProvider::new();
    let first = provider.read_sample()?;
    let (_, counters) = sampler::sample(first, None, Utc::now());

    sleep(Duration::from_secs(1)).await;

    let second = provider.read_sample()?;
    let (snapshot, _) = sampler::sample(second, Some(counters), Utc::now());
    let report = config.report.render(&snapshot)?;
    print!("{}", report.to_plain_text());
    Ok(())
}
