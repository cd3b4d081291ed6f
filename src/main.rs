use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use vigil::{
    alerts::{InMemoryAlertRepository, LogAlertChangeCleaner},
    auth::StaticTokenProvider,
    checks::{CheckRepository, HttpCheckSource},
    cleanup::CheckChangeCleaner,
    config::AppConfig,
    http_client::{build_base_client, create_retryable_http_client},
    scheduler::Scheduler,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding app.yaml.
    #[arg(long)]
    config_dir: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let cli = Cli::parse();
    let config = AppConfig::new(cli.config_dir.as_deref())?;
    tracing::info!(
        checks_url = %config.checks_url,
        refresh_interval_ms = config.refresh_interval_ms.as_millis() as u64,
        "configuration loaded"
    );

    let base_client = build_base_client(&config.http_base_config)?;
    let client = create_retryable_http_client(&config.http_retry_config, base_client);
    let tokens = Arc::new(StaticTokenProvider::new(config.access_token.clone()));
    let source = Arc::new(HttpCheckSource::new(config.checks_url.clone(), tokens, client));

    let alerts = Arc::new(InMemoryAlertRepository::new());
    let cleaner = Arc::new(LogAlertChangeCleaner);
    let mut repository = CheckRepository::new();
    repository.register_listener(Arc::new(CheckChangeCleaner::new(alerts, cleaner)));
    let repository = Arc::new(repository);

    let scheduler = Scheduler::new(source, repository, config.refresh_interval_ms);

    let cancellation_token = CancellationToken::new();
    let shutdown_token = cancellation_token.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for shutdown signal");
        }
        shutdown_token.cancel();
    });

    scheduler.run(cancellation_token).await?;
    Ok(())
}
