use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use job_digest::aggregate::Aggregator;
use job_digest::config::Config;
use job_digest::notify::{build_notifier, NotifierSettings};
use job_digest::pipeline::Pipeline;
use job_digest::scrapers::{build_adapters, HttpFetch, ReqwestFetcher};

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let root = PathBuf::from(std::env::var("ROOT").unwrap_or_else(|_| ".".to_string()));
    let config = Config::load(&root).context("Failed to load configuration")?;
    let notifier_settings =
        NotifierSettings::from_env().context("Failed to load notifier settings")?;

    let http: Arc<dyn HttpFetch> =
        Arc::new(ReqwestFetcher::new(&config.http).context("Failed to build HTTP client")?);
    let adapters = build_adapters(&config.sources, &config.profile.target_location, http);
    if adapters.is_empty() {
        tracing::warn!("no enabled sources, digest will be empty");
    }

    let webhook_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http.request_timeout_secs))
        .build()
        .context("Failed to build webhook client")?;
    let notifier = build_notifier(&notifier_settings, webhook_client)
        .context("Failed to set up notifier")?;
    if notifier.is_empty() {
        tracing::warn!("no notification channel configured");
    }

    let pipeline = Pipeline::new(
        config.profile.clone(),
        adapters,
        Aggregator::new(&config.aggregator),
        Box::new(notifier),
    );

    let summary = pipeline.run().await?;
    for source in summary.sources.iter().filter(|s| !s.status.is_healthy()) {
        tracing::warn!(
            source = %source.source_name,
            status = %source.status,
            "source degraded this run"
        );
    }

    Ok(())
}
