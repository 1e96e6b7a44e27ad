use alert_importer::{
    Args,
    alerts::AlertsApi,
    config::Config,
    exchanges::ExchangeTable,
    host::ConfigHost,
    importer::Importer,
    markets::MarketCatalog,
    metrics,
};
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Setup tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Register metrics
    metrics::register_metrics()?;

    // Parse config
    let args = Args::parse();
    let config = Config::from_file(&args.config)?;

    // Load the market catalog
    let markets = MarketCatalog::load(&config.markets).await?;
    tracing::info!("Loaded {} markets", markets.len());

    let api = AlertsApi::new(config.alerts.url.clone())?;
    let exchanges = ExchangeTable::from(config.exchanges.clone());
    let importer = Importer::new(ConfigHost::new(config, markets), exchanges, api);

    let failed = if args.dry_run {
        importer.dry_run(&args.files, &mut std::io::stdout().lock())
    } else {
        importer
            .open(&args.files)
            .await
            .iter()
            .filter(|result| result.is_err())
            .count()
    };

    if let Some(path) = &args.metrics_file {
        metrics::write_to_file(path)?;
    }

    if failed > 0 {
        tracing::error!("{} of {} files failed to import", failed, args.files.len());
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}
