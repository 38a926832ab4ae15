use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use ratiocheck_core::cache::ReadingCache;
use ratiocheck_core::orchestrator::Orchestrator;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "ratiocheck", about = "Cross-check financial ratios for one or more tickers")]
struct Args {
    /// Ticker symbols, e.g. PLTR NVDA.
    #[arg(required = true)]
    tickers: Vec<String>,

    /// Answer from the built-in fixture data instead of the network.
    #[arg(long)]
    fixtures: bool,

    /// JSON metric catalog replacing the built-in one.
    #[arg(long)]
    metrics: Option<PathBuf>,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut settings = ratiocheck_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();
    settings.use_fixtures |= args.fixtures;
    if args.metrics.is_some() {
        settings.metrics_config = args.metrics;
    }

    let cache = Arc::new(ReadingCache::new(settings.cache_ttl));
    let orchestrator = Orchestrator::from_settings(&settings, cache)?;

    let runs = args.tickers.iter().map(|t| orchestrator.analyze(t));
    let results = futures::future::join_all(runs).await;

    let mut rejected = 0usize;
    for (ticker, result) in args.tickers.iter().zip(results) {
        match result {
            Ok(analysis) => {
                let json = if args.pretty {
                    serde_json::to_string_pretty(&analysis)?
                } else {
                    serde_json::to_string(&analysis)?
                };
                println!("{json}");
            }
            Err(err) => {
                if !err.is_client_error() {
                    sentry_anyhow::capture_anyhow(&anyhow::Error::new(err.clone()));
                }
                tracing::error!(%ticker, error = %err, "analysis failed");
                rejected += 1;
            }
        }
    }

    anyhow::ensure!(rejected == 0, "{rejected} of {} tickers failed", args.tickers.len());
    Ok(())
}

fn init_sentry(settings: &ratiocheck_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
