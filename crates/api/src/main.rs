use std::sync::Arc;

use ratiocheck_core::cache::ReadingCache;
use ratiocheck_core::orchestrator::Orchestrator;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = ratiocheck_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let cache = Arc::new(ReadingCache::new(settings.cache_ttl));
    let orchestrator = match Orchestrator::from_settings(&settings, cache) {
        Ok(o) => o,
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "invalid metric or provider configuration");
            return Err(e);
        }
    };
    tracing::info!(
        metrics = orchestrator.metrics().count(),
        fixtures = settings.use_fixtures,
        "orchestrator ready"
    );

    let app = routes::router(routes::AppState {
        orchestrator: Arc::new(orchestrator),
        analyze_timeout: settings.analyze_timeout,
    });

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], settings.port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
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
