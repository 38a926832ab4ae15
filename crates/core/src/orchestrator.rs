use crate::cache::{CacheKey, ReadingCache};
use crate::catalog;
use crate::config::Settings;
use crate::domain::{AnalysisResult, FetchOutcome, MetricDefinition, MetricResult, SourceReading, Ticker};
use crate::error::AnalyzeError;
use crate::provider::{ProviderRegistry, ValueProvider};
use crate::retry::{CallResult, RetryPolicy};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::Instrument;

#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    /// Hard bound on one reading, retries and backoff included.
    pub provider_timeout: Duration,
    pub max_concurrent_fetches: usize,
}

impl FetchOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            provider_timeout: settings.provider_timeout,
            max_concurrent_fetches: settings.max_concurrent_fetches,
        }
    }
}

/// State shared by every in-flight fetch task.
struct Shared {
    cache: Arc<ReadingCache>,
    policy: Arc<RetryPolicy>,
    permits: Semaphore,
    provider_timeout: Duration,
}

/// Runs one analysis pass per ticker: every (metric, provider) pair is read concurrently
/// through the cache and the retry policy, then each metric is reduced to a result.
pub struct Orchestrator {
    metrics: Vec<Arc<MetricDefinition>>,
    providers: Vec<Vec<Arc<dyn ValueProvider>>>,
    shared: Arc<Shared>,
}

impl Orchestrator {
    /// Resolves every configured provider id up front so a bad catalog fails at startup.
    pub fn new(
        metrics: Vec<MetricDefinition>,
        registry: &ProviderRegistry,
        cache: Arc<ReadingCache>,
        policy: Arc<RetryPolicy>,
        options: FetchOptions,
    ) -> anyhow::Result<Self> {
        let mut providers = Vec::with_capacity(metrics.len());
        for metric in &metrics {
            let resolved = metric
                .providers
                .iter()
                .map(|id| registry.resolve(id))
                .collect::<anyhow::Result<Vec<_>>>()
                .map_err(|e| e.context(format!("metric {:?}", metric.name)))?;
            providers.push(resolved);
        }

        Ok(Self {
            metrics: metrics.into_iter().map(Arc::new).collect(),
            providers,
            shared: Arc::new(Shared {
                cache,
                policy,
                permits: Semaphore::new(options.max_concurrent_fetches.max(1)),
                provider_timeout: options.provider_timeout,
            }),
        })
    }

    /// Wires the catalog, the provider registry and the retry policy from settings
    /// around an externally owned cache.
    pub fn from_settings(settings: &Settings, cache: Arc<ReadingCache>) -> anyhow::Result<Self> {
        let metrics = catalog::from_settings(settings)?;
        let registry = ProviderRegistry::from_settings(settings)?;
        let policy = Arc::new(RetryPolicy::from_settings(settings));
        Self::new(
            metrics,
            &registry,
            cache,
            policy,
            FetchOptions::from_settings(settings),
        )
    }

    pub fn metrics(&self) -> impl Iterator<Item = &MetricDefinition> {
        self.metrics.iter().map(|m| m.as_ref())
    }

    pub fn cache(&self) -> &ReadingCache {
        &self.shared.cache
    }

    /// Validates the raw symbol before any fetch is attempted.
    pub async fn analyze(&self, raw_ticker: &str) -> Result<AnalysisResult, AnalyzeError> {
        let ticker = Ticker::parse(raw_ticker)?;
        self.analyze_ticker(ticker).await
    }

    /// Provider failures never fail the pass; only a fault in the pass itself does.
    /// Dropping the returned future aborts every outstanding fetch.
    pub async fn analyze_ticker(&self, ticker: Ticker) -> Result<AnalysisResult, AnalyzeError> {
        let started = tokio::time::Instant::now();
        let mut tasks = JoinSet::new();

        for (mi, (metric, providers)) in self.metrics.iter().zip(&self.providers).enumerate() {
            for (pi, provider) in providers.iter().enumerate() {
                // Warn level: retry and deadline warnings carry this context under any
                // filter that shows them.
                let span = tracing::warn_span!(
                    "reading",
                    provider = provider.id(),
                    metric = %metric.name,
                    %ticker
                );
                let read = read_one(
                    Arc::clone(&self.shared),
                    Arc::clone(provider),
                    ticker.clone(),
                    metric.name.clone(),
                );
                tasks.spawn(async move { (mi, pi, read.await) }.instrument(span));
            }
        }

        let mut slots: Vec<Vec<Option<SourceReading>>> =
            self.providers.iter().map(|p| vec![None; p.len()]).collect();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((mi, pi, reading)) => slots[mi][pi] = Some(reading),
                Err(err) if err.is_panic() => {
                    tracing::error!(%ticker, error = %err, "provider task panicked; reading treated as absent");
                }
                Err(err) => {
                    return Err(AnalyzeError::Internal(format!(
                        "provider task for {ticker} did not complete: {err}"
                    )));
                }
            }
        }

        let mut ratios = Vec::with_capacity(self.metrics.len());
        for ((metric, providers), slots) in self.metrics.iter().zip(&self.providers).zip(slots) {
            let readings = providers
                .iter()
                .zip(slots)
                .map(|(provider, slot)| {
                    slot.unwrap_or_else(|| {
                        SourceReading::new(provider.id(), provider.source(), None, FetchOutcome::Failed)
                    })
                })
                .collect();

            let result = MetricResult::from_readings(Arc::clone(metric), readings)
                .map_err(|e| AnalyzeError::Internal(format!("{e:#}")))?;
            ratios.push(result);
        }

        let analysis = AnalysisResult::new(ticker, ratios);
        tracing::info!(
            ticker = %analysis.ticker(),
            overall_score = analysis.overall_score(),
            max_score = analysis.max_score(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "analysis complete"
        );
        Ok(analysis)
    }
}

/// Cache first; on a miss, take a fetch permit and go through the retry policy, all
/// under the per-reading deadline, and cache a fresh value. Never fails: problems become an absent reading.
async fn read_one(
    shared: Arc<Shared>,
    provider: Arc<dyn ValueProvider>,
    ticker: Ticker,
    metric: String,
) -> SourceReading {
    let reading = |value: Option<f64>, outcome: FetchOutcome| {
        SourceReading::new(provider.id(), provider.source(), value, outcome)
    };

    let key = CacheKey::new(provider.id(), ticker.as_str(), &metric);
    if let Some(value) = shared.cache.get(&key) {
        tracing::debug!("cache hit");
        return reading(Some(value), FetchOutcome::Cached);
    }

    // The deadline covers the wait for a permit as well as the fetch itself.
    let call = async {
        let Ok(_permit) = shared.permits.acquire().await else {
            return CallResult::Exhausted;
        };
        shared
            .policy
            .run(provider.source(), || provider.fetch(&ticker))
            .await
    };

    match tokio::time::timeout(shared.provider_timeout, call).await {
        Ok(CallResult::Value(value)) => {
            shared.cache.set(key, value);
            reading(Some(value), FetchOutcome::Fetched)
        }
        Ok(CallResult::Missing) => {
            tracing::debug!("source has no value");
            reading(None, FetchOutcome::Missing)
        }
        Ok(CallResult::Exhausted) => reading(None, FetchOutcome::Failed),
        Err(_) => {
            tracing::warn!(timeout = ?shared.provider_timeout, "reading deadline exceeded");
            reading(None, FetchOutcome::TimedOut)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::threshold::MetricStatus;
    use anyhow::Result;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    enum Behavior {
        Value(f64),
        Missing,
        Fail,
        Hang,
        Panic,
        /// Sleeps before answering so completion order differs from config order.
        Delayed(u64, f64),
    }

    struct TestProvider {
        id: &'static str,
        source: &'static str,
        behavior: Behavior,
        calls: Arc<AtomicU32>,
    }

    impl TestProvider {
        fn new(id: &'static str, behavior: Behavior) -> Self {
            Self {
                id,
                source: id,
                behavior,
                calls: Arc::new(AtomicU32::new(0)),
            }
        }
    }

    #[async_trait::async_trait]
    impl ValueProvider for TestProvider {
        fn id(&self) -> &str {
            self.id
        }

        fn source(&self) -> &'static str {
            self.source
        }

        async fn fetch(&self, _ticker: &Ticker) -> Result<Option<f64>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                Behavior::Value(v) => Ok(Some(v)),
                Behavior::Missing => Ok(None),
                Behavior::Fail => anyhow::bail!("connection refused"),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(Some(0.0))
                }
                Behavior::Panic => panic!("scraper bug"),
                Behavior::Delayed(ms, v) => {
                    tokio::time::sleep(Duration::from_millis(ms)).await;
                    Ok(Some(v))
                }
            }
        }
    }

    fn metric(name: &str, providers: &[&str], target: &str, informational: bool) -> MetricDefinition {
        MetricDefinition::new(
            name,
            providers.iter().map(|p| p.to_string()).collect(),
            target,
            informational,
        )
        .unwrap()
    }

    fn policy() -> Arc<RetryPolicy> {
        Arc::new(RetryPolicy::new(
            Duration::ZERO,
            1,
            Duration::from_millis(100),
            Duration::from_secs(5),
        ))
    }

    fn options() -> FetchOptions {
        FetchOptions {
            provider_timeout: Duration::from_secs(20),
            max_concurrent_fetches: 4,
        }
    }

    fn orchestrator(
        metrics: Vec<MetricDefinition>,
        providers: Vec<TestProvider>,
        cache: Arc<ReadingCache>,
    ) -> Orchestrator {
        orchestrator_with(metrics, providers, cache, policy())
    }

    fn orchestrator_with(
        metrics: Vec<MetricDefinition>,
        providers: Vec<TestProvider>,
        cache: Arc<ReadingCache>,
        policy: Arc<RetryPolicy>,
    ) -> Orchestrator {
        let mut registry = ProviderRegistry::new();
        for p in providers {
            registry.register(p).unwrap();
        }
        Orchestrator::new(metrics, &registry, cache, policy, options()).unwrap()
    }

    fn values(result: &MetricResult) -> Vec<Option<f64>> {
        result.readings().iter().map(|r| r.value).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn aggregates_each_metric_and_scores() {
        let orch = orchestrator(
            vec![
                metric("Gross Margin", &["a", "b", "c"], ">60%", false),
                metric("X", &["d", "e"], ">60%", false),
                metric("Y", &["f", "g"], ">60%", false),
                metric("P/E Ratio", &["h", "i"], "Info Only", true),
            ],
            vec![
                TestProvider::new("a", Behavior::Value(80.81)),
                TestProvider::new("b", Behavior::Fail),
                TestProvider::new("c", Behavior::Missing),
                TestProvider::new("d", Behavior::Value(50.0)),
                TestProvider::new("e", Behavior::Value(70.0)),
                TestProvider::new("f", Behavior::Value(50.0)),
                TestProvider::new("g", Behavior::Value(55.0)),
                TestProvider::new("h", Behavior::Value(406.95)),
                TestProvider::new("i", Behavior::Value(410.0)),
            ],
            Arc::new(ReadingCache::default()),
        );

        let result = orch.analyze(" pltr ").await.unwrap();
        assert_eq!(result.ticker().as_str(), "PLTR");

        let [gm, x, y, pe] = result.ratios() else {
            panic!("expected four metrics");
        };
        assert_eq!(values(gm), vec![Some(80.81), None, None]);
        assert_eq!((gm.consensus(), gm.spread(), gm.status()), (Some(80.81), None, MetricStatus::Pass));
        assert_eq!(gm.readings()[1].outcome, FetchOutcome::Failed);
        assert_eq!(gm.readings()[2].outcome, FetchOutcome::Missing);

        assert_eq!((x.consensus(), x.spread(), x.status()), (Some(60.0), Some(20.0), MetricStatus::Pass));
        assert_eq!((y.consensus(), y.status()), (Some(52.5), MetricStatus::Fail));
        assert_eq!(pe.status(), MetricStatus::InfoOnly);

        assert_eq!(result.overall_score(), 2);
        assert_eq!(result.max_score(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn all_sources_down_still_yields_complete_result() {
        let orch = orchestrator(
            vec![
                metric("ROIC", &["a", "b", "c"], ">10-12%", false),
                metric("P/E Ratio", &["a", "b", "c"], "Info Only", true),
            ],
            vec![
                TestProvider::new("a", Behavior::Fail),
                TestProvider::new("b", Behavior::Fail),
                TestProvider::new("c", Behavior::Missing),
            ],
            Arc::new(ReadingCache::default()),
        );

        let result = orch.analyze("NVDA").await.unwrap();
        let roic = &result.ratios()[0];
        assert_eq!(roic.readings().len(), 3);
        assert_eq!((roic.consensus(), roic.spread(), roic.status()), (None, None, MetricStatus::Fail));
        assert_eq!(result.ratios()[1].status(), MetricStatus::InfoOnly);
        assert_eq!((result.overall_score(), result.max_score()), (0, 1));
    }

    #[tokio::test(start_paused = true)]
    async fn preserves_configured_order_regardless_of_completion() {
        let orch = orchestrator(
            vec![metric("X", &["slow", "medium", "fast"], ">1", false)],
            vec![
                TestProvider::new("slow", Behavior::Delayed(900, 1.0)),
                TestProvider::new("medium", Behavior::Delayed(500, 2.0)),
                TestProvider::new("fast", Behavior::Delayed(10, 3.0)),
            ],
            Arc::new(ReadingCache::default()),
        );

        let result = orch.analyze("PLTR").await.unwrap();
        let readings = result.ratios()[0].readings();
        let ids: Vec<_> = readings.iter().map(|r| r.provider.as_str()).collect();
        assert_eq!(ids, vec!["slow", "medium", "fast"]);
        assert_eq!(values(&result.ratios()[0]), vec![Some(1.0), Some(2.0), Some(3.0)]);
    }

    #[tokio::test(start_paused = true)]
    async fn hung_provider_times_out_without_stalling_others() {
        // Attempt timeout longer than the reading deadline, so the deadline is what fires.
        let lenient = Arc::new(RetryPolicy::new(
            Duration::ZERO,
            0,
            Duration::from_millis(100),
            Duration::from_secs(600),
        ));
        let orch = orchestrator_with(
            vec![
                metric("A", &["stuck", "ok"], ">1", false),
                metric("B", &["ok2"], ">1", false),
            ],
            vec![
                TestProvider::new("stuck", Behavior::Hang),
                TestProvider::new("ok", Behavior::Value(5.0)),
                TestProvider::new("ok2", Behavior::Value(7.0)),
            ],
            Arc::new(ReadingCache::default()),
            lenient,
        );

        let started = tokio::time::Instant::now();
        let result = orch.analyze("PLTR").await.unwrap();
        assert!(started.elapsed() <= Duration::from_secs(21));

        let a = &result.ratios()[0];
        assert_eq!(a.readings()[0].outcome, FetchOutcome::TimedOut);
        assert_eq!(a.consensus(), Some(5.0));
        assert_eq!(result.ratios()[1].consensus(), Some(7.0));
    }

    #[tokio::test]
    async fn panicking_provider_is_isolated() {
        let orch = orchestrator(
            vec![metric("A", &["boom", "ok"], ">1", false)],
            vec![
                TestProvider::new("boom", Behavior::Panic),
                TestProvider::new("ok", Behavior::Value(4.0)),
            ],
            Arc::new(ReadingCache::default()),
        );

        let result = orch.analyze("PLTR").await.unwrap();
        let a = &result.ratios()[0];
        assert_eq!(a.readings().len(), 2);
        assert_eq!(a.readings()[0].value, None);
        assert_eq!(a.readings()[0].outcome, FetchOutcome::Failed);
        assert_eq!(a.consensus(), Some(4.0));
    }

    #[tokio::test(start_paused = true)]
    async fn second_pass_is_served_from_cache() {
        let provider = TestProvider::new("a", Behavior::Value(80.81));
        let calls = Arc::clone(&provider.calls);
        let cache = Arc::new(ReadingCache::default());
        let orch = orchestrator(
            vec![metric("Gross Margin", &["a"], ">60%", false)],
            vec![provider],
            Arc::clone(&cache),
        );

        let first = orch.analyze("PLTR").await.unwrap();
        let second = orch.analyze("pltr").await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.ratios()[0].readings()[0].outcome, FetchOutcome::Fetched);
        assert_eq!(second.ratios()[0].readings()[0].outcome, FetchOutcome::Cached);
        assert_eq!(second.ratios()[0].consensus(), Some(80.81));
        assert_eq!(cache.get(&CacheKey::new("a", "PLTR", "Gross Margin")), Some(80.81));
    }

    #[tokio::test(start_paused = true)]
    async fn absent_readings_are_not_cached() {
        let provider = TestProvider::new("a", Behavior::Missing);
        let calls = Arc::clone(&provider.calls);
        let cache = Arc::new(ReadingCache::default());
        let orch = orchestrator(
            vec![metric("ROIC", &["a"], ">10%", false)],
            vec![provider],
            Arc::clone(&cache),
        );

        orch.analyze("PLTR").await.unwrap();
        orch.analyze("PLTR").await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_cache_entry_triggers_fresh_fetch() {
        let provider = TestProvider::new("a", Behavior::Value(81.0));
        let calls = Arc::clone(&provider.calls);
        let cache = Arc::new(ReadingCache::new(Duration::from_secs(3600)));
        let orch = orchestrator(
            vec![metric("Gross Margin", &["a"], ">60%", false)],
            vec![provider],
            Arc::clone(&cache),
        );
        let key = CacheKey::new("a", "PLTR", "Gross Margin");

        cache.set_at(key.clone(), 80.81, chrono::Utc::now() - chrono::Duration::seconds(3599));
        let fresh = orch.analyze("PLTR").await.unwrap();
        assert_eq!(fresh.ratios()[0].consensus(), Some(80.81));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        cache.set_at(key.clone(), 80.81, chrono::Utc::now() - chrono::Duration::seconds(3601));
        let refreshed = orch.analyze("PLTR").await.unwrap();
        assert_eq!(refreshed.ratios()[0].consensus(), Some(81.0));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.get(&key), Some(81.0));
    }

    #[tokio::test(start_paused = true)]
    async fn permit_wait_counts_against_the_reading_deadline() {
        let mut registry = ProviderRegistry::new();
        registry.register(TestProvider::new("stuck", Behavior::Hang)).unwrap();
        registry
            .register(TestProvider::new("queued", Behavior::Delayed(500, 2.0)))
            .unwrap();
        let orch = Orchestrator::new(
            vec![metric("A", &["stuck", "queued"], ">1", false)],
            &registry,
            Arc::new(ReadingCache::default()),
            Arc::new(RetryPolicy::new(
                Duration::ZERO,
                0,
                Duration::from_millis(100),
                Duration::from_secs(600),
            )),
            FetchOptions {
                provider_timeout: Duration::from_secs(20),
                max_concurrent_fetches: 1,
            },
        )
        .unwrap();

        let started = tokio::time::Instant::now();
        let result = orch.analyze("PLTR").await.unwrap();

        // "queued" spent its whole budget waiting behind "stuck" for the only permit.
        assert!(started.elapsed() < Duration::from_millis(20_500));
        let outcomes: Vec<_> = result.ratios()[0].readings().iter().map(|r| r.outcome).collect();
        assert_eq!(outcomes, vec![FetchOutcome::TimedOut, FetchOutcome::TimedOut]);
    }

    struct SetOnDrop(Arc<AtomicBool>);

    impl Drop for SetOnDrop {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    struct Watched {
        dropped: Arc<AtomicBool>,
        finished: Arc<AtomicBool>,
    }

    #[async_trait::async_trait]
    impl ValueProvider for Watched {
        fn id(&self) -> &str {
            "watched"
        }

        fn source(&self) -> &'static str {
            "Watched"
        }

        async fn fetch(&self, _ticker: &Ticker) -> Result<Option<f64>> {
            let _guard = SetOnDrop(Arc::clone(&self.dropped));
            tokio::time::sleep(Duration::from_secs(3600)).await;
            self.finished.store(true, Ordering::SeqCst);
            Ok(Some(1.0))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_an_analysis_aborts_its_fetches() {
        let dropped = Arc::new(AtomicBool::new(false));
        let finished = Arc::new(AtomicBool::new(false));
        let mut registry = ProviderRegistry::new();
        registry
            .register(Watched {
                dropped: Arc::clone(&dropped),
                finished: Arc::clone(&finished),
            })
            .unwrap();
        let cache = Arc::new(ReadingCache::default());
        let orch = Orchestrator::new(
            vec![metric("A", &["watched"], ">1", false)],
            &registry,
            Arc::clone(&cache),
            policy(),
            options(),
        )
        .unwrap();

        let res = tokio::time::timeout(Duration::from_secs(1), orch.analyze("PLTR")).await;
        assert!(res.is_err());

        // Aborted tasks are torn down the next time the runtime gets control.
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(dropped.load(Ordering::SeqCst));
        assert!(!finished.load(Ordering::SeqCst));

        tokio::time::sleep(Duration::from_secs(7200)).await;
        assert!(!finished.load(Ordering::SeqCst));
        assert!(cache.is_empty());
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn warnings_name_the_ticker_metric_and_provider() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _default = tracing::subscriber::set_default(subscriber);

        let orch = orchestrator(
            vec![metric("Gross Margin", &["finviz.gross_margin"], ">60%", false)],
            vec![TestProvider::new("finviz.gross_margin", Behavior::Fail)],
            Arc::new(ReadingCache::default()),
        );
        orch.analyze("pltr").await.unwrap();

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        let line = output
            .lines()
            .find(|l| l.contains("provider fetch failed"))
            .unwrap_or_else(|| panic!("no retry warning in {output:?}"));
        assert!(line.contains("ticker=PLTR"), "{line}");
        assert!(line.contains("metric=Gross Margin"), "{line}");
        assert!(line.contains("finviz.gross_margin"), "{line}");
        assert!(line.contains("attempt=0"), "{line}");
    }

    #[tokio::test]
    async fn invalid_ticker_is_rejected_before_fetching() {
        let provider = TestProvider::new("a", Behavior::Value(1.0));
        let calls = Arc::clone(&provider.calls);
        let orch = orchestrator(
            vec![metric("X", &["a"], ">1", false)],
            vec![provider],
            Arc::new(ReadingCache::default()),
        );

        for bad in ["", "   ", "WAYTOOLONGTICKER", "A/B"] {
            let err = orch.analyze(bad).await.unwrap_err();
            assert!(err.is_client_error(), "{bad:?} -> {err}");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unknown_provider_id_fails_at_construction() {
        let registry = ProviderRegistry::new();
        let res = Orchestrator::new(
            vec![metric("X", &["missing.provider"], ">1", false)],
            &registry,
            Arc::new(ReadingCache::default()),
            policy(),
            options(),
        );
        assert!(res.is_err());
    }

    #[tokio::test]
    async fn fixture_settings_build_a_working_orchestrator() {
        let settings = Settings {
            use_fixtures: true,
            provider_min_delay: Duration::ZERO,
            ..Settings::default()
        };
        let orch = Orchestrator::from_settings(&settings, Arc::new(ReadingCache::default())).unwrap();
        let result = orch.analyze("PLTR").await.unwrap();

        assert_eq!(result.ratios().len(), 5);
        let gm = &result.ratios()[0];
        assert_eq!(gm.definition().name, "Gross Margin");
        assert_eq!(gm.readings()[0].source, "Finviz");
        assert_eq!(gm.readings()[0].value, Some(80.81));
        assert_eq!(gm.status(), MetricStatus::Pass);
        assert_eq!(result.max_score(), 4);
    }
}
