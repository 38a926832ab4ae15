use crate::config::Settings;
use crate::domain::Ticker;
use anyhow::{bail, Context, Result};
use std::collections::BTreeMap;
use std::sync::Arc;

pub mod extract;
pub mod finviz;
pub mod fixture;
pub mod http;
pub mod macrotrends;
pub mod quickfs;
pub mod yahoo;

/// One external source's answer for one metric.
///
/// `Err` is a transient failure and may be retried by the caller. `Ok(None)` means the
/// source answered but did not carry the value; it is final.
#[async_trait::async_trait]
pub trait ValueProvider: Send + Sync {
    /// Stable id used by metric configuration and cache keys, e.g. `finviz.gross_margin`.
    fn id(&self) -> &str;

    /// Name of the external source. Rate limiting and display are per source.
    fn source(&self) -> &'static str;

    async fn fetch(&self, ticker: &Ticker) -> Result<Option<f64>>;
}

#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: BTreeMap<String, Arc<dyn ValueProvider>>,
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.providers.keys()).finish()
    }
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Network-backed providers, or the offline fixtures when `USE_FIXTURES` is set.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        if settings.use_fixtures {
            tracing::info!("using fixture providers");
            return fixture::registry();
        }

        let mut registry = Self::new();
        let finviz = finviz::FinvizClient::from_settings(settings)?;
        registry.register(finviz.gross_margin())?;
        registry.register(finviz.pe_ratio())?;

        let macrotrends = macrotrends::MacrotrendsClient::from_settings(settings)?;
        registry.register(macrotrends.gross_margin())?;
        registry.register(macrotrends.fcf_margin())?;

        let quickfs = quickfs::QuickFsClient::from_settings(settings)?;
        registry.register(quickfs.roic())?;
        registry.register(quickfs.fcf_margin())?;

        let yahoo = yahoo::YahooClient::from_settings(settings)?;
        for field in yahoo::YahooField::ALL {
            registry.register(yahoo.provider(field))?;
        }

        Ok(registry)
    }

    pub fn register<P: ValueProvider + 'static>(&mut self, provider: P) -> Result<()> {
        self.register_arc(Arc::new(provider))
    }

    pub fn register_arc(&mut self, provider: Arc<dyn ValueProvider>) -> Result<()> {
        let id = provider.id().to_string();
        if self.providers.contains_key(&id) {
            bail!("provider {id:?} is registered twice");
        }
        self.providers.insert(id, provider);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn ValueProvider>> {
        self.providers.get(id).cloned()
    }

    pub fn resolve(&self, id: &str) -> Result<Arc<dyn ValueProvider>> {
        self.get(id)
            .with_context(|| format!("unknown provider id {id:?}"))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
