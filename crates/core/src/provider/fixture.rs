//! Offline providers with canned per-ticker values, for demos and local frontend work.

use crate::domain::Ticker;
use crate::provider::{ProviderRegistry, ValueProvider};
use anyhow::Result;
use std::collections::HashMap;

// (provider id, source, [(ticker, value)])
const FIXTURES: &[(&str, &str, &[(&str, f64)])] = &[
    ("finviz.gross_margin", "Finviz", &[("PLTR", 80.81), ("NVDA", 70.05)]),
    ("macrotrends.gross_margin", "Macrotrends", &[("PLTR", 80.38), ("NVDA", 69.85)]),
    ("yahoo.gross_margin", "Yahoo Finance", &[("PLTR", 80.81)]),
    ("quickfs.roic", "QuickFS", &[("PLTR", 9.7), ("NVDA", 78.9)]),
    ("quickfs.fcf_margin", "QuickFS", &[("PLTR", 44.1), ("NVDA", 41.6)]),
    ("macrotrends.fcf_margin", "Macrotrends", &[("NVDA", 41.32)]),
    ("yahoo.fcf_margin", "Yahoo Finance", &[("PLTR", 38.46)]),
    ("yahoo.interest_coverage", "Yahoo Finance", &[("NVDA", 329.8)]),
    ("finviz.pe_ratio", "Finviz", &[("PLTR", 406.95), ("NVDA", 52.3)]),
    ("yahoo.pe_ratio", "Yahoo Finance", &[("PLTR", 410.12), ("NVDA", 52.1)]),
];

#[derive(Debug, Clone)]
pub struct FixtureProvider {
    id: String,
    source: &'static str,
    values: HashMap<String, f64>,
}

impl FixtureProvider {
    pub fn new(id: impl Into<String>, source: &'static str) -> Self {
        Self {
            id: id.into(),
            source,
            values: HashMap::new(),
        }
    }

    pub fn with_value(mut self, ticker: &str, value: f64) -> Self {
        self.values.insert(ticker.to_ascii_uppercase(), value);
        self
    }
}

#[async_trait::async_trait]
impl ValueProvider for FixtureProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn source(&self) -> &'static str {
        self.source
    }

    async fn fetch(&self, ticker: &Ticker) -> Result<Option<f64>> {
        Ok(self.values.get(ticker.as_str()).copied())
    }
}

/// Registry mirroring the network provider ids, answered from [`FIXTURES`].
pub fn registry() -> Result<ProviderRegistry> {
    let mut registry = ProviderRegistry::new();
    for (id, source, values) in FIXTURES {
        let provider = values
            .iter()
            .fold(FixtureProvider::new(*id, *source), |p, (ticker, value)| {
                p.with_value(ticker, *value)
            });
        registry.register(provider)?;
    }
    Ok(registry)
}
