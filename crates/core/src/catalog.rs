use crate::config::Settings;
use crate::domain::MetricDefinition;
use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use std::path::Path;

/// On-disk form of one metric, as read from `METRICS_CONFIG`.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricConfig {
    pub name: String,
    pub providers: Vec<String>,
    pub target: String,
    #[serde(default)]
    pub informational: bool,
}

impl MetricConfig {
    pub fn into_definition(self) -> Result<MetricDefinition> {
        MetricDefinition::new(self.name, self.providers, self.target, self.informational)
    }
}

fn entry(name: &str, providers: &[&str], target: &str, informational: bool) -> MetricConfig {
    MetricConfig {
        name: name.to_string(),
        providers: providers.iter().map(|p| p.to_string()).collect(),
        target: target.to_string(),
        informational,
    }
}

pub fn builtin_configs() -> Vec<MetricConfig> {
    vec![
        entry(
            "Gross Margin",
            &["finviz.gross_margin", "macrotrends.gross_margin", "yahoo.gross_margin"],
            ">60%",
            false,
        ),
        entry("ROIC", &["quickfs.roic"], ">10-12%", false),
        entry(
            "FCF Margin",
            &["quickfs.fcf_margin", "macrotrends.fcf_margin", "yahoo.fcf_margin"],
            ">20%",
            false,
        ),
        entry("Interest Coverage", &["yahoo.interest_coverage"], "≥3-4x", false),
        entry("P/E Ratio", &["finviz.pe_ratio", "yahoo.pe_ratio"], "Info Only", true),
    ]
}

pub fn builtin() -> Result<Vec<MetricDefinition>> {
    build(builtin_configs())
}

pub fn load(path: &Path) -> Result<Vec<MetricDefinition>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read metrics config {}", path.display()))?;
    parse(&text).with_context(|| format!("invalid metrics config {}", path.display()))
}

pub fn parse(json: &str) -> Result<Vec<MetricDefinition>> {
    let entries: Vec<MetricConfig> =
        serde_json::from_str(json).context("metrics config is not a JSON array of metrics")?;
    build(entries)
}

/// `METRICS_CONFIG` when set, otherwise the built-in catalog.
pub fn from_settings(settings: &Settings) -> Result<Vec<MetricDefinition>> {
    match settings.metrics_config.as_deref() {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading metric catalog");
            load(path)
        }
        None => builtin(),
    }
}

fn build(entries: Vec<MetricConfig>) -> Result<Vec<MetricDefinition>> {
    ensure!(!entries.is_empty(), "metric catalog must not be empty");

    let mut out: Vec<MetricDefinition> = Vec::with_capacity(entries.len());
    for entry in entries {
        let def = entry.into_definition()?;
        ensure!(
            out.iter().all(|d| d.name != def.name),
            "metric {:?} is defined twice",
            def.name
        );
        out.push(def);
    }
    Ok(out)
}
