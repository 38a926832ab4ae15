use crate::consensus;
use crate::domain::{MetricDefinition, Ticker};
use crate::threshold::{self, MetricStatus};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::sync::Arc;

/// How a reading was obtained. Diagnostics only; not part of the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Cached,
    Fetched,
    /// The source answered but the value was not in the document.
    Missing,
    Failed,
    TimedOut,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceReading {
    #[serde(skip)]
    pub provider: String,
    pub source: String,
    pub value: Option<f64>,
    #[serde(skip)]
    pub outcome: FetchOutcome,
}

impl SourceReading {
    pub fn new(
        provider: impl Into<String>,
        source: impl Into<String>,
        value: Option<f64>,
        outcome: FetchOutcome,
    ) -> Self {
        Self {
            provider: provider.into(),
            source: source.into(),
            value,
            outcome,
        }
    }
}

/// Readings for one metric plus the figures derived from them. The derived fields
/// are computed in [`MetricResult::from_readings`] and cannot be set directly.
#[derive(Debug, Clone)]
pub struct MetricResult {
    definition: Arc<MetricDefinition>,
    readings: Vec<SourceReading>,
    consensus: Option<f64>,
    spread: Option<f64>,
    status: MetricStatus,
}

impl MetricResult {
    pub fn from_readings(
        definition: Arc<MetricDefinition>,
        readings: Vec<SourceReading>,
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(
            readings.len() == definition.providers.len(),
            "metric {:?} expects {} readings, got {}",
            definition.name,
            definition.providers.len(),
            readings.len()
        );

        let consensus = consensus::consensus(&readings);
        let spread = consensus::spread(&readings);
        let status = threshold::evaluate(definition.informational, consensus, &definition.rule);

        Ok(Self {
            definition,
            readings,
            consensus,
            spread,
            status,
        })
    }

    pub fn definition(&self) -> &MetricDefinition {
        &self.definition
    }

    pub fn readings(&self) -> &[SourceReading] {
        &self.readings
    }

    pub fn consensus(&self) -> Option<f64> {
        self.consensus
    }

    pub fn spread(&self) -> Option<f64> {
        self.spread
    }

    pub fn status(&self) -> MetricStatus {
        self.status
    }
}

impl Serialize for MetricResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("MetricResult", 6)?;
        s.serialize_field("metric", &self.definition.name)?;
        s.serialize_field("values", &self.readings)?;
        s.serialize_field("consensus", &self.consensus)?;
        s.serialize_field("spread", &self.spread)?;
        s.serialize_field("target", &self.definition.target_label)?;
        s.serialize_field("status", &self.status)?;
        s.end()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    ticker: Ticker,
    ratios: Vec<MetricResult>,
    overall_score: usize,
    max_score: usize,
}

impl AnalysisResult {
    pub fn new(ticker: Ticker, ratios: Vec<MetricResult>) -> Self {
        let scored = || ratios.iter().filter(|r| !r.definition.is_info_only());
        let overall_score = scored()
            .filter(|r| r.status == MetricStatus::Pass)
            .count();
        let max_score = scored().count();

        Self {
            ticker,
            ratios,
            overall_score,
            max_score,
        }
    }

    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    pub fn ratios(&self) -> &[MetricResult] {
        &self.ratios
    }

    pub fn overall_score(&self) -> usize {
        self.overall_score
    }

    pub fn max_score(&self) -> usize {
        self.max_score
    }
}
