use crate::config::Settings;
use crate::domain::Ticker;
use crate::provider::{http, ValueProvider};
use anyhow::{Context, Result};
use serde_json::Value;

const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";
const SOURCE: &str = "Yahoo Finance";
const MODULES: &str = "summaryDetail,financialData,incomeStatementHistory";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YahooField {
    GrossMargin,
    FcfMargin,
    InterestCoverage,
    PeRatio,
}

impl YahooField {
    pub const ALL: [YahooField; 4] = [
        Self::GrossMargin,
        Self::FcfMargin,
        Self::InterestCoverage,
        Self::PeRatio,
    ];

    fn id(self) -> &'static str {
        match self {
            Self::GrossMargin => "yahoo.gross_margin",
            Self::FcfMargin => "yahoo.fcf_margin",
            Self::InterestCoverage => "yahoo.interest_coverage",
            Self::PeRatio => "yahoo.pe_ratio",
        }
    }

    /// Reads the field from one quote-summary `result` object. Margins are reported
    /// as fractions and converted to percentages. Annual statements are used for
    /// interest coverage so the figure lines up with the other sources.
    fn extract(self, summary: &Value) -> Option<f64> {
        match self {
            Self::GrossMargin => raw(summary, "/financialData/grossMargins").map(|m| m * 100.0),
            Self::FcfMargin => {
                let fcf = raw(summary, "/financialData/freeCashflow")?;
                let revenue = raw(summary, "/financialData/totalRevenue")?;
                (revenue > 0.0).then(|| fcf / revenue * 100.0)
            }
            Self::InterestCoverage => {
                let latest = "/incomeStatementHistory/incomeStatementHistory/0";
                let ebit = raw(summary, &format!("{latest}/ebit"))?;
                let interest = raw(summary, &format!("{latest}/interestExpense"))?.abs();
                // No interest expense means no debt; coverage is undefined rather than infinite.
                (interest > 0.0).then(|| ebit / interest)
            }
            Self::PeRatio => raw(summary, "/summaryDetail/trailingPE"),
        }
    }
}

fn raw(v: &Value, pointer: &str) -> Option<f64> {
    v.pointer(pointer)?.get("raw")?.as_f64()
}

#[derive(Debug, Clone)]
pub struct YahooClient {
    http: reqwest::Client,
    base_url: String,
}

impl YahooClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url =
            std::env::var("YAHOO_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Ok(Self::new(settings.http_client()?, base_url))
    }

    pub fn provider(&self, field: YahooField) -> YahooProvider {
        YahooProvider {
            field,
            client: self.clone(),
        }
    }

    async fn quote_summary(&self, ticker: &Ticker) -> Result<Option<Value>> {
        let path = format!("v10/finance/quoteSummary/{ticker}?modules={MODULES}");
        let Some(text) = http::get_text(&self.http, &http::join_url(&self.base_url, &path)).await?
        else {
            return Ok(None);
        };

        let body: Value = serde_json::from_str(&text)
            .with_context(|| format!("quote summary for {ticker} is not valid JSON"))?;
        Ok(body.pointer("/quoteSummary/result/0").cloned())
    }
}

#[derive(Debug, Clone)]
pub struct YahooProvider {
    field: YahooField,
    client: YahooClient,
}

#[async_trait::async_trait]
impl ValueProvider for YahooProvider {
    fn id(&self) -> &str {
        self.field.id()
    }

    fn source(&self) -> &'static str {
        SOURCE
    }

    async fn fetch(&self, ticker: &Ticker) -> Result<Option<f64>> {
        let Some(summary) = self.client.quote_summary(ticker).await? else {
            tracing::debug!(provider = self.id(), %ticker, "no quote summary result");
            return Ok(None);
        };
        Ok(self.field.extract(&summary))
    }
}
