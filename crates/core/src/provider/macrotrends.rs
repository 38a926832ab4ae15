use crate::config::Settings;
use crate::domain::Ticker;
use crate::provider::{extract, http, ValueProvider};
use anyhow::Result;

const DEFAULT_BASE_URL: &str = "https://www.macrotrends.net";
const SOURCE: &str = "Macrotrends";

/// Chart URLs carry a company slug next to the ticker. The site redirects unknown
/// slugs, so the lowercase ticker is a usable fallback.
fn company_slug(ticker: &Ticker) -> String {
    match ticker.as_str() {
        "PLTR" => "palantir".to_string(),
        "NVDA" => "nvidia".to_string(),
        "MSFT" => "microsoft".to_string(),
        "AAPL" => "apple".to_string(),
        other => other.to_ascii_lowercase(),
    }
}

#[derive(Debug, Clone)]
pub struct MacrotrendsClient {
    http: reqwest::Client,
    base_url: String,
}

impl MacrotrendsClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = std::env::var("MACROTRENDS_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Ok(Self::new(settings.http_client()?, base_url))
    }

    pub fn gross_margin(&self) -> MacrotrendsProvider {
        MacrotrendsProvider {
            id: "macrotrends.gross_margin",
            page: "gross-margin",
            header: "Gross Margin",
            client: self.clone(),
        }
    }

    pub fn fcf_margin(&self) -> MacrotrendsProvider {
        MacrotrendsProvider {
            id: "macrotrends.fcf_margin",
            page: "free-cash-flow-margin",
            header: "Free Cash Flow Margin",
            client: self.clone(),
        }
    }

    async fn chart_page(&self, ticker: &Ticker, page: &str) -> Result<Option<String>> {
        let path = format!("stocks/charts/{ticker}/{}/{page}", company_slug(ticker));
        http::get_text(&self.http, &http::join_url(&self.base_url, &path)).await
    }
}

#[derive(Debug, Clone)]
pub struct MacrotrendsProvider {
    id: &'static str,
    page: &'static str,
    header: &'static str,
    client: MacrotrendsClient,
}

#[async_trait::async_trait]
impl ValueProvider for MacrotrendsProvider {
    fn id(&self) -> &str {
        self.id
    }

    fn source(&self) -> &'static str {
        SOURCE
    }

    async fn fetch(&self, ticker: &Ticker) -> Result<Option<f64>> {
        let Some(page) = self.client.chart_page(ticker, self.page).await? else {
            return Ok(None);
        };

        let value = extract::column_value(&page, self.header);
        if value.is_none() {
            tracing::debug!(provider = self.id, %ticker, header = self.header, "no history table value");
        }
        Ok(value)
    }
}
