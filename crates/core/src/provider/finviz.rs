use crate::config::Settings;
use crate::domain::Ticker;
use crate::provider::{extract, http, ValueProvider};
use anyhow::Result;

const DEFAULT_BASE_URL: &str = "https://finviz.com";
const SOURCE: &str = "Finviz";

/// Quote-page client. Every Finviz provider holds a handle to the same client.
#[derive(Debug, Clone)]
pub struct FinvizClient {
    http: reqwest::Client,
    base_url: String,
}

impl FinvizClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url =
            std::env::var("FINVIZ_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Ok(Self::new(settings.http_client()?, base_url))
    }

    pub fn gross_margin(&self) -> FinvizProvider {
        FinvizProvider {
            id: "finviz.gross_margin",
            labels: &["Gross Margin", "Gross M."],
            client: self.clone(),
        }
    }

    pub fn pe_ratio(&self) -> FinvizProvider {
        FinvizProvider {
            id: "finviz.pe_ratio",
            labels: &["P/E", "Trailing P/E"],
            client: self.clone(),
        }
    }

    async fn quote_page(&self, ticker: &Ticker) -> Result<Option<String>> {
        let url = http::join_url(&self.base_url, &format!("quote.ashx?t={ticker}"));
        http::get_text(&self.http, &url).await
    }
}

#[derive(Debug, Clone)]
pub struct FinvizProvider {
    id: &'static str,
    labels: &'static [&'static str],
    client: FinvizClient,
}

#[async_trait::async_trait]
impl ValueProvider for FinvizProvider {
    fn id(&self) -> &str {
        self.id
    }

    fn source(&self) -> &'static str {
        SOURCE
    }

    async fn fetch(&self, ticker: &Ticker) -> Result<Option<f64>> {
        let Some(page) = self.client.quote_page(ticker).await? else {
            return Ok(None);
        };

        let value = extract::label_value(&page, self.labels);
        if value.is_none() {
            tracing::debug!(provider = self.id, %ticker, labels = ?self.labels, "label not found on quote page");
        }
        Ok(value)
    }
}
