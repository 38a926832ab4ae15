use crate::config::Settings;
use crate::domain::Ticker;
use crate::provider::{extract, http, ValueProvider};
use anyhow::Result;

const DEFAULT_BASE_URL: &str = "https://quickfs.net";
const SOURCE: &str = "QuickFS";

#[derive(Debug, Clone)]
pub struct QuickFsClient {
    http: reqwest::Client,
    base_url: String,
}

impl QuickFsClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url =
            std::env::var("QUICKFS_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Ok(Self::new(settings.http_client()?, base_url))
    }

    pub fn roic(&self) -> QuickFsProvider {
        QuickFsProvider {
            id: "quickfs.roic",
            labels: &["ROIC", "Return on Invested Capital"],
            client: self.clone(),
        }
    }

    pub fn fcf_margin(&self) -> QuickFsProvider {
        QuickFsProvider {
            id: "quickfs.fcf_margin",
            labels: &["FCF Margin", "Free Cash Flow Margin"],
            client: self.clone(),
        }
    }

    async fn company_page(&self, ticker: &Ticker) -> Result<Option<String>> {
        let url = http::join_url(&self.base_url, &format!("company/{ticker}"));
        http::get_text(&self.http, &url).await
    }
}

#[derive(Debug, Clone)]
pub struct QuickFsProvider {
    id: &'static str,
    labels: &'static [&'static str],
    client: QuickFsClient,
}

#[async_trait::async_trait]
impl ValueProvider for QuickFsProvider {
    fn id(&self) -> &str {
        self.id
    }

    fn source(&self) -> &'static str {
        SOURCE
    }

    async fn fetch(&self, ticker: &Ticker) -> Result<Option<f64>> {
        let Some(page) = self.client.company_page(ticker).await? else {
            return Ok(None);
        };

        let value = extract::label_value(&page, self.labels);
        if value.is_none() {
            tracing::debug!(provider = self.id, %ticker, "metric row not found on company page");
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_roic_row() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/company/PLTR")
            .with_status(200)
            .with_body(
                r#"<table>
                     <tr><th>Metric</th><th>TTM</th></tr>
                     <tr><td>Return on Invested Capital</td><td>9.7%</td></tr>
                     <tr><td>FCF Margin</td><td>44.1%</td></tr>
                   </table>"#,
            )
            .expect(2)
            .create_async()
            .await;

        let client = QuickFsClient::new(reqwest::Client::new(), server.url());
        let ticker = Ticker::parse("PLTR").unwrap();
        assert_eq!(client.roic().fetch(&ticker).await.unwrap(), Some(9.7));
        assert_eq!(client.fcf_margin().fetch(&ticker).await.unwrap(), Some(44.1));
    }

    #[tokio::test]
    async fn page_without_row_is_a_miss() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/company/PLTR")
            .with_status(200)
            .with_body("<html><body><p>Sign in to continue</p></body></html>")
            .create_async()
            .await;

        let client = QuickFsClient::new(reqwest::Client::new(), server.url());
        let ticker = Ticker::parse("PLTR").unwrap();
        assert_eq!(client.roic().fetch(&ticker).await.unwrap(), None);
    }
}
