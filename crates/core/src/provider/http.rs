use anyhow::{Context, Result};
use reqwest::StatusCode;

/// GET a document. A 404 is a definite "no such page" and comes back as `Ok(None)`;
/// every other non-success status is an error so the retry policy can try again.
pub async fn get_text(http: &reqwest::Client, url: &str) -> Result<Option<String>> {
    let res = http
        .get(url)
        .send()
        .await
        .with_context(|| format!("request to {url} failed"))?;

    let status = res.status();
    if status == StatusCode::NOT_FOUND {
        tracing::debug!(%url, "source has no page for this ticker");
        return Ok(None);
    }

    let text = res
        .text()
        .await
        .with_context(|| format!("failed to read response from {url}"))?;
    if !status.is_success() {
        anyhow::bail!("HTTP {status} from {url}");
    }
    Ok(Some(text))
}

pub fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
