use crate::error::AnalyzeError;
use serde::Serialize;
use std::fmt;

pub const MAX_TICKER_LEN: usize = 10;

/// Normalized stock symbol. Construction is the only validation point; every
/// cache key and provider URL is built from this value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Ticker(String);

impl Ticker {
    pub fn parse(raw: &str) -> Result<Self, AnalyzeError> {
        let symbol = raw.trim().to_ascii_uppercase();

        if symbol.is_empty() {
            return Err(AnalyzeError::InvalidTicker("ticker must be non-empty".into()));
        }
        if symbol.len() > MAX_TICKER_LEN {
            return Err(AnalyzeError::InvalidTicker(format!(
                "ticker must be at most {MAX_TICKER_LEN} characters (got {})",
                symbol.len()
            )));
        }
        if let Some(bad) = symbol
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '.' || *c == '-'))
        {
            return Err(AnalyzeError::InvalidTicker(format!(
                "ticker contains unsupported character {bad:?}"
            )));
        }

        Ok(Self(symbol))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
