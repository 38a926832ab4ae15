use thiserror::Error;

/// Failures of the inbound "analyze ticker" operation. Provider problems never
/// show up here; they degrade into absent readings instead.
#[derive(Debug, Clone, Error)]
pub enum AnalyzeError {
    #[error("invalid ticker: {0}")]
    InvalidTicker(String),

    #[error("internal analysis fault: {0}")]
    Internal(String),
}

impl AnalyzeError {
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidTicker(_))
    }
}
