/// Reasons the upstream weather provider is considered unavailable.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Upstream returned status {0}")]
    Status(u16),
    #[error("Failed to parse upstream payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("Upstream payload is missing `{0}`")]
    MissingField(&'static str),
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Request(e) if e.is_timeout())
    }
}
