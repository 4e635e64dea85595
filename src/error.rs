use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid site config: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContactError {
    #[error("email service is not configured: missing {0}")]
    NotConfigured(&'static str),
    #[error("email request failed: {0}")]
    Request(String),
    #[error("email service rejected the message ({status}): {body}")]
    Rejected { status: u16, body: String },
}

impl From<gloo_net::Error> for ContactError {
    fn from(e: gloo_net::Error) -> Self {
        Self::Request(e.to_string())
    }
}
