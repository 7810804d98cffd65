use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstamojoApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Could not reach the gateway: {0}")]
    Transport(String),
    #[error("The gateway rejected the request: {detail}")]
    Rejected { detail: serde_json::Value },
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Unexpected gateway response: {0}")]
    UnexpectedResponse(String),
}

impl InstamojoApiError {
    /// True for network-level failures (unreachable host, timeout), as opposed to an explicit gateway denial.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
