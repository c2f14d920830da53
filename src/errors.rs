use thiserror::Error;

/// Failure of a single HTTP exchange, before it is attributed to an operation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("HTTP error! status: {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("could not decode response: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status(code) => Some(*code),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => FetchError::Status(status.as_u16()),
            None if e.is_decode() => FetchError::Decode(e.to_string()),
            None => FetchError::Transport(e.to_string()),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DashboardError {
    #[error("Failed to load validators: {reason}")]
    Network { status: Option<u16>, reason: String },

    #[error("Failed to fetch thumbnail for {identity}: {reason}")]
    Enrichment { identity: String, reason: String },

    #[error("Wallet connection failed: {0}")]
    WalletConnection(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DashboardError {
    pub fn network(e: FetchError) -> Self {
        DashboardError::Network {
            status: e.status(),
            reason: e.to_string(),
        }
    }

    pub fn wallet(e: impl std::fmt::Display) -> Self {
        DashboardError::WalletConnection(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_error_keeps_upstream_status() {
        let err = DashboardError::network(FetchError::Status(500));
        assert_eq!(
            err,
            DashboardError::Network {
                status: Some(500),
                reason: "HTTP error! status: 500".to_string(),
            }
        );
    }

    #[test]
    fn transport_failure_has_no_status() {
        let err = DashboardError::network(FetchError::Transport("reset".into()));
        assert!(matches!(err, DashboardError::Network { status: None, .. }));
    }
}
