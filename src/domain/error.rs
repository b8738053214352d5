//! Domain error types.

/// Top-level error type for confluence.
#[derive(Debug, thiserror::Error)]
pub enum ConfluenceError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("insufficient data for {symbol}: have {bars} bars, need {minimum}")]
    InsufficientData {
        symbol: String,
        bars: usize,
        minimum: usize,
    },

    #[error("invalid order request: {reason}")]
    InvalidOrderRequest { reason: String },

    #[error("upstream unavailable: {reason}")]
    UpstreamUnavailable { reason: String },

    #[error("invalid bar data: {reason}")]
    InvalidData { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ConfluenceError {
    pub(crate) fn config_invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        ConfluenceError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_order(reason: impl Into<String>) -> Self {
        ConfluenceError::InvalidOrderRequest {
            reason: reason.into(),
        }
    }
}

impl From<&ConfluenceError> for std::process::ExitCode {
    fn from(err: &ConfluenceError) -> Self {
        let code: u8 = match err {
            ConfluenceError::Io(_) => 1,
            ConfluenceError::ConfigParse { .. }
            | ConfluenceError::ConfigMissing { .. }
            | ConfluenceError::ConfigInvalid { .. } => 2,
            ConfluenceError::InvalidOrderRequest { .. } => 3,
            ConfluenceError::InsufficientData { .. } | ConfluenceError::InvalidData { .. } => 5,
            ConfluenceError::UpstreamUnavailable { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
