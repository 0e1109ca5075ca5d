use thiserror::Error;

/// Failure of a single contract case.
#[derive(Debug, Error)]
pub enum ContractError {
    /// Network failure or timeout talking to the system under test.
    #[error("request {method} {url} failed: {message}")]
    Transport {
        /// HTTP method of the failed request.
        method: String,
        /// Absolute URL of the failed request.
        url: String,
        /// Transport error rendered for reporting.
        message: String,
    },

    /// The response violated the contract.
    #[error("{0}")]
    Assertion(String),

    /// The response body could not be decoded.
    #[error("could not decode response of {path}: {message}")]
    Decode {
        /// Request path the body came from.
        path: String,
        /// Decoder error.
        message: String,
    },

    /// The suite could not be configured or a fixture could not be created.
    #[error("setup failed: {0}")]
    Setup(String),
}

impl ContractError {
    /// Builds an assertion failure.
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::Assertion(message.into())
    }
}

/// Result type used by every probe.
pub type ContractResult<T> = Result<T, ContractError>;

/// Fails with an assertion error when `condition` is false.
pub fn ensure(condition: bool, message: impl FnOnce() -> String) -> ContractResult<()> {
    if condition {
        Ok(())
    } else {
        Err(ContractError::Assertion(message()))
    }
}
