use thiserror::Error;

/// Centralized error types for the application
///
/// Webhook handling never lets one of these escape as an HTTP failure: each
/// variant maps to a defined acknowledgement (see `telegram::handlers`).
/// Uses `thiserror` for automatic error conversion and display formatting.
///
/// # Example
///
/// ```no_run
/// use marketbot::core::error::AppError;
///
/// fn handle_error(err: AppError) {
///     log::error!("Error: {}", err);
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or invalid configuration (token, endpoint, numeric setting)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Update body could not be used (bad JSON, no chat id)
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Update id was already acted upon
    #[error("Duplicate update: {0}")]
    DuplicateUpdate(i64),

    /// Outbound message could not be confirmed as sent
    #[error("Delivery failure: {0}")]
    DeliveryFailure(String),

    /// HTTP/Fetch errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration problems. Reported to the operator log, never to a chat.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{name} has an invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Wallet service failures.
///
/// The chat user sees one generic sentence per command; the variant (and the
/// nested [`SubmissionError`]) is what ends up in the log.
#[derive(Error, Debug)]
pub enum WalletError {
    /// No chain endpoint configured
    #[error("chain endpoint is not configured")]
    ChainUnavailable,

    /// Chat has no wallet yet
    #[error("chat {0} has no wallet")]
    NoWallet(i64),

    /// Address given to a read-only query was not a valid address
    #[error("invalid address {0:?}")]
    InvalidAddress(String),

    /// RPC failure outside of payment submission (balance queries)
    #[error("chain query failed: {0}")]
    Rpc(#[from] RpcError),

    #[error("payment submission failed: {0}")]
    Submission(#[from] SubmissionError),
}

/// Distinct causes behind a failed `/pay`.
#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("invalid recipient address {0:?}")]
    InvalidAddress(String),

    #[error("invalid amount {amount:?}: {reason}")]
    InvalidAmount { amount: String, reason: String },

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error(transparent)]
    Rpc(RpcError),
}

impl From<RpcError> for SubmissionError {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::Rejected { code, message } if message.to_lowercase().contains("insufficient funds") => {
                SubmissionError::InsufficientFunds(format!("{} (code {})", message, code))
            }
            other => SubmissionError::Rpc(other),
        }
    }
}

/// JSON-RPC level failures.
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("endpoint returned HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("node rejected request ({code}): {message}")]
    Rejected { code: i64, message: String },

    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
