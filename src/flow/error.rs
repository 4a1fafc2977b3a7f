//! Error taxonomy for the credential exchange flow.
//!
//! Every failure collapses to a single human-readable message for the form
//! UI; nothing here is fatal and every path is recoverable by resubmission.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlowError {
    /// Local validation failed before any network call was issued.
    #[error("{0}")]
    Validation(String),

    /// The IAM answered with an explicit error status or message.
    #[error("{0}")]
    Rejected(String),

    /// Transport failure, timeout, or a malformed response body.
    #[error("connection error: {0}")]
    Network(#[from] reqwest::Error),

    /// A required capability (wallet provider, selected account) is absent.
    #[error("{0}")]
    CapabilityMissing(String),

    /// The user rejected the wallet signature request.
    #[error("wallet connection cancelled")]
    Cancelled,

    /// The wallet provider failed for a reason other than user rejection.
    #[error("wallet failure: {0}")]
    Wallet(String),
}

impl FlowError {
    /// The message shown in the form UI. Exact strings are part of the
    /// portal's contract with its rendering surface.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) | Self::Rejected(msg) | Self::CapabilityMissing(msg) => {
                msg.clone()
            }
            Self::Network(_) => "Connection error. Please try again.".to_string(),
            Self::Cancelled => "Wallet connection cancelled".to_string(),
            Self::Wallet(_) => "Wallet connection failed. Please try again.".to_string(),
        }
    }
}
