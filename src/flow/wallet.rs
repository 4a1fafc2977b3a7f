//! Wallet-signature login: the provider seam and the sign-in message.
//!
//! The portal never talks to a wallet itself; a [`WalletProvider`] is the
//! capability injected by whatever surface embeds the flow (a browser bridge,
//! a test double). Absence of the capability is a first-class failure mode.

use crate::flow::error::FlowError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::{SecondsFormat, Utc};
use rand::{RngCore, rngs::OsRng};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    /// The provider exists but produced no usable answer.
    #[error("{0}")]
    Other(String),

    /// The user rejected the request in the wallet UI.
    #[error("signature request rejected by user")]
    Rejected,
}

/// Capability seam over a browser-injected (or test) wallet.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Request the account list; the first entry is the active address.
    async fn request_accounts(&self) -> Result<Vec<String>, WalletError>;

    /// Request a signature over a human-readable message.
    async fn personal_sign(&self, message: &str, address: &str) -> Result<String, WalletError>;
}

impl From<WalletError> for FlowError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::Rejected => Self::Cancelled,
            WalletError::Other(msg) => Self::Wallet(msg),
        }
    }
}

/// Human-readable message the wallet signs.
#[derive(Debug, Clone)]
pub struct SignInMessage {
    pub text: String,
    pub nonce: String,
}

impl SignInMessage {
    /// Build the message for a tenant and wallet address with a fresh nonce
    /// and the current timestamp.
    ///
    /// # Errors
    /// Returns an error if the system RNG fails.
    pub fn build(display_name: &str, address: &str) -> Result<Self> {
        let nonce = generate_nonce()?;
        let issued_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        Ok(Self::compose(display_name, address, nonce, &issued_at))
    }

    fn compose(display_name: &str, address: &str, nonce: String, issued_at: &str) -> Self {
        let text = [
            format!("Sign in to {display_name}"),
            String::new(),
            format!("Wallet: {address}"),
            format!("Nonce: {nonce}"),
            format!("Issued At: {issued_at}"),
        ]
        .join("\n");
        Self { text, nonce }
    }
}

/// Random nonce embedded in the sign-in message. Replay protection against
/// it is the IAM's responsibility; the portal only forwards it verbatim.
fn generate_nonce() -> Result<String> {
    let mut bytes = [0u8; 12];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate wallet nonce")?;
    Ok(Base64UrlUnpadded::encode_string(&bytes))
}
