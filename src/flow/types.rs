//! Wire types for the IAM REST surface.
//!
//! Responses are loosely shaped on purpose: the IAM reports failures through
//! any of `status`, `msg`, or `data`, and success bodies may or may not carry
//! an `access_token`. Everything is optional and the flow decides.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON body for `POST /api/signup`.
#[derive(Serialize, Debug)]
pub struct SignupPayload<'a> {
    pub application: &'a str,
    pub organization: &'a str,
    pub username: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    #[serde(rename = "type")]
    pub kind: &'a str,
}

/// JSON body for `POST /api/login` (one-time-code logins).
#[derive(Serialize, Debug)]
pub struct CodeLoginPayload<'a> {
    pub application: &'a str,
    pub organization: &'a str,
    pub username: &'a str,
    pub code: &'a str,
    #[serde(rename = "type")]
    pub kind: &'a str,
}

/// JSON body for `POST /api/login/wallet`.
#[derive(Serialize, Debug)]
pub struct WalletPayload<'a> {
    pub application: &'a str,
    pub organization: &'a str,
    pub address: &'a str,
    pub message: &'a str,
    pub signature: &'a str,
    pub nonce: &'a str,
    #[serde(rename = "clientId")]
    pub client_id: &'a str,
}

/// Catch-all response shape for the IAM's JSON endpoints.
#[derive(Deserialize, Debug, Default)]
pub struct IamResponse {
    pub status: Option<String>,
    pub msg: Option<String>,
    pub data: Option<Value>,
    pub data2: Option<Value>,
    pub access_token: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl IamResponse {
    /// The IAM signals signup errors through any of three fields.
    #[must_use]
    pub fn is_signup_error(&self) -> bool {
        self.status.as_deref() == Some("error")
            || self.msg.as_deref() == Some("error")
            || self.data.as_ref().and_then(Value::as_str) == Some("error")
    }

    /// Login errors: an explicit error status, or a message that is not "ok".
    #[must_use]
    pub fn is_login_error(&self) -> bool {
        self.status.as_deref() == Some("error")
            || self.msg.as_deref().is_some_and(|msg| msg != "ok")
    }

    #[must_use]
    pub fn is_ok_status(&self) -> bool {
        self.status.as_deref() == Some("ok") || self.msg.as_deref() == Some("ok")
    }

    /// Best server-provided message, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<String> {
        self.msg
            .clone()
            .filter(|msg| !msg.is_empty() && msg != "error")
            .or_else(|| {
                self.data2
                    .as_ref()
                    .and_then(Value::as_str)
                    .map(ToString::to_string)
            })
            .or_else(|| self.error.clone())
    }
}
