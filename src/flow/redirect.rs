//! Redirect-target derivation and the browser redirect formats the portal
//! produces.
//!
//! `redirect_uri` and `client_id` come from the inbound request's query
//! string and fall back to the tenant's homepage URL and configured client
//! id. The authorize-endpoint `state` parameter is base64-encoded JSON
//! carrying the redirect URI, and must decode back to it.

use crate::{flow::error::FlowError, tenant::TenantConfig};
use anyhow::{Context, Result};
use base64ct::{Base64, Encoding};
use serde::Deserialize;
use url::{Url, form_urlencoded};

pub const OAUTH_SCOPE: &str = "openid profile email";

/// OAuth query parameters accepted on every portal endpoint.
#[derive(Deserialize, Debug, Default)]
pub struct RedirectQuery {
    pub redirect_uri: Option<String>,
    pub client_id: Option<String>,
}

/// Where the browser ends up once a flow succeeds.
#[derive(Debug, Clone)]
pub struct RedirectTarget {
    pub redirect_uri: String,
    pub client_id: String,
}

impl RedirectTarget {
    /// Derive the target from the request query, falling back to the tenant.
    #[must_use]
    pub fn from_query(query: &RedirectQuery, tenant: &TenantConfig) -> Self {
        Self {
            redirect_uri: query
                .redirect_uri
                .clone()
                .unwrap_or_else(|| tenant.homepage_url.clone()),
            client_id: query
                .client_id
                .clone()
                .unwrap_or_else(|| tenant.client_id.clone()),
        }
    }

    /// `&` when the redirect URI already carries a query, else `?`.
    fn separator(&self) -> char {
        if self.redirect_uri.contains('?') {
            '&'
        } else {
            '?'
        }
    }

    /// `{redirect_uri}{sep}token=<urlencoded token>`
    #[must_use]
    pub fn with_token(&self, token: &str) -> String {
        let query: String = form_urlencoded::Serializer::new(String::new())
            .append_pair("token", token)
            .finish();
        format!("{}{}{}", self.redirect_uri, self.separator(), query)
    }

    /// `{redirect_uri}{sep}wallet=<address>&signature=<sig>`
    #[must_use]
    pub fn with_wallet(&self, address: &str, signature: &str) -> String {
        let query: String = form_urlencoded::Serializer::new(String::new())
            .append_pair("wallet", address)
            .append_pair("signature", signature)
            .finish();
        format!("{}{}{}", self.redirect_uri, self.separator(), query)
    }
}

/// Response type requested from the IAM's authorize endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseType {
    Code,
    Token,
}

impl ResponseType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Token => "token",
        }
    }
}

/// Build the `{iam}/login/oauth/authorize` redirect, optionally hinting the
/// upstream social provider so the IAM completes its OAuth dance against the
/// right one.
///
/// # Errors
/// Returns a validation error when the tenant's IAM URL is not parseable.
pub fn authorize_url(
    tenant: &TenantConfig,
    target: &RedirectTarget,
    response_type: ResponseType,
    provider: Option<&str>,
) -> Result<Url, FlowError> {
    let base = format!("{}/login/oauth/authorize", tenant.iam_url.trim_end_matches('/'));
    let mut url = Url::parse(&base)
        .map_err(|_| FlowError::Validation("Invalid IAM endpoint".to_string()))?;

    url.query_pairs_mut()
        .append_pair("client_id", &target.client_id)
        .append_pair("redirect_uri", &target.redirect_uri)
        .append_pair("response_type", response_type.as_str())
        .append_pair("scope", OAUTH_SCOPE)
        .append_pair("state", &encode_state(&target.redirect_uri));

    if let Some(provider) = provider {
        url.query_pairs_mut().append_pair("provider", provider);
    }

    Ok(url)
}

/// `state` = base64(JSON `{"redirect_uri": ...}`).
#[must_use]
pub fn encode_state(redirect_uri: &str) -> String {
    let json = serde_json::json!({ "redirect_uri": redirect_uri }).to_string();
    Base64::encode_string(json.as_bytes())
}

/// Recover the redirect URI from an authorize `state` parameter.
///
/// # Errors
/// Returns an error on invalid base64, invalid JSON, or a missing field.
pub fn decode_state(state: &str) -> Result<String> {
    let bytes = Base64::decode_vec(state)
        .map_err(|e| anyhow::anyhow!("invalid state encoding: {e}"))?;
    let value: serde_json::Value =
        serde_json::from_slice(&bytes).context("invalid state payload")?;
    value
        .get("redirect_uri")
        .and_then(serde_json::Value::as_str)
        .map(ToString::to_string)
        .context("state payload missing redirect_uri")
}
