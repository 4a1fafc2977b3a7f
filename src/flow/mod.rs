//! Credential exchange flow against a tenant's IAM backend.
//!
//! Four wire interactions, all client-driven and stateless: signup with
//! auto-login, password/one-time-code login, social-provider authorize entry,
//! and wallet-signature login. Every successful flow ends in a browser
//! redirect location; every failure maps to a [`FlowError`] whose
//! `user_message` is shown in the form. No retries anywhere: the user
//! resubmits.
//!
//! Login uses the direct password-grant exchange (form-encoded POST to the
//! IAM token endpoint) and redirects with `token=`; code logins that succeed
//! without an explicit token delegate to the IAM's authorize endpoint with
//! `response_type=token`.

pub mod error;
pub mod redirect;
pub mod session;
pub mod types;
pub mod wallet;

pub use error::FlowError;
pub use redirect::{RedirectQuery, RedirectTarget, ResponseType};
pub use session::{AuthMethod, AuthMode, AuthSession, SessionStatus};
pub use wallet::{SignInMessage, WalletError, WalletProvider};

use crate::tenant::TenantConfig;
use anyhow::{Context, Result};
use regex::Regex;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Deserialize;
use std::{sync::LazyLock, time::Duration};
use tracing::{debug, error, instrument};
use types::{CodeLoginPayload, IamResponse, SignupPayload, WalletPayload};
use utoipa::ToSchema;

/// Default upper bound on any single IAM call. A hung request surfaces as a
/// connection error instead of pinning the submission in flight forever.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// User-entered signup fields.
#[derive(ToSchema, Deserialize, Debug)]
pub struct SignupForm {
    #[serde(default)]
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// User-entered login fields.
#[derive(ToSchema, Deserialize, Debug)]
pub struct LoginForm {
    #[serde(default)]
    pub method: AuthMethod,
    /// Email or phone number.
    pub identifier: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

/// Wallet signature bundle produced by the provider sequence (or posted by
/// the rendering surface once the browser wallet has signed).
#[derive(ToSchema, Deserialize, Debug, Clone)]
pub struct WalletCredentials {
    pub address: String,
    pub message: String,
    pub signature: String,
    pub nonce: String,
}

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern compiles"));

/// Basic email sanity check; the derived signup username needs a local part.
#[must_use]
pub fn valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Stateless client for the IAM REST surface.
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: Client,
}

impl AuthClient {
    /// Build the client with the portal user agent and a request timeout.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .timeout(timeout)
            .build()
            .context("failed to build IAM client")?;
        Ok(Self { http })
    }

    /// Create an account, then attempt the password-grant auto-login.
    ///
    /// On a token: redirect to `{redirect_uri}{sep}token=...`. Signup
    /// succeeded but auto-login did not: redirect to `login_fallback` (the
    /// login page with the original query preserved).
    ///
    /// # Errors
    /// Validation failures never issue a network call; remote rejections
    /// carry the server message, transport failures the generic one.
    #[instrument(skip(self, form), fields(tenant = %tenant.id))]
    pub async fn signup(
        &self,
        tenant: &TenantConfig,
        form: &SignupForm,
        target: &RedirectTarget,
        login_fallback: &str,
    ) -> Result<String, FlowError> {
        if form.password != form.confirm_password {
            return Err(FlowError::Validation("Passwords do not match".to_string()));
        }
        if form.password.chars().count() < 8 {
            return Err(FlowError::Validation(
                "Password must be at least 8 characters".to_string(),
            ));
        }
        if !valid_email(&form.email) {
            return Err(FlowError::Validation("Invalid email".to_string()));
        }

        let username = form.email.split('@').next().unwrap_or(&form.email);
        let name = if form.name.trim().is_empty() {
            username
        } else {
            form.name.trim()
        };

        let payload = SignupPayload {
            application: &tenant.application_name,
            organization: &tenant.organization_name,
            username,
            name,
            email: &form.email,
            password: &form.password,
            kind: "normal-user",
        };

        let response: IamResponse = self
            .http
            .post(format!("{}/api/signup", iam_base(tenant)))
            .json(&payload)
            .send()
            .await?
            .json()
            .await?;

        if response.is_signup_error() {
            let msg = response
                .server_message()
                .unwrap_or_else(|| "Signup failed. Please try again.".to_string());
            error!("signup rejected: {msg}");
            return Err(FlowError::Rejected(msg));
        }

        // Auto-login after signup
        let token = self
            .password_grant(tenant, &target.client_id, &form.email, &form.password)
            .await?
            .access_token;

        match token {
            Some(token) => Ok(target.with_token(&token)),
            None => {
                debug!("signup succeeded but auto-login returned no token");
                Ok(login_fallback.to_string())
            }
        }
    }

    /// Authenticate with a password or a one-time code and redirect with a
    /// bearer token.
    ///
    /// # Errors
    /// Remote rejections carry the server message ("Invalid email or
    /// password" for a token-endpoint `invalid_grant`), transport failures
    /// the generic connection error.
    #[instrument(skip(self, form), fields(tenant = %tenant.id, method = ?form.method))]
    pub async fn login(
        &self,
        tenant: &TenantConfig,
        form: &LoginForm,
        target: &RedirectTarget,
    ) -> Result<String, FlowError> {
        match form.method {
            AuthMethod::Password => {
                let password = form.password.as_deref().unwrap_or_default();
                let response = self
                    .password_grant(tenant, &target.client_id, &form.identifier, password)
                    .await?;

                match response.access_token {
                    Some(token) => Ok(target.with_token(&token)),
                    None => Err(Self::grant_rejection(&response)),
                }
            }
            AuthMethod::Code => {
                let payload = CodeLoginPayload {
                    application: &tenant.application_name,
                    organization: &tenant.organization_name,
                    username: &form.identifier,
                    code: form.code.as_deref().unwrap_or_default(),
                    kind: "code",
                };

                let response: IamResponse = self
                    .http
                    .post(format!("{}/api/login", iam_base(tenant)))
                    .json(&payload)
                    .send()
                    .await?
                    .json()
                    .await?;

                if response.is_login_error() {
                    let msg = response
                        .server_message()
                        .unwrap_or_else(|| "Invalid credentials".to_string());
                    error!("code login rejected: {msg}");
                    return Err(FlowError::Rejected(msg));
                }

                match response.access_token {
                    Some(token) => Ok(target.with_token(&token)),
                    // Token issuance stays with the IAM's own OAuth endpoint.
                    None => Ok(redirect::authorize_url(
                        tenant,
                        target,
                        ResponseType::Token,
                        None,
                    )?
                    .to_string()),
                }
            }
            AuthMethod::WebAuthn | AuthMethod::FaceId => Err(FlowError::Validation(
                "This login method is not available yet".to_string(),
            )),
        }
    }

    /// Run the full wallet sequence against an injected provider capability:
    /// account list, sign-in message, signature, then backend verification.
    ///
    /// # Errors
    /// An absent capability or empty account list never calls the backend;
    /// user-rejected signatures surface as cancelled.
    #[instrument(skip(self, provider), fields(tenant = %tenant.id))]
    pub async fn wallet_login(
        &self,
        tenant: &TenantConfig,
        provider: Option<&dyn WalletProvider>,
        target: &RedirectTarget,
    ) -> Result<String, FlowError> {
        let Some(provider) = provider else {
            return Err(FlowError::CapabilityMissing(
                "No wallet detected. Install MetaMask or another Web3 wallet.".to_string(),
            ));
        };

        let accounts = provider.request_accounts().await?;
        let Some(address) = accounts.first() else {
            return Err(FlowError::CapabilityMissing(
                "No account selected".to_string(),
            ));
        };

        let message = SignInMessage::build(&tenant.display_name, address)
            .map_err(|e| FlowError::Wallet(e.to_string()))?;
        let signature = provider.personal_sign(&message.text, address).await?;

        let credentials = WalletCredentials {
            address: address.clone(),
            message: message.text,
            signature,
            nonce: message.nonce,
        };
        self.complete_wallet_login(tenant, &credentials, target)
            .await
    }

    /// Send a signed wallet bundle to the IAM for verification.
    ///
    /// A returned token redirects with `token=`; a success status without one
    /// redirects with `wallet=` and `signature=` so account linkage finishes
    /// server-side.
    ///
    /// # Errors
    /// Remote rejections carry the server message, transport failures the
    /// generic connection error.
    #[instrument(skip(self, credentials), fields(tenant = %tenant.id))]
    pub async fn complete_wallet_login(
        &self,
        tenant: &TenantConfig,
        credentials: &WalletCredentials,
        target: &RedirectTarget,
    ) -> Result<String, FlowError> {
        let payload = WalletPayload {
            application: &tenant.application_name,
            organization: &tenant.organization_name,
            address: &credentials.address,
            message: &credentials.message,
            signature: &credentials.signature,
            nonce: &credentials.nonce,
            client_id: &target.client_id,
        };

        let response: IamResponse = self
            .http
            .post(format!("{}/api/login/wallet", iam_base(tenant)))
            .json(&payload)
            .send()
            .await?
            .json()
            .await?;

        if let Some(token) = response.access_token {
            return Ok(target.with_token(&token));
        }

        if response.is_ok_status() {
            // Wallet verified but account linkage must complete server-side.
            return Ok(target.with_wallet(&credentials.address, &credentials.signature));
        }

        let msg = response
            .server_message()
            .unwrap_or_else(|| "Wallet authentication failed. Try email login.".to_string());
        error!("wallet login rejected: {msg}");
        Err(FlowError::Rejected(msg))
    }

    /// Form-encoded password-grant exchange at the IAM token endpoint.
    async fn password_grant(
        &self,
        tenant: &TenantConfig,
        client_id: &str,
        username: &str,
        password: &str,
    ) -> Result<IamResponse, FlowError> {
        let client_secret = tenant
            .client_secret
            .as_ref()
            .map(|secret| secret.expose_secret().to_string())
            .unwrap_or_default();

        let params = [
            ("grant_type", "password"),
            ("client_id", client_id),
            ("client_secret", &client_secret),
            ("username", username),
            ("password", password),
            ("scope", redirect::OAUTH_SCOPE),
        ];

        let response = self
            .http
            .post(format!("{}/api/login/oauth/access_token", iam_base(tenant)))
            .form(&params)
            .send()
            .await?
            .json()
            .await?;

        Ok(response)
    }

    fn grant_rejection(response: &IamResponse) -> FlowError {
        if response.error.as_deref() == Some("invalid_grant") {
            return FlowError::Rejected("Invalid email or password".to_string());
        }
        let msg = response
            .error_description
            .clone()
            .or_else(|| response.server_message())
            .unwrap_or_else(|| "Invalid credentials".to_string());
        FlowError::Rejected(msg)
    }
}

fn iam_base(tenant: &TenantConfig) -> &str {
    tenant.iam_url.trim_end_matches('/')
}
