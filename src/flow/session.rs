//! Ephemeral per-page submission state.
//!
//! An [`AuthSession`] lives only as long as the surface that created it:
//! fields mutate as the user types and the whole thing is discarded on
//! navigation (successful flows end in a full-page redirect). One submission
//! at a time: starting a new one while a request is outstanding is refused
//! instead of racing it.

use crate::{
    flow::{AuthClient, LoginForm, RedirectTarget, SignupForm},
    tenant::TenantConfig,
};
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(ToSchema, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuthMethod {
    #[default]
    Password,
    Code,
    #[serde(rename = "webauthn")]
    WebAuthn,
    #[serde(rename = "faceid")]
    FaceId,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthMode {
    #[default]
    Login,
    Signup,
}

/// Submission lifecycle:
/// `Idle -> InFlight -> Redirecting` with `Failed` exits back to resubmit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Idle,
    InFlight,
    Failed(String),
    Redirecting(String),
}

#[derive(Debug, Default)]
pub struct AuthSession {
    pub mode: AuthMode,
    pub method: AuthMethod,
    /// Email or phone number.
    pub identifier: String,
    pub password: String,
    pub confirm_password: String,
    pub name: String,
    pub code: String,
    status: SessionStatus,
}

impl AuthSession {
    #[must_use]
    pub fn new(mode: AuthMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.status == SessionStatus::InFlight
    }

    /// Try to start a submission. Refused while one is outstanding, so a
    /// double-click cannot race two requests.
    pub fn begin(&mut self) -> bool {
        if self.is_loading() {
            return false;
        }
        self.status = SessionStatus::InFlight;
        true
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = SessionStatus::Failed(message.into());
    }

    pub fn redirect(&mut self, location: impl Into<String>) {
        self.status = SessionStatus::Redirecting(location.into());
    }

    /// Drive one submission through the flow for this session's mode and
    /// method. Returns the resulting status; a submission attempted while
    /// another is in flight leaves the state untouched.
    pub async fn submit(
        &mut self,
        client: &AuthClient,
        tenant: &TenantConfig,
        target: &RedirectTarget,
        login_fallback: &str,
    ) -> &SessionStatus {
        if !self.begin() {
            return &self.status;
        }

        let result = match self.mode {
            AuthMode::Signup => {
                let form = SignupForm {
                    name: self.name.clone(),
                    email: self.identifier.clone(),
                    password: self.password.clone(),
                    confirm_password: self.confirm_password.clone(),
                };
                client.signup(tenant, &form, target, login_fallback).await
            }
            AuthMode::Login => {
                let form = LoginForm {
                    method: self.method,
                    identifier: self.identifier.clone(),
                    password: Some(self.password.clone()),
                    code: Some(self.code.clone()),
                };
                client.login(tenant, &form, target).await
            }
        };

        match result {
            Ok(location) => self.redirect(location),
            Err(err) => self.fail(err.user_message()),
        }
        &self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{flow::DEFAULT_REQUEST_TIMEOUT, tenant::TenantRegistry};
    use serde_json::json;
    use std::net::TcpListener;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    #[test]
    fn begin_guards_against_double_submission() {
        let mut session = AuthSession::new(AuthMode::Login);
        assert!(session.begin());
        assert!(session.is_loading());
        assert!(!session.begin(), "second submission must be refused");

        session.fail("Invalid credentials");
        assert_eq!(
            session.status(),
            &SessionStatus::Failed("Invalid credentials".to_string())
        );
        // Failure clears the in-flight guard so the user can resubmit.
        assert!(session.begin());
    }

    #[test]
    fn method_deserializes_from_form_values() {
        for (raw, expected) in [
            ("password", AuthMethod::Password),
            ("code", AuthMethod::Code),
            ("webauthn", AuthMethod::WebAuthn),
            ("faceid", AuthMethod::FaceId),
        ] {
            let parsed: AuthMethod =
                serde_json::from_value(json!(raw)).expect("method parses");
            assert_eq!(parsed, expected);
        }
    }

    #[tokio::test]
    async fn submit_drives_a_login_to_redirecting() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/login/oauth/access_token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"access_token": "T"})),
            )
            .mount(&server)
            .await;

        let mut tenant = TenantRegistry::builtin().default_tenant().clone();
        tenant.iam_url = server.uri();
        let client = AuthClient::new(DEFAULT_REQUEST_TIMEOUT).expect("client");
        let target = RedirectTarget {
            redirect_uri: "https://app.example.com/cb".to_string(),
            client_id: "client-1".to_string(),
        };

        let mut session = AuthSession::new(AuthMode::Login);
        session.identifier = "alice@example.com".to_string();
        session.password = "hunter2hunter2".to_string();

        let status = session.submit(&client, &tenant, &target, "/login").await;
        assert_eq!(
            status,
            &SessionStatus::Redirecting("https://app.example.com/cb?token=T".to_string())
        );
    }

    #[tokio::test]
    async fn submit_failure_surfaces_message_and_allows_retry() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/login/oauth/access_token"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"error": "invalid_grant"})),
            )
            .mount(&server)
            .await;

        let mut tenant = TenantRegistry::builtin().default_tenant().clone();
        tenant.iam_url = server.uri();
        let client = AuthClient::new(DEFAULT_REQUEST_TIMEOUT).expect("client");
        let target = RedirectTarget {
            redirect_uri: "https://app.example.com/cb".to_string(),
            client_id: "client-1".to_string(),
        };

        let mut session = AuthSession::new(AuthMode::Login);
        session.identifier = "alice@example.com".to_string();
        session.password = "wrong".to_string();

        let status = session.submit(&client, &tenant, &target, "/login").await;
        assert_eq!(
            status,
            &SessionStatus::Failed("Invalid email or password".to_string())
        );
        assert!(session.begin(), "failed session must accept a resubmit");
    }
}
