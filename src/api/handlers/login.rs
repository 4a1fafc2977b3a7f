use crate::{
    api::handlers::{ErrorResponse, feature_disabled, flow_error_response},
    flow::{AuthClient, AuthMethod, LoginForm, RedirectQuery, RedirectTarget},
    tenant::TenantRegistry,
};
use axum::{
    Form,
    extract::{Extension, Host, Query},
    response::Redirect,
};
use std::sync::Arc;
use tracing::instrument;

#[utoipa::path(
    post,
    path = "/api/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Authenticated; redirect carries a bearer token"),
        (status = 401, description = "The IAM rejected the credentials", body = [super::ErrorBody]),
        (status = 403, description = "The chosen method is disabled for this tenant", body = [super::ErrorBody]),
    ),
    tag = "auth"
)]
#[instrument(skip(registry, client, form))]
pub async fn login(
    Host(host): Host,
    query: Query<RedirectQuery>,
    registry: Extension<Arc<TenantRegistry>>,
    client: Extension<AuthClient>,
    Form(form): Form<LoginForm>,
) -> Result<Redirect, ErrorResponse> {
    let tenant = registry.resolve(&host);

    let enabled = match form.method {
        AuthMethod::Password => tenant.enable_password_login,
        AuthMethod::Code => tenant.enable_code_login,
        AuthMethod::WebAuthn => tenant.enable_webauthn,
        AuthMethod::FaceId => tenant.enable_face_id,
    };
    if !enabled {
        return Err(feature_disabled(
            "This login method is disabled for this tenant",
        ));
    }

    let target = RedirectTarget::from_query(&query, tenant);

    client
        .login(tenant, &form, &target)
        .await
        .map(|location| Redirect::to(&location))
        .map_err(|err| flow_error_response(&err))
}
