use crate::{
    api::handlers::{ErrorResponse, feature_disabled, flow_error_response},
    flow::{AuthClient, RedirectQuery, RedirectTarget, SignupForm},
    tenant::TenantRegistry,
};
use axum::{
    Form,
    extract::{Extension, Host, Query, RawQuery},
    response::Redirect,
};
use std::sync::Arc;
use tracing::instrument;

#[utoipa::path(
    post,
    path = "/api/signup",
    request_body(content = SignupForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Account created; redirect carries a token or returns to the login page"),
        (status = 403, description = "Signup is disabled for this tenant", body = [super::ErrorBody]),
        (status = 422, description = "Local validation failed", body = [super::ErrorBody]),
    ),
    tag = "auth"
)]
#[instrument(skip(registry, client, form))]
pub async fn signup(
    Host(host): Host,
    query: Query<RedirectQuery>,
    RawQuery(raw_query): RawQuery,
    registry: Extension<Arc<TenantRegistry>>,
    client: Extension<AuthClient>,
    Form(form): Form<SignupForm>,
) -> Result<Redirect, ErrorResponse> {
    let tenant = registry.resolve(&host);
    if !tenant.enable_signup {
        return Err(feature_disabled("Signup is disabled for this tenant"));
    }

    let target = RedirectTarget::from_query(&query, tenant);
    // Send failed auto-logins back to the login page with the original query.
    let login_fallback = match raw_query {
        Some(raw) if !raw.is_empty() => format!("/login?{raw}"),
        _ => "/login".to_string(),
    };

    client
        .signup(tenant, &form, &target, &login_fallback)
        .await
        .map(|location| Redirect::to(&location))
        .map_err(|err| flow_error_response(&err))
}
