use crate::{
    api::handlers::{ErrorResponse, error_body, flow_error_response},
    flow::{RedirectQuery, RedirectTarget, ResponseType, redirect},
    tenant::TenantRegistry,
};
use axum::{
    extract::{Extension, Host, Path, Query},
    http::StatusCode,
    response::Redirect,
};
use std::sync::Arc;
use tracing::{debug, instrument};

#[utoipa::path(
    get,
    path = "/api/social/{provider}",
    params(
        ("provider" = String, Path, description = "Configured social provider id"),
    ),
    responses(
        (status = 303, description = "Redirect into the IAM authorize endpoint with a provider hint"),
        (status = 404, description = "Provider is not configured for this tenant", body = [super::ErrorBody]),
    ),
    tag = "auth"
)]
#[instrument(skip(registry))]
pub async fn social(
    Host(host): Host,
    Path(provider): Path<String>,
    query: Query<RedirectQuery>,
    registry: Extension<Arc<TenantRegistry>>,
) -> Result<Redirect, ErrorResponse> {
    let tenant = registry.resolve(&host);

    let Some(provider) = tenant.social_provider(&provider) else {
        return Err((StatusCode::NOT_FOUND, error_body("Unknown provider")));
    };
    debug!("social login via {} for tenant {}", provider.id, tenant.id);

    let target = RedirectTarget::from_query(&query, tenant);

    // The OAuth dance goes through the IAM so the upstream callback URL
    // matches what is registered with Google/GitHub/Facebook.
    let url = redirect::authorize_url(tenant, &target, ResponseType::Code, Some(&provider.id))
        .map_err(|err| flow_error_response(&err))?;

    Ok(Redirect::to(url.as_str()))
}
