use crate::tenant::{TenantConfig, TenantRegistry};
use axum::{
    extract::{Extension, Host},
    response::Json,
};
use std::sync::Arc;
use tracing::debug;

#[utoipa::path(
    get,
    path = "/api/tenant",
    responses(
        (status = 200, description = "Tenant branding and feature flags for the request host", body = [TenantConfig]),
    ),
    tag = "tenant"
)]
pub async fn tenant(
    Host(host): Host,
    registry: Extension<Arc<TenantRegistry>>,
) -> Json<TenantConfig> {
    let tenant = registry.resolve(&host);
    debug!("host {host} resolved to tenant {}", tenant.id);

    Json(tenant.clone())
}
