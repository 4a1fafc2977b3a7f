use crate::{
    api::handlers::{ErrorResponse, feature_disabled, flow_error_response},
    flow::{AuthClient, RedirectQuery, RedirectTarget, WalletCredentials},
    tenant::TenantRegistry,
};
use axum::{
    Json,
    extract::{Extension, Host, Query},
    response::Redirect,
};
use std::sync::Arc;
use tracing::instrument;

#[utoipa::path(
    post,
    path = "/api/wallet",
    request_body = WalletCredentials,
    responses(
        (status = 303, description = "Wallet verified; redirect carries a token or a wallet linkage"),
        (status = 401, description = "The IAM rejected the signature", body = [super::ErrorBody]),
        (status = 403, description = "Wallet login is disabled for this tenant", body = [super::ErrorBody]),
    ),
    tag = "auth"
)]
#[instrument(skip(registry, client, credentials))]
pub async fn wallet(
    Host(host): Host,
    query: Query<RedirectQuery>,
    registry: Extension<Arc<TenantRegistry>>,
    client: Extension<AuthClient>,
    Json(credentials): Json<WalletCredentials>,
) -> Result<Redirect, ErrorResponse> {
    let tenant = registry.resolve(&host);
    if !tenant.enable_wallet {
        return Err(feature_disabled("Wallet login is disabled for this tenant"));
    }

    let target = RedirectTarget::from_query(&query, tenant);

    client
        .complete_wallet_login(tenant, &credentials, &target)
        .await
        .map(|location| Redirect::to(&location))
        .map_err(|err| flow_error_response(&err))
}
