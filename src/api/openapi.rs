use super::handlers;
use axum::response::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::tenant::tenant,
        handlers::signup::signup,
        handlers::login::login,
        handlers::social::social,
        handlers::wallet::wallet,
    ),
    components(schemas(
        handlers::ErrorBody,
        handlers::health::Health,
        crate::tenant::TenantConfig,
        crate::tenant::Theme,
        crate::tenant::SocialProvider,
        crate::tenant::ProviderKind,
        crate::flow::SignupForm,
        crate::flow::LoginForm,
        crate::flow::WalletCredentials,
        crate::flow::AuthMethod,
    )),
    tags(
        (name = "health", description = "Liveness and build information"),
        (name = "tenant", description = "Per-hostname tenant branding"),
        (name = "auth", description = "Credential exchange against the tenant IAM"),
    )
)]
struct ApiDoc;

/// The generated document, also exposed at `/openapi.json`.
#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

pub async fn serve() -> Json<utoipa::openapi::OpenApi> {
    Json(openapi())
}
