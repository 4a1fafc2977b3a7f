//! HTTP surface of the portal.
//!
//! The router is one flat axum tree behind request-id, trace, and CORS
//! layers. All state is immutable: the tenant registry and the IAM client go
//! in as extensions and nothing else is shared.

use crate::{flow::AuthClient, tenant::TenantRegistry};
use anyhow::Result;
use axum::{
    Extension, Router,
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Method, Request, header::CONTENT_TYPE},
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{Span, info, info_span};
use ulid::Ulid;

pub(crate) mod handlers;
mod openapi;

pub use openapi::openapi;

/// Build the portal router with all routes and layers.
#[must_use]
pub fn router(registry: Arc<TenantRegistry>, client: AuthClient) -> Router {
    // The portal answers fetches from any tenant domain; no credentials are
    // involved, redirect locations carry everything.
    let cors = CorsLayer::new()
        .allow_headers([CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(Any);

    Router::new()
        .route("/", get(handlers::root::root))
        .route(
            "/health",
            get(handlers::health::health).options(handlers::health::health),
        )
        .route("/openapi.json", get(openapi::serve))
        .route("/api/tenant", get(handlers::tenant::tenant))
        .route("/api/signup", post(handlers::signup::signup))
        .route("/api/login", post(handlers::login::login))
        .route("/api/social/:provider", get(handlers::social::social))
        .route("/api/wallet", post(handlers::wallet::wallet))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(Extension(registry))
                .layer(Extension(client)),
        )
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, registry: TenantRegistry, client: AuthClient) -> Result<()> {
    info!(
        "Serving {} tenants, default: {}",
        registry.len(),
        registry.default_tenant().id
    );

    let app = router(Arc::new(registry), client);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::DEFAULT_REQUEST_TIMEOUT;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use std::net::TcpListener as StdTcpListener;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        StdTcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn app() -> Router {
        router(
            Arc::new(TenantRegistry::builtin()),
            AuthClient::new(DEFAULT_REQUEST_TIMEOUT).expect("client"),
        )
    }

    fn app_with_iam(iam_url: &str) -> Router {
        let mut tenant = TenantRegistry::builtin().default_tenant().clone();
        tenant.iam_url = iam_url.to_string();
        let registry = TenantRegistry::new(vec![tenant], "hanzo").expect("registry");
        router(
            Arc::new(registry),
            AuthClient::new(DEFAULT_REQUEST_TIMEOUT).expect("client"),
        )
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.expect("body").to_bytes();
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn health_reports_build_info_and_x_app_header() {
        let response = app()
            .oneshot(
                Request::get("/health")
                    .header(header::HOST, "localhost")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("X-App"));
        assert!(response.headers().contains_key("x-request-id"));

        let body = body_json(response).await;
        assert_eq!(body["name"], env!("CARGO_PKG_NAME"));
        assert_eq!(body["tenants"], 3);
    }

    #[tokio::test]
    async fn tenant_endpoint_brands_by_host() {
        let response = app()
            .oneshot(
                Request::get("/api/tenant")
                    .header(header::HOST, "login.lux.id")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["displayName"], "Lux");
        assert!(body.get("clientSecret").is_none());
    }

    #[tokio::test]
    async fn signup_validation_answers_422_with_message() {
        let form = "name=Alice&email=alice%40example.com\
                    &password=hunter2hunter2&confirm_password=different";
        let response = app()
            .oneshot(
                Request::post("/api/signup")
                    .header(header::HOST, "hanzo.ai")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(form))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["msg"], "Passwords do not match");
    }

    #[tokio::test]
    async fn login_redirects_with_token_from_mocked_iam() {
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

        let form = "method=password&identifier=alice%40example.com&password=hunter2hunter2";
        let response = app_with_iam(&server.uri())
            .oneshot(
                Request::post("/api/login?redirect_uri=https://app.example.com/cb")
                    .header(header::HOST, "hanzo.ai")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(form))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response
                .headers()
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok()),
            Some("https://app.example.com/cb?token=T")
        );
    }

    #[tokio::test]
    async fn social_login_redirects_into_authorize_endpoint() {
        let response = app()
            .oneshot(
                Request::get("/api/social/github?redirect_uri=https://app.example.com/cb")
                    .header(header::HOST, "hanzo.ai")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .expect("location");
        assert!(location.starts_with("https://iam.hanzo.ai/login/oauth/authorize?"));
        assert!(location.contains("provider=github"));
        assert!(location.contains("response_type=code"));
    }

    #[tokio::test]
    async fn unknown_social_provider_is_404() {
        let response = app()
            .oneshot(
                Request::get("/api/social/myspace")
                    .header(header::HOST, "hanzo.ai")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["msg"], "Unknown provider");
    }

    #[tokio::test]
    async fn wallet_login_gated_by_tenant_flag() {
        // pars has enable_wallet = false
        let credentials = json!({
            "address": "0xabc",
            "message": "Sign in to Pars",
            "signature": "0xsig",
            "nonce": "n",
        });
        let response = app()
            .oneshot(
                Request::post("/api/wallet")
                    .header(header::HOST, "pars.id")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(credentials.to_string()))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = body_json(response).await;
        assert_eq!(body["msg"], "Wallet login is disabled for this tenant");
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let response = app()
            .oneshot(
                Request::get("/openapi.json")
                    .header(header::HOST, "localhost")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["paths"].get("/api/login").is_some());
    }
}
