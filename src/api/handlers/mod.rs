//! Route handlers for the portal API.
//!
//! Handlers are thin: resolve the tenant from the `Host` header, derive the
//! redirect target from the query string, run the flow, and answer either a
//! `303 See Other` or a `{status: "error", msg}` body whose status code maps
//! the flow taxonomy.

pub mod health;
pub mod login;
pub mod root;
pub mod signup;
pub mod social;
pub mod tenant;
pub mod wallet;

use crate::flow::FlowError;
use axum::{Json, http::StatusCode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error body shown by the form UI.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ErrorBody {
    pub status: String,
    pub msg: String,
}

pub type ErrorResponse = (StatusCode, Json<ErrorBody>);

/// Map a flow failure to an HTTP response carrying the user-facing message.
#[must_use]
pub fn flow_error_response(err: &FlowError) -> ErrorResponse {
    let status = match err {
        FlowError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        FlowError::Rejected(_) => StatusCode::UNAUTHORIZED,
        FlowError::Network(_) | FlowError::Wallet(_) => StatusCode::BAD_GATEWAY,
        FlowError::CapabilityMissing(_) | FlowError::Cancelled => StatusCode::BAD_REQUEST,
    };
    (status, error_body(err.user_message()))
}

pub fn error_body(msg: impl Into<String>) -> Json<ErrorBody> {
    Json(ErrorBody {
        status: "error".to_string(),
        msg: msg.into(),
    })
}

/// A feature flag turned the requested flow off for this tenant.
#[must_use]
pub fn feature_disabled(msg: &str) -> ErrorResponse {
    (StatusCode::FORBIDDEN, error_body(msg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_status_codes() {
        let (status, body) =
            flow_error_response(&FlowError::Validation("Passwords do not match".to_string()));
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.0.status, "error");
        assert_eq!(body.0.msg, "Passwords do not match");

        let (status, _) =
            flow_error_response(&FlowError::Rejected("Invalid credentials".to_string()));
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = flow_error_response(&FlowError::Cancelled);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.0.msg, "Wallet connection cancelled");
    }
}
