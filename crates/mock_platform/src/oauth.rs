use crate::store::{Operation, PlatformState, RecordedRequest};
use axum::Json;
use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Form body of a token request
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub grant_type: String,

    #[serde(default)]
    pub refresh_token: Option<String>,

    #[serde(default)]
    pub client_id: Option<String>,

    #[serde(default)]
    pub client_secret: Option<String>,
}

/// Google OAuth2 token response
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub scope: String,
}

/// Google OAuth2 error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

const GRANTED_SCOPE: &str = "https://www.googleapis.com/auth/youtube.force-ssl";

pub(crate) async fn token_handler(
    State(state): State<Arc<PlatformState>>,
    Form(request): Form<TokenRequest>,
) -> Response {
    let mut fields = HashMap::from([("grant_type".to_string(), request.grant_type.clone())]);
    for (key, value) in [
        ("refresh_token", &request.refresh_token),
        ("client_id", &request.client_id),
        ("client_secret", &request.client_secret),
    ] {
        if let Some(value) = value {
            fields.insert(key.to_string(), value.clone());
        }
    }
    state.record(RecordedRequest {
        operation: Operation::Token,
        query: fields,
        authorization: None,
        body: None,
    });

    if let Some(fault) = state.fault(Operation::Token) {
        return crate::videos::fault_response(fault);
    }

    if request.grant_type != "refresh_token" {
        return oauth_error(
            StatusCode::BAD_REQUEST,
            "unsupported_grant_type",
            format!("Grant type '{}' is not supported", request.grant_type),
        );
    }

    match request.refresh_token.as_deref() {
        Some(crate::SEED_REFRESH_TOKEN) => {}
        Some(_) => {
            return oauth_error(
                StatusCode::BAD_REQUEST,
                "invalid_grant",
                "Token has been expired or revoked.".to_string(),
            );
        }
        None => {
            return oauth_error(
                StatusCode::BAD_REQUEST,
                "invalid_request",
                "The 'refresh_token' parameter is required".to_string(),
            );
        }
    }

    let access_token = format!("ya29.mock_{}", uuid::Uuid::new_v4());
    state.issue_token(&access_token);

    let response = TokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: 3599,
        scope: GRANTED_SCOPE.to_string(),
    };
    (StatusCode::OK, Json(response)).into_response()
}

fn oauth_error(status: StatusCode, error: &str, description: String) -> Response {
    let body = ErrorResponse {
        error: error.to_string(),
        error_description: Some(description),
    };
    (status, Json(body)).into_response()
}
