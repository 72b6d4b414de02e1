use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use transit_core::TransitError;

#[derive(Debug)]
pub enum AppError {
    Domain(TransitError),
    Anyhow(anyhow::Error),
}

impl From<TransitError> for AppError {
    fn from(err: TransitError) -> Self {
        Self::Domain(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Anyhow(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Domain(err) => match &err {
                TransitError::Validation(_) => {
                    (StatusCode::BAD_REQUEST, json!({ "error": err.to_string() }))
                }
                TransitError::NotFound(_) => {
                    (StatusCode::NOT_FOUND, json!({ "error": err.to_string() }))
                }
                TransitError::Conflict(_) => {
                    (StatusCode::CONFLICT, json!({ "error": err.to_string() }))
                }
                TransitError::Forbidden(_) => {
                    (StatusCode::FORBIDDEN, json!({ "error": err.to_string() }))
                }
                TransitError::PendingCheckout { seats } => (
                    StatusCode::CONFLICT,
                    json!({ "error": err.to_string(), "blocking_seats": seats }),
                ),
                TransitError::Upstream(_) => {
                    tracing::error!("Upstream failure: {}", err);
                    (StatusCode::BAD_GATEWAY, json!({ "error": err.to_string() }))
                }
                TransitError::Internal(msg) => {
                    tracing::error!("Internal Server Error: {}", msg);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        json!({ "error": "Internal Server Error" }),
                    )
                }
            },
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal Server Error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
