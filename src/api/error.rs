use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::core::ProviderError;

/// Request-level failures. Only provider failures reach clients; missing
/// fields inside a successful fetch never do.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Failed to fetch market snapshot")]
    Snapshot(#[source] ProviderError),
    #[error("Failed to fetch history for {symbol}")]
    History {
        symbol: String,
        #[source]
        source: ProviderError,
    },
}

impl ApiError {
    fn details(&self) -> String {
        match self {
            ApiError::Snapshot(source) => source.to_string(),
            ApiError::History { source, .. } => source.to_string(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    details: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
            details: self.details(),
        };
        error!(error = %body.error, details = %body.details, "Request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn test_error_body_shape() {
        let err = ApiError::History {
            symbol: "AAPL".to_string(),
            source: ProviderError::InvalidUrl {
                url: "bad".to_string(),
            },
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "error": "Failed to fetch history for AAPL",
                "details": "Invalid provider URL: bad"
            })
        );
    }
}
