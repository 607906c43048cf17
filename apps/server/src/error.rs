use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use marketmind_market_data::MarketDataError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            ApiError::NotFound(reason) => (StatusCode::NOT_FOUND, reason),
            ApiError::BadRequest(reason) => (StatusCode::BAD_REQUEST, reason),
        };
        tracing::debug!("Request rejected ({}): {}", status, msg);
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: msg,
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<MarketDataError> for ApiError {
    fn from(err: MarketDataError) -> Self {
        match err {
            MarketDataError::UnknownSymbol(_) => ApiError::NotFound(err.to_string()),
            MarketDataError::InvalidParameter { .. } | MarketDataError::DuplicateSymbol(_) => {
                ApiError::BadRequest(err.to_string())
            }
        }
    }
}
