//! # API Error Type
//!
//! Every handler returns `Result<_, ApiError>`. Lower-layer errors convert
//! with `?`; the response body is always
//!
//! ```json
//! { "code": "OUT_OF_STOCK", "message": "Prawn Fry is out of stock (25 available)" }
//! ```
//!
//! ## Status Mapping
//! ```text
//! ValidationError / bad input   → 400 VALIDATION_ERROR
//! missing or bad token          → 401 UNAUTHORIZED
//! role lacks capability         → 403 FORBIDDEN
//! unknown id                    → 404 NOT_FOUND
//! duplicate username            → 409 CONFLICT
//! stock / cart rule violation   → 422 (OUT_OF_STOCK, TERMINAL_LOCKED, ...)
//! database failure              → 500 DATABASE_ERROR (details only in logs)
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use stockhub_core::{CoreError, ValidationError};
use stockhub_db::DbError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    OutOfStock,
    TerminalLocked,
    /// Distribution or master stock adjustment outside the allowed range.
    StockLimit,
    /// Cart rule violation (empty, too large, not in cart, settling).
    CartError,
    DatabaseError,
    Internal,
}

impl ApiError {
    pub fn new(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            StatusCode::NOT_FOUND,
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, ErrorCode::ValidationError, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::FORBIDDEN, ErrorCode::Forbidden, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Internal, message)
    }

    fn unprocessable(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, code, message)
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                StatusCode::CONFLICT,
                ErrorCode::Conflict,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::warn!("Foreign key violation: {}", message);
                ApiError::validation("Invalid reference")
            }
            DbError::ConstraintViolation(message) => {
                tracing::warn!("Constraint violation: {}", message);
                ApiError::validation("Value rejected by a database constraint")
            }
            DbError::ConnectionFailed(e) | DbError::MigrationFailed(e) => {
                tracing::error!("Database unavailable: {}", e);
                ApiError::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorCode::DatabaseError,
                    "Database unavailable",
                )
            }
            DbError::PoolExhausted => ApiError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorCode::DatabaseError,
                "Database busy, try again",
            ),
            DbError::QueryFailed(e) | DbError::Internal(e) => {
                tracing::error!("Database operation failed: {}", e);
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DatabaseError,
                    "Database operation failed",
                )
            }
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::MenuItemNotFound(id) => ApiError::not_found("Menu item", &id),
            CoreError::Forbidden(_) => ApiError::forbidden(message),
            CoreError::Validation(e) => e.into(),
            CoreError::OutOfStock { .. } | CoreError::ItemInactive(_) => {
                ApiError::unprocessable(ErrorCode::OutOfStock, message)
            }
            CoreError::TerminalLocked(_) => ApiError::unprocessable(ErrorCode::TerminalLocked, message),
            CoreError::DistributionExceedsMaster { .. }
            | CoreError::NoMasterStock { .. }
            | CoreError::NegativeOutletBalance { .. } => {
                ApiError::unprocessable(ErrorCode::StockLimit, message)
            }
            CoreError::EmptyCart
            | CoreError::ItemNotInCart(_)
            | CoreError::InvalidSessionState { .. }
            | CoreError::CartTooLarge { .. }
            | CoreError::QuantityTooLarge { .. } => {
                ApiError::unprocessable(ErrorCode::CartError, message)
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

pub type ApiResult<T> = Result<T, ApiError>;
