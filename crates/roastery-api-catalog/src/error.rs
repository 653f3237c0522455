//! Error types for the catalog API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

/// A single field validation error.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Catalog API error variants.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Invalid request format: {0}")]
    InvalidFormat(String),

    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    #[error("Validation failed")]
    Validation { errors: Vec<FieldError> },

    #[error("Product not found")]
    ProductNotFound,

    #[error("Variant not found")]
    VariantNotFound,

    #[error("Price not found")]
    PriceNotFound,

    #[error("A product with this name already exists")]
    DuplicateProduct,

    #[error("Price is referenced by one or more variants")]
    PriceInUse,

    #[error("Referential integrity violated: {0}")]
    ForeignKey(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl CatalogError {
    /// Single-field validation error.
    #[must_use]
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        CatalogError::Validation {
            errors: vec![FieldError {
                field: field.to_string(),
                message: message.into(),
            }],
        }
    }

    fn code(&self) -> &'static str {
        match self {
            CatalogError::InvalidFormat(_) => "INVALID_FORMAT",
            CatalogError::InvalidId(_) => "INVALID_ID_FORMAT",
            CatalogError::Validation { .. } => "VALIDATION_ERROR",
            CatalogError::ProductNotFound => "PRODUCT_NOT_FOUND",
            CatalogError::VariantNotFound => "VARIANT_NOT_FOUND",
            CatalogError::PriceNotFound => "PRICE_NOT_FOUND",
            CatalogError::DuplicateProduct => "DUPLICATE_PRODUCT",
            CatalogError::PriceInUse => "PRICE_IN_USE",
            CatalogError::ForeignKey(_) => "FOREIGN_KEY_CONSTRAINT",
            CatalogError::Forbidden => "FORBIDDEN",
            CatalogError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            CatalogError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            CatalogError::InvalidFormat(_)
            | CatalogError::InvalidId(_)
            | CatalogError::Validation { .. } => StatusCode::BAD_REQUEST,
            CatalogError::ProductNotFound
            | CatalogError::VariantNotFound
            | CatalogError::PriceNotFound => StatusCode::NOT_FOUND,
            CatalogError::DuplicateProduct
            | CatalogError::PriceInUse
            | CatalogError::ForeignKey(_) => StatusCode::CONFLICT,
            CatalogError::Forbidden => StatusCode::FORBIDDEN,
            CatalogError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            CatalogError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for CatalogError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_foreign_key_violation() {
                return CatalogError::ForeignKey(db_err.message().to_string());
            }
        }
        // the database is transiently unreachable or misbehaving; clients
        // should retry rather than treat this as a permanent failure
        CatalogError::ServiceUnavailable(err.to_string())
    }
}

/// Wire shape of an API error.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorEnvelope {
    pub message: String,
    pub code: &'static str,

    #[serde(rename = "validationErrors", skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<Vec<FieldError>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let (message, validation_errors, details) = match self {
            CatalogError::Validation { errors } => {
                ("Validation failed".to_string(), Some(errors), None)
            }
            CatalogError::ServiceUnavailable(detail)
            | CatalogError::Internal(detail) => {
                tracing::error!(code = code, detail = %detail, "Request failed");
                // internal detail stays in the logs
                (
                    match status {
                        StatusCode::SERVICE_UNAVAILABLE => {
                            "Service temporarily unavailable".to_string()
                        }
                        _ => "Internal server error".to_string(),
                    },
                    None,
                    None,
                )
            }
            other => (other.to_string(), None, None),
        };

        let body = ErrorEnvelope {
            message,
            code,
            validation_errors,
            details,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_map_to_expected_statuses() {
        assert_eq!(
            CatalogError::ProductNotFound.status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(CatalogError::DuplicateProduct.status(), StatusCode::CONFLICT);
        assert_eq!(CatalogError::PriceInUse.status(), StatusCode::CONFLICT);
        assert_eq!(
            CatalogError::InvalidId("x".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(CatalogError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            CatalogError::ServiceUnavailable("db".to_string()).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn validation_envelope_carries_field_errors() {
        let err = CatalogError::field("amount", "must be positive");
        let CatalogError::Validation { errors } = &err else {
            panic!("expected validation error");
        };
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "amount");
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }
}
