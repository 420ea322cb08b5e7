use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use realty_core::{i18n, Locale, RealtyError, ValidationErrors};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Realty(#[from] RealtyError),

    #[error("Validation failed: {errors}")]
    Validation {
        errors: ValidationErrors,
        locale: Locale,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Too many login attempts, try again later")]
    TooManyRequests,

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn invalid(errors: ValidationErrors, locale: Locale) -> Self {
        Self::Validation { errors, locale }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Realty(err) => match err {
                RealtyError::NotFound { .. } => StatusCode::NOT_FOUND,
                RealtyError::Conflict(_) => StatusCode::CONFLICT,
                RealtyError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                RealtyError::InvalidOperation(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Attaches the request locale to field errors so their messages render in
/// the visitor's language.
pub trait Localize<T> {
    fn localized(self, locale: Locale) -> ApiResult<T>;
}

impl<T> Localize<T> for Result<T, ValidationErrors> {
    fn localized(self, locale: Locale) -> ApiResult<T> {
        self.map_err(|errors| ApiError::invalid(errors, locale))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

fn field_errors(errors: &ValidationErrors, locale: Locale) -> serde_json::Value {
    errors
        .iter()
        .map(|e| {
            json!({
                "field": e.field,
                "code": e.code,
                "message": e.message(locale),
            })
        })
        .collect()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (message, fields) = match &self {
            ApiError::Validation { errors, locale } => (
                i18n::t(*locale, "error.validation").to_string(),
                Some(field_errors(errors, *locale)),
            ),
            ApiError::Realty(RealtyError::Validation(errors)) => (
                i18n::t(Locale::default(), "error.validation").to_string(),
                Some(field_errors(errors, Locale::default())),
            ),
            _ if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE => {
                // Backend details stay in the log.
                error!(error = %self, "Request failed");
                ("Internal server error".to_string(), None)
            }
            _ => (self.to_string(), None),
        };

        let mut body = json!({
            "error": message,
            "status": status.as_u16()
        });
        if let Some(fields) = fields {
            body["fields"] = fields;
        }

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use realty_core::FieldError;

    #[test]
    fn core_errors_map_to_http_status() {
        let not_found: ApiError = RealtyError::not_found("Listing", "x").into();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        let conflict: ApiError = RealtyError::Conflict("slug".into()).into();
        assert_eq!(conflict.status(), StatusCode::CONFLICT);
        let db: ApiError = RealtyError::Database("down".into()).into();
        assert_eq!(db.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn validation_errors_are_localized() {
        let mut errors = ValidationErrors::default();
        errors.push(FieldError::new("email", "validation.email"));
        let result: Result<(), _> = Err(errors);
        let err = result.localized(Locale::En).unwrap_err();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
