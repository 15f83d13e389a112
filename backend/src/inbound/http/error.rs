//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while allowing Actix
//! handlers to turn domain failures into consistent JSON responses and
//! status codes.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use tracing::error;

use crate::domain::{Error, ErrorCode};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact_if_internal(error: &Error) -> Error {
    if matches!(error.code(), ErrorCode::InternalError) {
        Error::internal("Internal server error")
    } else {
        error.clone()
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(redact_if_internal(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        // Do not leak implementation details to clients.
        error!(error = %err, "actix error promoted to domain error");
        Error::internal("Internal server error")
    }
}

#[cfg(test)]
mod tests {
    //! Tests for error response status mapping and redaction.

    use actix_web::body::to_bytes;
    use rstest::rstest;
    use serde_json::{json, Value};

    use super::*;

    #[rstest]
    #[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
    #[case(Error::unauthorized("no auth"), StatusCode::UNAUTHORIZED)]
    #[case(Error::forbidden("denied"), StatusCode::FORBIDDEN)]
    #[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
    #[case(Error::conflict("exists"), StatusCode::CONFLICT)]
    #[case(Error::rate_limited("slow down"), StatusCode::TOO_MANY_REQUESTS)]
    #[case(Error::service_unavailable("later"), StatusCode::SERVICE_UNAVAILABLE)]
    #[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
    fn status_code_matches_error_code(#[case] error: Error, #[case] status: StatusCode) {
        assert_eq!(error.status_code(), status);
    }

    #[actix_web::test]
    async fn internal_errors_are_redacted() {
        let error = Error::internal("secret pool details").with_details(json!({"dsn": "x"}));
        let response = error.error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = to_bytes(response.into_body()).await.expect("body reads");
        let value: Value = serde_json::from_slice(&bytes).expect("error payload");
        assert_eq!(
            value.get("message").and_then(Value::as_str),
            Some("Internal server error")
        );
        assert!(value.get("details").is_none(), "details must be dropped");
    }

    #[actix_web::test]
    async fn client_errors_keep_message_and_details() {
        let error = Error::conflict("recipe is already in favorites")
            .with_details(json!({"recipeId": 7}));
        let response = error.error_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let bytes = to_bytes(response.into_body()).await.expect("body reads");
        let value: Value = serde_json::from_slice(&bytes).expect("error payload");
        assert_eq!(
            value.get("message").and_then(Value::as_str),
            Some("recipe is already in favorites")
        );
        assert_eq!(value["details"]["recipeId"], 7);
    }
}
