use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::*;
use serde::Serialize;
use utoipa::ToSchema;

use domain::error::{
    DomainErrorKind, Error as DomainError, ExternalErrorKind, InternalErrorKind, RequestErrorKind,
};

#[derive(Debug)]
pub struct Error(DomainError);

/// JSON body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

impl Error {
    fn status_and_message(&self) -> (StatusCode, String) {
        match &self.0.error_kind {
            DomainErrorKind::Request(request_error_kind) => match request_error_kind {
                RequestErrorKind::InvalidState => {
                    (StatusCode::BAD_REQUEST, "Invalid state parameter".to_string())
                }
                RequestErrorKind::MissingCode => (
                    StatusCode::BAD_REQUEST,
                    "Authorization code not provided".to_string(),
                ),
            },
            DomainErrorKind::External(ExternalErrorKind::Provider(description)) => {
                (StatusCode::BAD_REQUEST, description.clone())
            }
            DomainErrorKind::Internal(InternalErrorKind::Config(message)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, message.clone())
            }
            // Upstream details stay in the server log.
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            error!("Request failed: {:?}", self.0);
        }
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl<E> From<E> for Error
where
    E: Into<DomainError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn web_error(error_kind: DomainErrorKind) -> Error {
        Error(DomainError {
            source: None,
            error_kind,
        })
    }

    #[test]
    fn test_request_errors_are_bad_requests() {
        let (status, message) =
            web_error(DomainErrorKind::Request(RequestErrorKind::InvalidState)).status_and_message();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "Invalid state parameter");

        let (status, message) =
            web_error(DomainErrorKind::Request(RequestErrorKind::MissingCode)).status_and_message();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "Authorization code not provided");
    }

    #[test]
    fn test_provider_description_is_passed_through() {
        let (status, message) = web_error(DomainErrorKind::External(
            ExternalErrorKind::Provider("The code passed is incorrect or expired.".to_string()),
        ))
        .status_and_message();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "The code passed is incorrect or expired.");
    }

    #[test]
    fn test_upstream_details_are_hidden() {
        for kind in [
            DomainErrorKind::External(ExternalErrorKind::Network),
            DomainErrorKind::External(ExternalErrorKind::Other("user endpoint returned 401".to_string())),
            DomainErrorKind::Internal(InternalErrorKind::Other("boom".to_string())),
        ] {
            let (status, message) = web_error(kind).status_and_message();
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(message, "Internal server error");
        }
    }

    #[test]
    fn test_config_error_message_is_reported() {
        let (status, message) = Error::from(DomainError::config("GitHub Client ID not configured"))
            .status_and_message();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "GitHub Client ID not configured");
    }
}
