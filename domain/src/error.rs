//! Error types for the `domain` layer.
use provider_auth::error::{
    Error as ProviderAuthError, ErrorKind as ProviderAuthErrorKind, OAuthErrorKind,
};
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure
/// with `domain::error::Error` as the root type holding a tree of `error_kind`
/// enums that represent the kinds of errors that can occur in the domain layer or
/// in lower layers. The `source` field is used to hold the original error that caused
/// the domain error. `web` depends on `domain` but never on `provider-auth` error
/// types directly; it maps the `error_kind`s to HTTP status codes and messages.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
    Request(RequestErrorKind),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    /// A required setting is missing. Holds a message naming it.
    Config(String),
    Other(String),
}

/// Enum representing the various kinds of external errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    Network,
    /// The OAuth provider refused the request. Holds the provider's own description.
    Provider(String),
    /// A conditional write was rejected because the stored revision moved on.
    Conflict,
    Other(String),
}

/// Enum representing problems with the incoming callback request itself.
#[derive(Debug, PartialEq)]
pub enum RequestErrorKind {
    InvalidState,
    MissingCode,
}

impl Error {
    pub fn config(message: &str) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Config(message.to_string())),
        }
    }

    pub fn is_conflict(&self) -> bool {
        self.error_kind == DomainErrorKind::External(ExternalErrorKind::Conflict)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Domain Error: {self:?}")
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// This is where we translate errors from the `provider-auth` layer to the `domain` layer.
impl From<ProviderAuthError> for Error {
    fn from(err: ProviderAuthError) -> Self {
        let error_kind = match &err.error_kind {
            ProviderAuthErrorKind::OAuth(OAuthErrorKind::InvalidState) => {
                DomainErrorKind::Request(RequestErrorKind::InvalidState)
            }
            ProviderAuthErrorKind::OAuth(OAuthErrorKind::ProviderRejected(description)) => {
                DomainErrorKind::External(ExternalErrorKind::Provider(description.clone()))
            }
            ProviderAuthErrorKind::OAuth(_) => {
                DomainErrorKind::External(ExternalErrorKind::Other("OAuth error".to_string()))
            }
            ProviderAuthErrorKind::Http(_) => DomainErrorKind::External(ExternalErrorKind::Network),
        };
        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // Errors that result from issues building the reqwest::Client instance. This
        // type of error will occur prior to any network calls being made.
        if err.is_builder() {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                    "Failed to build reqwest client".to_string(),
                )),
            }
        // Errors that result from issues with the network call itself.
        } else {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
            }
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                "Invalid JSON document".to_string(),
            )),
        }
    }
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::External(ExternalErrorKind::Other(
                "Invalid base64 content".to_string(),
            )),
        }
    }
}
