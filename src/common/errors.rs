use std::fmt::{Display, Formatter, Result as FmtResult};
use std::error::Error as StdError;

use axum::{
    extract::multipart::MultipartRejection,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Error categories shared across the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Entity not found
    NotFound,
    /// Entity already exists
    AlreadyExists,
    /// Invalid input or failed validation
    InvalidInput,
    /// Access denied
    AccessDenied,
    /// Operation timed out
    Timeout,
    /// Storage backend unreachable or not configured
    Unavailable,
    /// Internal failure
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ErrorKind::NotFound => write!(f, "Not Found"),
            ErrorKind::AlreadyExists => write!(f, "Already Exists"),
            ErrorKind::InvalidInput => write!(f, "Invalid Input"),
            ErrorKind::AccessDenied => write!(f, "Access Denied"),
            ErrorKind::Timeout => write!(f, "Timeout"),
            ErrorKind::Unavailable => write!(f, "Unavailable"),
            ErrorKind::InternalError => write!(f, "Internal Error"),
        }
    }
}

/// Domain error carrying the affected entity and an optional source
#[derive(Error, Debug)]
#[error("{kind}: {message}")]
pub struct DomainError {
    pub kind: ErrorKind,
    /// Affected entity type (e.g. "Document", "FolderPath", "BlobStorage")
    pub entity_type: &'static str,
    pub entity_id: Option<String>,
    pub message: String,
    #[source]
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

impl DomainError {
    pub fn new<S: Into<String>>(
        kind: ErrorKind,
        entity_type: &'static str,
        message: S,
    ) -> Self {
        Self {
            kind,
            entity_type,
            entity_id: None,
            message: message.into(),
            source: None,
        }
    }

    pub fn not_found<S: Into<String>>(entity_type: &'static str, entity_id: S) -> Self {
        let id = entity_id.into();
        Self {
            kind: ErrorKind::NotFound,
            entity_type,
            entity_id: Some(id.clone()),
            message: format!("{} not found: {}", entity_type, id),
            source: None,
        }
    }

    pub fn already_exists<S: Into<String>>(entity_type: &'static str, entity_id: S) -> Self {
        let id = entity_id.into();
        Self {
            kind: ErrorKind::AlreadyExists,
            entity_type,
            entity_id: Some(id.clone()),
            message: format!("{} already exists: {}", entity_type, id),
            source: None,
        }
    }

    pub fn timeout<S: Into<String>>(entity_type: &'static str, message: S) -> Self {
        Self::new(ErrorKind::Timeout, entity_type, message)
    }

    pub fn unavailable<S: Into<String>>(entity_type: &'static str, message: S) -> Self {
        Self::new(ErrorKind::Unavailable, entity_type, message)
    }

    pub fn internal_error<S: Into<String>>(entity_type: &'static str, message: S) -> Self {
        Self::new(ErrorKind::InternalError, entity_type, message)
    }

    pub fn access_denied<S: Into<String>>(entity_type: &'static str, message: S) -> Self {
        Self::new(ErrorKind::AccessDenied, entity_type, message)
    }

    /// Creates a validation error
    pub fn validation_error<S: Into<String>>(entity_type: &'static str, message: S) -> Self {
        Self::new(ErrorKind::InvalidInput, entity_type, message)
    }

    pub fn with_source<E: StdError + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

/// Adds context to foreign errors while converting them
pub trait ErrorContext<T, E> {
    fn with_context<C, F>(self, context: F) -> Result<T, DomainError>
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl<T, E: StdError + Send + Sync + 'static> ErrorContext<T, E> for Result<T, E> {
    fn with_context<C, F>(self, context: F) -> Result<T, DomainError>
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|e| DomainError {
            kind: ErrorKind::InternalError,
            entity_type: "Storage",
            entity_id: None,
            message: context().into(),
            source: Some(Box::new(e)),
        })
    }
}

/// Implements `From<$error>` for `DomainError` with the given kind
#[macro_export]
macro_rules! impl_from_error {
    ($error_type:ty, $entity_type:expr) => {
        impl From<$error_type> for DomainError {
            fn from(err: $error_type) -> Self {
                DomainError {
                    kind: ErrorKind::InternalError,
                    entity_type: $entity_type,
                    entity_id: None,
                    message: format!("{}", err),
                    source: Some(Box::new(err)),
                }
            }
        }
    };
}

impl_from_error!(std::io::Error, "IO");
impl_from_error!(serde_json::Error, "Serialization");
impl_from_error!(reqwest::Error, "BlobStorage");

/// Error returned by HTTP handlers, rendered as `{"error": ...}`
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new<S: Into<String>>(status: StatusCode, message: S) -> Self {
        Self { status, message: message.into() }
    }

    pub fn bad_request<S: Into<String>>(message: S) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        let status = match err.kind {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::AlreadyExists => StatusCode::CONFLICT,
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::AccessDenied => StatusCode::FORBIDDEN,
            ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!("{} error: {}", err.entity_type, err);
        }

        // Validation and lookup messages are meant for the caller; internal ones are not.
        let message = match err.kind {
            ErrorKind::InternalError => format!("{} operation failed. Please try again.", err.entity_type),
            _ => err.message,
        };

        Self { status, message }
    }
}

/// Extractor rejections keep their status but use the JSON error body
macro_rules! impl_from_rejection {
    ($($rejection:ty),+ $(,)?) => {
        $(
            impl From<$rejection> for AppError {
                fn from(rejection: $rejection) -> Self {
                    Self::new(rejection.status(), rejection.body_text())
                }
            }
        )+
    };
}

impl_from_rejection!(PathRejection, QueryRejection, JsonRejection, MultipartRejection);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

/// Result defaulting to `DomainError`
pub type Result<T, E = DomainError> = std::result::Result<T, E>;
