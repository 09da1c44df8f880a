//! Multi-auth Error Types
//!
//! This module provides composite-layer error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::authenticator::BackendError;

/// Multi-auth result type alias
pub type MultiAuthResult<T> = Result<T, MultiAuthError>;

/// Multi-auth error variants
#[derive(Debug, Error)]
pub enum MultiAuthError {
    /// Backend reference names nothing in the catalog
    #[error("Cannot resolve authenticator '{reference}'")]
    Resolution { reference: String },

    /// The composite was asked to authenticate directly
    #[error("The composite authenticator does not authenticate; use a scoped login route")]
    NotSupported,

    /// Two routes collide after scope prefixing
    #[error("Route '{path}' is claimed by scope '{first}' and scope '{second}'")]
    ConfigurationConflict {
        path: String,
        first: String,
        second: String,
    },

    /// Two configured backends share a scope
    #[error("Scope '{0}' is configured more than once")]
    DuplicateScope(String),

    /// Scope cannot be used as a URL prefix
    #[error("Invalid scope '{scope}': {reason}")]
    InvalidScope { scope: String, reason: &'static str },

    /// Configuration could not be read or parsed
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Login page template failed
    #[error("Template error: {0}")]
    Render(#[from] minijinja::Error),

    /// Error raised by a backend, passed through untouched
    #[error(transparent)]
    Backend(BackendError),
}

impl MultiAuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            MultiAuthError::NotSupported => StatusCode::NOT_IMPLEMENTED,
            MultiAuthError::ConfigurationConflict { .. } | MultiAuthError::DuplicateScope(_) => {
                StatusCode::CONFLICT
            }
            MultiAuthError::Resolution { .. }
            | MultiAuthError::InvalidScope { .. }
            | MultiAuthError::InvalidConfig(_)
            | MultiAuthError::Render(_)
            | MultiAuthError::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            MultiAuthError::NotSupported => ErrorKind::NotImplemented,
            MultiAuthError::ConfigurationConflict { .. } | MultiAuthError::DuplicateScope(_) => {
                ErrorKind::Conflict
            }
            MultiAuthError::Resolution { .. }
            | MultiAuthError::InvalidScope { .. }
            | MultiAuthError::InvalidConfig(_)
            | MultiAuthError::Render(_)
            | MultiAuthError::Backend(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        let err = AppError::new(self.kind(), self.to_string());
        match self {
            MultiAuthError::NotSupported => err.with_action("Sign in through one of the login links"),
            _ => err,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            MultiAuthError::Backend(e) => {
                tracing::error!(error = %e, "Authenticator backend error");
            }
            MultiAuthError::Render(e) => {
                tracing::error!(error = %e, "Login page render error");
            }
            MultiAuthError::NotSupported => {
                tracing::warn!("Direct authentication attempted on composite authenticator");
            }
            _ => {
                tracing::debug!(error = %self, "Multi-auth error");
            }
        }
    }
}

impl IntoResponse for MultiAuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<MultiAuthError> for AppError {
    fn from(err: MultiAuthError) -> Self {
        err.to_app_error()
    }
}
