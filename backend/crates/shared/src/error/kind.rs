//! Error classification shared by every crate in the workspace

use serde::Serialize;

/// What went wrong, coarse enough to pick an HTTP status from.
///
/// ```rust
/// use kernel::error::kind::ErrorKind;
///
/// assert_eq!(ErrorKind::NotImplemented.status_code(), 501);
/// assert_eq!(ErrorKind::Conflict.to_string(), "Conflict");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorKind {
    /// Malformed input from the client
    BadRequest,
    /// Two components claim the same resource
    Conflict,
    InternalServerError,
    /// The operation exists but this component never performs it
    NotImplemented,
}

impl ErrorKind {
    const fn parts(&self) -> (u16, &'static str) {
        match self {
            Self::BadRequest => (400, "Bad Request"),
            Self::Conflict => (409, "Conflict"),
            Self::InternalServerError => (500, "Internal Server Error"),
            Self::NotImplemented => (501, "Not Implemented"),
        }
    }

    pub const fn status_code(&self) -> u16 {
        self.parts().0
    }

    /// Reason phrase for the status code
    pub const fn title(&self) -> &'static str {
        self.parts().1
    }

    pub const fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}
