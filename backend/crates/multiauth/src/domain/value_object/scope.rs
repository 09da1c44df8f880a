//! Scope value object
//!
//! URL prefix that namespaces one configured backend.

use std::fmt;

use platform::url_path::is_default_scope;
use serde::{Deserialize, Serialize};

use crate::error::{MultiAuthError, MultiAuthResult};

/// Characters that would be read as route syntax or break a URL path
const FORBIDDEN: &[char] = &['{', '}', '*', '?', '#', '%', '\\'];

/// Normalized URL scope.
///
/// Stored without leading or trailing `/` and with single separators, so
/// `"/team-a/"` and `"team-a"` are the same scope. The empty scope is the
/// default one and owns the application root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Scope(String);

impl Scope {
    /// Parse and normalize a configured scope
    pub fn parse(raw: &str) -> MultiAuthResult<Self> {
        if raw.chars().any(char::is_whitespace) {
            return Err(MultiAuthError::InvalidScope {
                scope: raw.to_string(),
                reason: "whitespace is not allowed",
            });
        }
        if raw.contains(FORBIDDEN) {
            return Err(MultiAuthError::InvalidScope {
                scope: raw.to_string(),
                reason: "route pattern characters are not allowed",
            });
        }

        let segments: Vec<&str> = raw.split('/').filter(|s| !s.is_empty()).collect();
        if segments.iter().any(|s| *s == "." || *s == "..") {
            return Err(MultiAuthError::InvalidScope {
                scope: raw.to_string(),
                reason: "relative segments are not allowed",
            });
        }

        Ok(Self(segments.join("/")))
    }

    /// The empty scope
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_default(&self) -> bool {
        is_default_scope(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Scope {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Scope {
    type Error = MultiAuthError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Scope> for String {
    fn from(scope: Scope) -> Self {
        scope.0
    }
}
