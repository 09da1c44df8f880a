//! Authenticator capability
//!
//! The surface a pluggable backend (password, PAM, OAuth provider, ...) must
//! expose to be composed. The composite only ever talks to backends through
//! this trait.

use async_trait::async_trait;
use axum::routing::MethodRouter;
use platform::url_path::url_path_join;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::host::HostApp;
use crate::domain::route::ScopedContext;
use crate::domain::value_object::scope::Scope;

/// Error produced by backend code. The composite propagates it unmodified.
pub type BackendError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Fields submitted to a backend's login handler
pub type LoginData = Map<String, Value>;

/// One route a backend contributes, relative to wherever it is mounted
pub struct NativeRoute {
    pub path: String,
    pub handler: MethodRouter<ScopedContext>,
}

impl NativeRoute {
    pub fn new(path: impl Into<String>, handler: MethodRouter<ScopedContext>) -> Self {
        Self {
            path: path.into(),
            handler,
        }
    }
}

/// Identity returned by a successful backend authentication
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin: Option<bool>,
}

impl AuthenticatedUser {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            admin: None,
        }
    }
}

/// Authentication backend
#[async_trait]
pub trait Authenticator: Send + Sync + 'static {
    /// Login path under `base_url`. With an empty base this is the
    /// backend's self-generated relative login path.
    fn login_url(&self, base_url: &str) -> String {
        url_path_join(&[base_url, "login"])
    }

    /// Human readable provider name; `None` for local accounts
    fn login_service(&self) -> Option<&str> {
        None
    }

    /// Routes this backend serves, relative to its mount point
    fn handlers(&self, app: &HostApp) -> Result<Vec<NativeRoute>, BackendError>;

    /// Validate submitted credentials. `Ok(None)` means rejected.
    async fn authenticate(&self, data: &LoginData)
    -> Result<Option<AuthenticatedUser>, BackendError>;
}

/// Construction input for one configured backend.
///
/// `options` is the backend's section of the parent configuration with the
/// spec's inline options layered on top.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendInit {
    pub name: String,
    pub scope: Scope,
    pub options: Map<String, Value>,
}

impl BackendInit {
    pub fn new(name: impl Into<String>, scope: Scope, options: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            scope,
            options,
        }
    }

    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }

    pub fn option_str(&self, key: &str) -> Option<&str> {
        self.option(key).and_then(Value::as_str)
    }

    /// Deserialize the options into a backend's own config struct
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, BackendError> {
        let value = Value::Object(self.options.clone());
        serde_json::from_value(value).map_err(|e| {
            format!("invalid options for authenticator '{}': {}", self.name, e).into()
        })
    }
}

/// Backend that can be built from configuration and registered by type
pub trait ConfigurableAuthenticator: Authenticator + Sized {
    fn from_init(init: &BackendInit) -> Result<Self, BackendError>;
}
