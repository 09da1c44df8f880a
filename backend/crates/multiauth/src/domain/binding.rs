//! Backend binding
//!
//! One constructed backend paired with its scope. The binding is itself an
//! [`Authenticator`]: a view of the backend whose login URL always routes
//! through the scope.

use async_trait::async_trait;
use platform::url_path;

use crate::domain::authenticator::{
    AuthenticatedUser, Authenticator, BackendError, LoginData, NativeRoute,
};
use crate::domain::host::HostApp;
use crate::domain::value_object::scope::Scope;

/// Label used when a backend does not name a login service
pub const LOCAL_USER_LABEL: &str = "Local User";

pub struct BackendBinding {
    name: String,
    instance: Box<dyn Authenticator>,
    scope: Scope,
    native_login_url: String,
}

impl BackendBinding {
    /// Bind `instance` under `scope`.
    ///
    /// The native login URL is captured here, once, before the binding
    /// exposes its rewritten `login_url`.
    pub fn new(name: impl Into<String>, instance: Box<dyn Authenticator>, scope: Scope) -> Self {
        let name = name.into();
        let native_login_url = instance.login_url("");

        tracing::info!(
            authenticator = %name,
            scope = %scope,
            native_login_url = %native_login_url,
            "Bound authenticator"
        );

        Self {
            name,
            instance,
            scope,
            native_login_url,
        }
    }

    /// Catalog name the backend was resolved from
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn native_login_url(&self) -> &str {
        &self.native_login_url
    }

    /// The backend itself, without scope rewriting
    pub fn inner(&self) -> &dyn Authenticator {
        self.instance.as_ref()
    }

    /// Login service name, or [`LOCAL_USER_LABEL`]
    pub fn label(&self) -> &str {
        self.instance.login_service().unwrap_or(LOCAL_USER_LABEL)
    }
}

impl std::fmt::Debug for BackendBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendBinding")
            .field("name", &self.name)
            .field("scope", &self.scope)
            .field("native_login_url", &self.native_login_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Authenticator for BackendBinding {
    fn login_url(&self, base_url: &str) -> String {
        let url = url_path::join(base_url, self.scope.as_str(), &self.native_login_url);
        tracing::debug!(
            base_url = %base_url,
            scope = %self.scope,
            native_login_url = %self.native_login_url,
            login_url = %url,
            "Scoped login url"
        );
        url
    }

    fn login_service(&self) -> Option<&str> {
        self.instance.login_service()
    }

    fn handlers(&self, app: &HostApp) -> Result<Vec<NativeRoute>, BackendError> {
        self.instance.handlers(app)
    }

    async fn authenticate(
        &self,
        data: &LoginData,
    ) -> Result<Option<AuthenticatedUser>, BackendError> {
        self.instance.authenticate(data).await
    }
}
