//! Composite Authenticator
//!
//! The single object the host talks to. Holds the ordered bindings, builds
//! the combined route table and renders the aggregate login page.

use std::sync::Arc;

use crate::application::bind::BindBackendsUseCase;
use crate::application::catalog::AuthenticatorCatalog;
use crate::application::config::MultiAuthConfig;
use crate::application::login_page::{LoginLink, LoginPage};
use crate::application::route_table::BuildRouteTableUseCase;
use crate::domain::authenticator::{AuthenticatedUser, Authenticator, LoginData};
use crate::domain::binding::BackendBinding;
use crate::domain::host::HostApp;
use crate::domain::route::RouteTable;
use crate::domain::value_object::scope::Scope;
use crate::error::{MultiAuthError, MultiAuthResult};

#[derive(Debug)]
pub struct CompositeAuthenticator {
    config: MultiAuthConfig,
    bindings: Vec<Arc<BackendBinding>>,
    login_page: LoginPage,
}

impl CompositeAuthenticator {
    /// Resolve and construct every configured backend.
    ///
    /// Unknown backends, duplicate scopes and backend construction errors
    /// all abort here rather than surfacing at request time.
    pub fn new(config: MultiAuthConfig, catalog: &AuthenticatorCatalog) -> MultiAuthResult<Self> {
        config.validate()?;
        let bindings = BindBackendsUseCase::new(catalog).execute(&config)?;
        let login_page = LoginPage::new()?;

        tracing::info!(
            authenticators = bindings.len(),
            base_url = %config.base_url,
            "Composite authenticator ready"
        );

        Ok(Self {
            config,
            bindings,
            login_page,
        })
    }

    pub fn config(&self) -> &MultiAuthConfig {
        &self.config
    }

    /// Bindings in configuration order
    pub fn bindings(&self) -> &[Arc<BackendBinding>] {
        &self.bindings
    }

    /// Binding mounted at `scope` (normalized the same way config scopes are)
    pub fn binding_for_scope(&self, scope: &str) -> Option<&Arc<BackendBinding>> {
        let wanted = Scope::parse(scope).ok()?;
        self.bindings.iter().find(|b| b.scope() == &wanted)
    }

    /// First binding whose backend was resolved from `name`
    pub fn binding_for_backend(&self, name: &str) -> Option<&Arc<BackendBinding>> {
        self.bindings.iter().find(|b| b.name() == name)
    }

    /// Host view rooted at the configured base URL
    pub fn host_app(&self) -> HostApp {
        HostApp::new(self.config.base_url.clone())
    }

    /// Combined route table for `app`, rebuilt on every call
    pub fn get_routes(&self, app: &HostApp) -> MultiAuthResult<RouteTable> {
        BuildRouteTableUseCase::new(&self.bindings).execute(app)
    }

    /// Always fails: credentials are validated by the scoped handlers of
    /// each backend, never by the composite.
    pub async fn authenticate(&self, _data: &LoginData) -> MultiAuthResult<AuthenticatedUser> {
        Err(MultiAuthError::NotSupported)
    }

    /// Sign-in links for every backend, in configuration order
    pub fn login_links(&self, base_url: &str) -> Vec<LoginLink> {
        self.bindings
            .iter()
            .map(|binding| LoginLink {
                url: binding.login_url(base_url),
                label: binding.label().to_string(),
            })
            .collect()
    }

    pub fn render_login_page(&self, base_url: &str) -> MultiAuthResult<String> {
        self.login_page.render(&self.login_links(base_url))
    }
}
