//! Build Route Table Use Case
//!
//! Turns bindings into one combined, scope-prefixed route table.

use std::sync::Arc;

use platform::url_path::{self, url_path_join, with_trailing_slash};

use crate::domain::authenticator::Authenticator;
use crate::domain::binding::BackendBinding;
use crate::domain::host::{HostApp, Settings, TemplateNamespace};
use crate::domain::route::{
    FallbackKind, NamespaceView, RedirectRoute, RouteEntry, RouteTable, ScopedContext,
    SettingsView,
};
use crate::domain::value_object::scope::Scope;
use crate::error::{MultiAuthError, MultiAuthResult};

pub struct BuildRouteTableUseCase<'a> {
    bindings: &'a [Arc<BackendBinding>],
}

impl<'a> BuildRouteTableUseCase<'a> {
    pub fn new(bindings: &'a [Arc<BackendBinding>]) -> Self {
        Self { bindings }
    }

    /// Build the full table, fallbacks included. Nothing is cached: the same
    /// bindings always produce the same table.
    pub fn execute(&self, app: &HostApp) -> MultiAuthResult<RouteTable> {
        let mut table = RouteTable::new();

        for binding in self.bindings {
            let scope = binding.scope();
            let native_routes = binding.handlers(app).map_err(MultiAuthError::Backend)?;

            for native in native_routes {
                let path = scoped_route_path(scope, &native.path);
                tracing::debug!(
                    path = %path,
                    native_path = %native.path,
                    scope = %scope,
                    authenticator = %binding.name(),
                    "Route"
                );

                let context = ScopedContext::new(
                    Arc::clone(binding),
                    app,
                    settings_view(binding),
                    namespace_view(scope),
                );
                table.push(RouteEntry::scoped(path, context, native.handler))?;
            }

            if !scope.is_default() {
                let [catch_all, scope_root] = fallback_routes(scope, app.base_url());
                let mut fallbacks = vec![catch_all];
                if table.is_claimed(&scope_root.path) {
                    tracing::debug!(path = %scope_root.path, scope = %scope, "Scope root served natively");
                } else {
                    fallbacks.push(scope_root);
                }
                for entry in fallbacks {
                    tracing::debug!(path = %entry.path, scope = %scope, "Fallback redirect");
                    table.push(entry)?;
                }
            }
        }

        tracing::info!(
            routes = table.len(),
            authenticators = self.bindings.len(),
            "Route table built"
        );
        Ok(table)
    }
}

/// `/<scope>/<native>`; native paths may be given with or without a leading `/`
pub fn scoped_route_path(scope: &Scope, native_path: &str) -> String {
    url_path::join("/", scope.as_str(), native_path)
}

/// Settings with `login_url` pointing at this binding's scoped login
fn settings_view(binding: &Arc<BackendBinding>) -> SettingsView {
    let binding = Arc::clone(binding);
    Arc::new(move |host: &Settings| {
        let mut settings = host.clone();
        settings.login_url = binding.login_url(host.hub_base_url());
        settings
    })
}

/// Template variables with `base_url` moved under the scope
fn namespace_view(scope: &Scope) -> NamespaceView {
    let scope = scope.clone();
    Arc::new(move |host: &TemplateNamespace, hub_base_url: &str| {
        let base_url = with_trailing_slash(&url_path::join(hub_base_url, scope.as_str(), ""));
        host.clone().with(TemplateNamespace::BASE_URL, base_url)
    })
}

/// Redirects that catch absolute links a backend rendered without the scope
fn fallback_routes(scope: &Scope, app_root: &str) -> [RouteEntry; 2] {
    let prefix = url_path_join(&["/", scope.as_str()]);
    let catch_all = url_path_join(&[prefix.as_str(), "{*path}"]);
    let scope_root = with_trailing_slash(&prefix);
    [
        RouteEntry::redirect(
            catch_all,
            scope.clone(),
            RedirectRoute {
                kind: FallbackKind::CatchAll,
                prefix: prefix.clone(),
                root: app_root.to_string(),
            },
        ),
        RouteEntry::redirect(
            scope_root,
            scope.clone(),
            RedirectRoute {
                kind: FallbackKind::ScopeRoot,
                prefix,
                root: app_root.to_string(),
            },
        ),
    ]
}
