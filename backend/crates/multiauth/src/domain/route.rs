//! Route table
//!
//! The combined set of routes the composite contributes to the host. Every
//! backend route carries its own [`ScopedContext`], which is the per-route
//! specialization: native handler functions are shared, their state is not.

use std::sync::Arc;

use axum::routing::MethodRouter;
use platform::url_path::url_path_join;

use crate::domain::binding::BackendBinding;
use crate::domain::host::{HostApp, Settings, TemplateNamespace};
use crate::domain::value_object::scope::Scope;
use crate::error::{MultiAuthError, MultiAuthResult};

/// Rewrites the host settings for one route
pub type SettingsView = Arc<dyn Fn(&Settings) -> Settings + Send + Sync>;

/// Rewrites the host template variables for one route; receives the hub base URL
pub type NamespaceView = Arc<dyn Fn(&TemplateNamespace, &str) -> TemplateNamespace + Send + Sync>;

/// State handed to a backend's native handlers.
///
/// Immutable after construction. Views are computed per call from the
/// host's values, so every request gets fresh copies.
#[derive(Clone)]
pub struct ScopedContext {
    binding: Arc<BackendBinding>,
    host_settings: Arc<Settings>,
    host_namespace: Arc<TemplateNamespace>,
    settings_view: SettingsView,
    namespace_view: NamespaceView,
}

impl ScopedContext {
    pub fn new(
        binding: Arc<BackendBinding>,
        app: &HostApp,
        settings_view: SettingsView,
        namespace_view: NamespaceView,
    ) -> Self {
        Self {
            binding,
            host_settings: Arc::new(app.settings.clone()),
            host_namespace: Arc::new(app.template_namespace.clone()),
            settings_view,
            namespace_view,
        }
    }

    /// The backend this route is bound to, with its scoped login URL
    pub fn authenticator(&self) -> &BackendBinding {
        &self.binding
    }

    pub fn binding(&self) -> &Arc<BackendBinding> {
        &self.binding
    }

    pub fn scope(&self) -> &Scope {
        self.binding.scope()
    }

    /// Settings as this route's handlers must see them
    pub fn settings(&self) -> Settings {
        (self.settings_view)(&self.host_settings)
    }

    /// Template variables as this route's pages must see them
    pub fn template_namespace(&self) -> TemplateNamespace {
        (self.namespace_view)(&self.host_namespace, self.host_settings.hub_base_url())
    }
}

impl std::fmt::Debug for ScopedContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedContext")
            .field("binding", &self.binding)
            .finish_non_exhaustive()
    }
}

/// Which fallback a redirect route implements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackKind {
    /// Unmatched `/<scope>/<rest>` to `<root>/<rest>`
    CatchAll,
    /// Unmatched `/<scope>/` to `<root>`
    ScopeRoot,
}

/// Fallback redirect back to the application root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectRoute {
    pub kind: FallbackKind,
    /// Scope mount point without trailing slash, e.g. `/team-a`
    pub prefix: String,
    /// Application root the redirect lands under
    pub root: String,
}

impl RedirectRoute {
    /// Redirect location for the matched suffix (ignored for `ScopeRoot`).
    /// `rest` and `query` are used as received, still percent-encoded.
    pub fn location(&self, rest: Option<&str>, query: Option<&str>) -> String {
        let path = match (self.kind, rest) {
            (FallbackKind::CatchAll, Some(rest)) => url_path_join(&[self.root.as_str(), rest]),
            _ => self.root.clone(),
        };
        match query {
            Some(query) if !query.is_empty() => format!("{path}?{query}"),
            _ => path,
        }
    }

    /// Suffix of `path` under this route's scope, if this route handles it
    fn matches<'p>(&self, path: &'p str) -> Option<&'p str> {
        let rest = path.strip_prefix(self.prefix.as_str())?.strip_prefix('/')?;
        match self.kind {
            FallbackKind::ScopeRoot if rest.is_empty() => Some(rest),
            FallbackKind::CatchAll if !rest.is_empty() => Some(rest),
            _ => None,
        }
    }
}

/// Redirects consulted only when no mounted route matched.
///
/// Kept out of the path router so a backend's own routes under its scope
/// always win, whatever patterns they use.
#[derive(Debug, Clone, Default)]
pub struct ScopeFallbacks {
    routes: Vec<RedirectRoute>,
}

impl ScopeFallbacks {
    pub fn new(routes: Vec<RedirectRoute>) -> Self {
        Self { routes }
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Location for an unmatched request path; the innermost scope wins
    pub fn location_for(&self, path: &str, query: Option<&str>) -> Option<String> {
        self.routes
            .iter()
            .filter_map(|route| route.matches(path).map(|rest| (route, rest)))
            .max_by_key(|(route, _)| route.prefix.len())
            .map(|(route, rest)| route.location(Some(rest), query))
    }
}

pub enum RouteTarget {
    /// Backend route with its own bound state
    Scoped {
        context: ScopedContext,
        handler: MethodRouter<ScopedContext>,
    },
    Redirect(RedirectRoute),
}

impl std::fmt::Debug for RouteTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteTarget::Scoped { context, .. } => {
                f.debug_struct("Scoped").field("context", context).finish_non_exhaustive()
            }
            RouteTarget::Redirect(redirect) => f.debug_tuple("Redirect").field(redirect).finish(),
        }
    }
}

#[derive(Debug)]
pub struct RouteEntry {
    /// axum path pattern, always starting with `/`
    pub path: String,
    /// Scope that owns this entry
    pub scope: Scope,
    pub target: RouteTarget,
}

impl RouteEntry {
    pub fn scoped(
        path: impl Into<String>,
        context: ScopedContext,
        handler: MethodRouter<ScopedContext>,
    ) -> Self {
        Self {
            path: path.into(),
            scope: context.scope().clone(),
            target: RouteTarget::Scoped { context, handler },
        }
    }

    pub fn redirect(path: impl Into<String>, scope: Scope, redirect: RedirectRoute) -> Self {
        Self {
            path: path.into(),
            scope,
            target: RouteTarget::Redirect(redirect),
        }
    }

    pub fn context(&self) -> Option<&ScopedContext> {
        match &self.target {
            RouteTarget::Scoped { context, .. } => Some(context),
            RouteTarget::Redirect(_) => None,
        }
    }

    pub fn redirect_target(&self) -> Option<&RedirectRoute> {
        match &self.target {
            RouteTarget::Redirect(redirect) => Some(redirect),
            RouteTarget::Scoped { .. } => None,
        }
    }
}

/// Ordered route table with collision detection
#[derive(Debug, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
    claimed: Vec<(String, Scope)>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Backend routes fail if their path clashes with one
    /// already claimed; redirects never claim a path.
    pub fn push(&mut self, entry: RouteEntry) -> MultiAuthResult<()> {
        if let RouteTarget::Scoped { .. } = entry.target {
            self.claim(&entry.path, &entry.scope)?;
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Reserve a path for a route mounted outside the table (e.g. the login page)
    pub fn reserve(&mut self, path: &str, scope: &Scope) -> MultiAuthResult<()> {
        self.claim(path, scope)
    }

    /// Whether a claimed path clashes with `path`
    pub fn is_claimed(&self, path: &str) -> bool {
        self.claimed.iter().any(|(claimed, _)| paths_clash(claimed, path))
    }

    fn claim(&mut self, path: &str, scope: &Scope) -> MultiAuthResult<()> {
        let existing = self
            .claimed
            .iter()
            .find(|(claimed, _)| paths_clash(claimed, path));
        if let Some((_, first)) = existing {
            tracing::error!(path = %path, first = %first, second = %scope, "Route collision");
            return Err(MultiAuthError::ConfigurationConflict {
                path: path.to_string(),
                first: first.to_string(),
                second: scope.to_string(),
            });
        }
        self.claimed.push((path.to_string(), scope.clone()));
        Ok(())
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<RouteEntry> {
        self.entries
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.path.as_str())
    }

    pub fn get(&self, path: &str) -> Option<&RouteEntry> {
        self.entries.iter().find(|e| e.path == path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn is_dynamic(segment: &str) -> bool {
    segment.starts_with('{') && !segment.starts_with("{{")
}

/// Whether two axum path patterns cannot be mounted side by side.
///
/// Identical patterns clash. Otherwise the paths are compared segment by
/// segment; at the first difference, two wildcard segments (parameters with
/// different names, or a parameter and a catch-all) clash, while a literal
/// next to a wildcard does not.
fn paths_clash(a: &str, b: &str) -> bool {
    let mut left = a.split('/');
    let mut right = b.split('/');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return true,
            (Some(x), Some(y)) if x == y => continue,
            (Some(x), Some(y)) => return is_dynamic(x) && is_dynamic(y),
            _ => return false,
        }
    }
}
