//! Multi-auth Router

use std::sync::Arc;

use axum::{
    Router,
    routing::{MethodRouter, any, get},
};

use crate::application::composite::CompositeAuthenticator;
use crate::domain::host::HostApp;
use crate::domain::route::{RouteTable, RouteTarget, ScopeFallbacks};
use crate::domain::value_object::scope::Scope;
use crate::error::MultiAuthResult;
use crate::presentation::handlers::{self, LoginPageState};

/// Mount every entry of a route table. Each backend route receives its own
/// `ScopedContext` as state; redirects become the router's fallback, so they
/// only answer requests no backend route matched.
pub fn mount_routes(table: RouteTable) -> Router {
    let mut router = Router::new();
    let mut redirects = Vec::new();

    for entry in table.into_entries() {
        match entry.target {
            RouteTarget::Scoped { context, handler } => {
                router = router.route(&entry.path, handler.with_state(context));
            }
            RouteTarget::Redirect(redirect) => redirects.push(redirect),
        }
    }

    let fallbacks = ScopeFallbacks::new(redirects);
    if fallbacks.is_empty() {
        return router;
    }
    let fallback: MethodRouter = any(handlers::scope_fallback).with_state(fallbacks);
    router.fallback_service(fallback)
}

impl RouteTable {
    pub fn into_router(self) -> Router {
        mount_routes(self)
    }
}

/// Route table plus the aggregate login page, ready to nest under the
/// application root.
pub fn composite_router(
    composite: Arc<CompositeAuthenticator>,
    app: &HostApp,
) -> MultiAuthResult<Router> {
    let mut table = composite.get_routes(app)?;
    let login_page_path = composite.config().login_page_path.clone();
    table.reserve(&login_page_path, &Scope::root())?;

    let state = LoginPageState {
        composite,
        base_url: app.base_url().to_string(),
    };

    Ok(table.into_router().route(
        &login_page_path,
        get(handlers::login_page).with_state(state),
    ))
}
