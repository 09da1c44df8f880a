//! Multi-authenticator Backend Module
//!
//! Composes several independent authentication backends behind one login
//! surface. Each backend is mounted under its own URL scope and sees a
//! rewritten view of the host so it behaves as if it owned the root.
//!
//! Clean Architecture structure:
//! - `domain/` - Authenticator capability, bindings, route table, scope
//! - `application/` - Config, resolver catalog, route building, facade
//! - `presentation/` - axum mounting, redirect and login page handlers
//!
//! ## Routing Model
//! - Native backend routes are prefixed with the backend's scope
//! - Every route gets its own `ScopedContext` state (bound backend,
//!   settings view, template view); native handlers are never altered
//! - Non-default scopes get fallback redirects back to the application root
//! - The composite never authenticates; scoped handlers do

pub mod application;
pub mod domain;
pub mod error;
pub mod presentation;

// Re-exports for convenience
pub use application::catalog::{AuthenticatorCatalog, BackendReference};
pub use application::composite::CompositeAuthenticator;
pub use application::config::{BackendSpec, MultiAuthConfig, ParentConfig};
pub use domain::authenticator::{
    AuthenticatedUser, Authenticator, BackendError, BackendInit, ConfigurableAuthenticator,
    LoginData, NativeRoute,
};
pub use domain::binding::BackendBinding;
pub use domain::host::{HostApp, HubInfo, Settings, TemplateNamespace};
pub use domain::route::{RouteEntry, RouteTable, RouteTarget, ScopedContext};
pub use domain::value_object::scope::Scope;
pub use error::{MultiAuthError, MultiAuthResult};
pub use presentation::router::{composite_router, mount_routes};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

#[cfg(test)]
mod tests;
