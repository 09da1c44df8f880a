//! Application Layer
//!
//! Configuration, backend resolution and the use cases the facade runs.

pub mod bind;
pub mod catalog;
pub mod composite;
pub mod config;
pub mod login_page;
pub mod route_table;

// Re-exports
pub use bind::BindBackendsUseCase;
pub use catalog::{AuthenticatorCatalog, BackendFactory, BackendReference, ResolvedBackend};
pub use composite::CompositeAuthenticator;
pub use config::{BackendSpec, MultiAuthConfig, ParentConfig};
pub use login_page::{LoginLink, LoginPage};
pub use route_table::BuildRouteTableUseCase;
