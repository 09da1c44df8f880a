//! Presentation Layer
//!
//! axum mounting of the route table plus the composite's own handlers.

pub mod handlers;
pub mod router;

pub use handlers::LoginPageState;
pub use router::{composite_router, mount_routes};
