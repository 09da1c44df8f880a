//! Domain Layer
//!
//! The Authenticator capability and the records the composite builds from it.

pub mod authenticator;
pub mod binding;
pub mod host;
pub mod route;
pub mod value_object;
