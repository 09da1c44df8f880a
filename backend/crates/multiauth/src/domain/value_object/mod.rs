//! Value Objects

pub mod scope;

pub use scope::Scope;
