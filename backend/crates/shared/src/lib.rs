//! Shared Kernel - vocabulary shared by every crate in the workspace
//!
//! Only the unified error types live here. Anything HTTP-specific is behind
//! the `axum` feature so pure crates can depend on the kernel cheaply.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
