//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations with no knowledge of authentication:
//! - URL path algebra for mounting components under a prefix

pub mod url_path;
