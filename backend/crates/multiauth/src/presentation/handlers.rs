//! HTTP Handlers
//!
//! Handlers owned by the composite itself. Backend handlers are mounted
//! as the backends provide them.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Redirect, Response};

use crate::application::composite::CompositeAuthenticator;
use crate::domain::route::ScopeFallbacks;
use crate::error::MultiAuthResult;

/// Shared state for the aggregate login page
#[derive(Clone)]
pub struct LoginPageState {
    pub composite: Arc<CompositeAuthenticator>,
    /// Base URL the sign-in links are rendered against
    pub base_url: String,
}

// ============================================================================
// Login page
// ============================================================================

/// GET <login_page_path>
pub async fn login_page(State(state): State<LoginPageState>) -> MultiAuthResult<Html<String>> {
    let html = state.composite.render_login_page(&state.base_url)?;
    Ok(Html(html))
}

// ============================================================================
// Fallback redirects
// ============================================================================

/// Any request no mounted route matched.
///
/// GET and HEAD under a non-default scope are redirected to the application
/// root with the raw, still-encoded suffix and query; everything else is 404.
pub async fn scope_fallback(
    State(fallbacks): State<ScopeFallbacks>,
    method: Method,
    uri: Uri,
) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return StatusCode::NOT_FOUND.into_response();
    }
    match fallbacks.location_for(uri.path(), uri.query()) {
        Some(location) => {
            tracing::debug!(path = %uri.path(), location = %location, "Redirecting unscoped link");
            Redirect::temporary(&location).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
