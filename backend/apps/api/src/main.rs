//! Login server entry point
//!
//! Loads the multiauth config, builds the composite authenticator from the
//! development catalog and serves its routes under the hub base URL.
//! Startup errors use `anyhow`; request errors are `MultiAuthError` responses.

mod backends;

use axum::Router;
use multiauth::{CompositeAuthenticator, MultiAuthConfig, composite_router};
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                //.unwrap_or_else(|_| "api=debug,multiauth=debug,tower_http=debug".into()),
                .unwrap_or_else(|_| "api=info,multiauth=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Multi-auth configuration
    let config_path = env::var("MULTIAUTH_CONFIG").unwrap_or_else(|_| "multiauth.json".to_string());
    let config = MultiAuthConfig::from_file(&config_path)?;

    tracing::info!(
        path = %config_path,
        authenticators = config.authenticators.len(),
        "Loaded multiauth config"
    );

    // Construction fails fast on unknown backends and scope conflicts
    let composite = Arc::new(CompositeAuthenticator::new(config, &backends::catalog())?);
    let host = composite.host_app();
    let auth_router = composite_router(Arc::clone(&composite), &host)?;

    // Build router under the application root
    let root = host.base_url().trim_end_matches('/');
    let app = if root.is_empty() {
        Router::new().merge(auth_router)
    } else {
        Router::new().nest(root, auth_router)
    };
    let app = app.layer(TraceLayer::new_for_http());

    // Start server
    let listen = env::var("MULTIAUTH_LISTEN").unwrap_or_else(|_| "0.0.0.0:8081".to_string());
    let addr: SocketAddr = listen.parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
