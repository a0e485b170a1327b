//! HTTP Server implementation
//!
//! This module provides the HTTP server using Axum framework with:
//! - Configurable host/port binding
//! - Graceful shutdown handling
//! - Request timeouts
//! - CORS support and security headers

use crate::api::handlers::AppState;
use crate::api::middleware::{
    security_headers_middleware, trace_id_middleware, SecurityHeadersConfig,
};
use crate::api::routes::build_api_routes;
use crate::core::config::ServerConfig;
use crate::core::notifier::Notifier;
use crate::core::Config;
use crate::db::manager::DatabaseManager;
use axum::{middleware, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

/// HTTP API Server
pub struct ApiServer {
    router: Router,
    config: ServerConfig,
}

impl ApiServer {
    /// Create a new API server with the given configuration, database and SMS notifier
    pub async fn new(
        config: Config,
        db: Arc<DatabaseManager>,
        notifier: Arc<dyn Notifier>,
    ) -> anyhow::Result<Self> {
        let server_config = config.server.clone();

        let router = Self::build_router(config, db, notifier).await?;

        Ok(Self {
            router,
            config: server_config,
        })
    }

    /// Build the Axum router with all routes and middleware
    async fn build_router(
        config: Config,
        db: Arc<DatabaseManager>,
        notifier: Arc<dyn Notifier>,
    ) -> anyhow::Result<Router> {
        let security_headers_config = SecurityHeadersConfig::new(
            config.security.enable_hsts,
            config.security.hsts_max_age,
        );
        let cors = Self::build_cors_layer(&config.security.allowed_origins);
        let request_timeout = Duration::from_secs(config.server.request_timeout);

        let app_state = AppState::new(config, db, notifier).await?;

        // Apply global middleware layers
        let router = build_api_routes(app_state).layer(
            ServiceBuilder::new()
                // Outermost first: every response, including errors, gets the headers
                .layer(middleware::from_fn_with_state(
                    security_headers_config,
                    security_headers_middleware,
                ))
                // Add trace ID middleware for request tracking
                .layer(middleware::from_fn(trace_id_middleware))
                // Add tracing for all requests
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(TimeoutLayer::new(request_timeout)),
        );

        Ok(router)
    }

    /// Build CORS layer from allowed origins configuration
    fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
        use tower_http::cors::Any;

        let cors = CorsLayer::new();

        // If allowed_origins contains "*", allow any origin
        if allowed_origins.iter().any(|origin| origin == "*") {
            cors.allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            cors.allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }

    /// Start the HTTP server and listen for requests
    ///
    /// This method will block until the server is shut down gracefully.
    pub async fn serve(self) -> anyhow::Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let socket_addr: SocketAddr = addr.parse()?;

        info!(
            host = %self.config.host,
            port = self.config.port,
            request_timeout = self.config.request_timeout,
            "Starting HTTP server"
        );

        let listener = tokio::net::TcpListener::bind(socket_addr).await?;

        info!(addr = %socket_addr, "HTTP server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("HTTP server shut down gracefully");

        Ok(())
    }

    /// Get a reference to the router
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Take the router out, e.g. to drive it with `oneshot` in tests
    pub fn into_router(self) -> Router {
        self.router
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }

    info!("Initiating graceful shutdown...");
}
