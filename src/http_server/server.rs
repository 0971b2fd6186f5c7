//! # HTTP Server
//!
//! Combines the car, health, metrics and static-file routers behind the
//! request-tracking and CORS layers.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{middleware, Router};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::observability::Logger;

use super::car_routes::{car_routes, CarsState};
use super::config::{ConfigError, ServerConfig};
use super::middleware::track_request;
use super::observability_routes::{health_routes, observability_routes};

/// HTTP server for the car catalogue
pub struct HttpServer {
    config: ServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a server from configuration, loading the template and seed data
    pub fn with_config(config: ServerConfig) -> Result<Self, ConfigError> {
        let state = Arc::new(CarsState::from_config(&config)?);
        Ok(Self::with_state(config, state))
    }

    /// Create a server around existing state
    pub fn with_state(config: ServerConfig, state: Arc<CarsState>) -> Self {
        let router = Self::build_router(&config, state);
        Self { config, router }
    }

    /// Build the combined router with all endpoints
    pub fn build_router(config: &ServerConfig, state: Arc<CarsState>) -> Router {
        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        let metrics = state.metrics.clone();

        Router::new()
            .merge(health_routes())
            .merge(car_routes(state))
            .nest("/observability", observability_routes(metrics.clone()))
            .nest_service("/static", ServeDir::new(&config.static_dir))
            .layer(middleware::from_fn_with_state(metrics, track_request))
            .layer(cors)
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Bind and serve until the process is stopped
    pub async fn start(self) -> io::Result<()> {
        let addr: SocketAddr = self
            .config
            .socket_addr()
            .parse()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, format!("{}", e)))?;

        let listener = TcpListener::bind(addr).await?;

        Logger::info(
            "SERVER_STARTED",
            &[
                ("addr", &addr.to_string()),
                ("static_dir", &self.config.static_dir.display().to_string()),
            ],
        );

        axum::serve(listener, self.router).await
    }
}
