//! # HTTP Server Module
//!
//! Route layer for the car catalogue, built on Axum.
//!
//! # Endpoints
//!
//! - `/` - Redirect to `/cars`
//! - `/cars`, `/cars/:id` - Listing, create, read, update, delete
//! - `/static/*` - Static assets
//! - `/health` - Health check
//! - `/observability/*` - Health and metrics

pub mod car_routes;
pub mod config;
pub mod errors;
pub mod middleware;
pub mod observability_routes;
pub mod server;

pub use car_routes::CarsState;
pub use config::{ConfigError, ServerConfig};
pub use errors::{ApiError, ApiResult};
pub use server::HttpServer;
