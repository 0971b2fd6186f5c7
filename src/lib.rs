//! carlot - an in-memory car catalogue served over HTML and JSON
//!
//! Request flow: route layer -> schema validator (writes) -> record store
//! -> HTML page or JSON response.

pub mod cli;
pub mod http_server;
pub mod observability;
pub mod render;
pub mod schema;
pub mod store;
