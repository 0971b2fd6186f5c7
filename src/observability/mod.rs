//! Observability for carlot
//!
//! - Structured logging (JSON lines)
//! - Counters for requests and store mutations
//!
//! ```ignore
//! use carlot::observability::{Logger, MetricsRegistry};
//!
//! Logger::info("CARS_CREATED", &[("ids", "0,1")]);
//!
//! let metrics = MetricsRegistry::new();
//! metrics.increment_requests();
//! ```

mod logger;
mod metrics;

pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
