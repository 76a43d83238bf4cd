//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Operation state machines produce:
//!     → tracing events (submissions, transitions, classified failures)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → logging.rs subscriber (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```

pub mod logging;
pub mod metrics;
