//! Observability Infrastructure
//!
//! Kernels instrument themselves with `tracing` spans and events. Hosts
//! decide where those go by initializing a [`LogConfig`].

pub mod logging;

pub use logging::{LogConfig, LogLevel, LogOutput};
