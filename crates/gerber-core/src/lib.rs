//! # Gerber Core
//!
//! Core abstractions shared by the Gerber statistic kernels.
//!
//! This crate provides:
//! - The kernel error taxonomy (`KernelError`, `InputError`)
//! - Kernel metadata
//! - Trait definitions for batch kernels
//! - Log subscriber configuration

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod kernel;
pub mod observability;
pub mod traits;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{InputError, KernelError, Result};
    pub use crate::kernel::KernelMetadata;
    pub use crate::observability::{LogConfig, LogLevel, LogOutput};
    pub use crate::traits::{BatchKernel, Kernel};
}
