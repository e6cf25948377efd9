//! # Gerber Statistic
//!
//! Robust co-movement matrices for portfolio construction.
//!
//! The Gerber statistic counts how often two assets breach their own
//! volatility-scaled thresholds together, ignoring the small moves that add
//! noise to a Pearson correlation.
//!
//! ## Stages
//!
//! - `threshold` - per-asset sample standard deviation and threshold `H = c * std`
//! - `classify` - joint-observation classification and counter rules
//! - `assemble` - reduction of pair counters into symmetric matrices
//!
//! ## Kernels
//!
//! - `GerberStatistic` - Gerber correlation and covariance (batch)

#![warn(missing_docs)]

pub mod assemble;
pub mod classify;
pub mod config;
pub mod gerber;
pub mod messages;
pub mod threshold;
pub mod types;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::classify::*;
    pub use crate::config::*;
    pub use crate::gerber::*;
    pub use crate::messages::*;
    pub use crate::threshold::*;
    pub use crate::types::*;
}

// Re-export main kernel
pub use gerber::GerberStatistic;

// Re-export key types
pub use classify::{AmbiguousAsNeutral, AmbiguousPolicy, ExcludeAmbiguous, PairRule};
pub use config::{GerberConfig, GerberConfigBuilder, ParallelConfig};
pub use messages::{GerberInput, GerberOutput};
pub use types::{
    DegenerateCell, GerberMatrix, GerberResult, PairCounts, ReturnsMatrix, ThresholdVector,
};
