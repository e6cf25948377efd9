//! Message types for the Gerber kernels.
//!
//! Input/output types for batch execution.

use crate::types::{GerberResult, ReturnsMatrix};
use serde::{Deserialize, Serialize};

/// Input for the Gerber statistic kernel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GerberInput {
    /// Periodic returns, one labelled column per asset.
    pub returns: ReturnsMatrix,
    /// Threshold multiplier; the kernel's configured value when `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold_value: Option<f64>,
}

impl GerberInput {
    /// Create a new input using the kernel's configured threshold.
    pub fn new(returns: ReturnsMatrix) -> Self {
        Self {
            returns,
            threshold_value: None,
        }
    }

    /// Override the threshold multiplier.
    pub fn with_threshold_value(mut self, threshold_value: f64) -> Self {
        self.threshold_value = Some(threshold_value);
        self
    }
}

/// Output from the Gerber statistic kernel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GerberOutput {
    /// Correlation, covariance and degenerate cells.
    pub result: GerberResult,
    /// Computation time in microseconds.
    pub compute_time_us: u64,
}
