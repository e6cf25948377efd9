//! # Gerber
//!
//! Robust Gerber co-movement statistic for portfolio construction.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use gerber::prelude::*;
//!
//! let returns = ReturnsMatrix::from_columns(
//!     ["SPX", "AGG"],
//!     vec![vec![0.012, -0.004, 0.020, -0.015], vec![-0.002, 0.003, -0.006, 0.004]],
//! )?;
//!
//! let result = GerberStatistic::compute(&returns, 0.5)?;
//! println!("cor(SPX, AGG) = {:?}", result.correlation_between("SPX", "AGG"));
//! ```
//!
//! Configured execution loads `GerberConfig` from TOML or the `GERBER_*`
//! environment variables and installs its log subscriber:
//!
//! ```rust,ignore
//! let config = GerberConfig::from_env()?;
//! config.logging.init()?;
//! let kernel = GerberStatistic::with_config(config);
//! let result = kernel.compute_with(&returns)?;
//! ```

#![warn(missing_docs)]

/// Re-export core
pub use gerber_core as core;

/// Re-export the statistic crate
pub use gerber_stat as stat;

/// Prelude for convenient imports.
pub mod prelude {
    pub use gerber_core::prelude::*;
    pub use gerber_stat::prelude::*;
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
