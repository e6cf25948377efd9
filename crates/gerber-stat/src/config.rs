//! Gerber kernel configuration.
//!
//! Supports:
//! - Programmatic configuration via presets and a builder
//! - Environment variable overrides
//! - TOML files
//!
//! # Example
//!
//! ```rust,ignore
//! use gerber_stat::config::GerberConfig;
//!
//! let config = GerberConfig::from_file("config/gerber.toml")?;
//! let kernel = GerberStatistic::with_config(config);
//! ```

use crate::classify::AmbiguousPolicy;
use crate::threshold::DEFAULT_THRESHOLD_VALUE;
use gerber_core::error::{KernelError, Result};
use gerber_core::observability::LogConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Data-parallel execution over asset pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelConfig {
    /// Enable parallel pair scans
    pub enabled: bool,
    /// Minimum number of pairs before going parallel
    pub min_pairs: usize,
    /// Dedicated worker thread count (0 = shared global pool)
    pub worker_threads: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_pairs: 64,
            worker_threads: 0,
        }
    }
}

impl ParallelConfig {
    /// Sequential execution only
    pub fn sequential() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Whether `n_pairs` pairs should be scanned in parallel
    pub fn use_parallel(&self, n_pairs: usize) -> bool {
        self.enabled && n_pairs >= self.min_pairs
    }
}

/// Gerber kernel configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GerberConfig {
    /// Threshold multiplier `c` applied to each asset's standard deviation
    pub threshold_value: f64,
    /// Abort the whole computation on the first degenerate pair
    pub strict: bool,
    /// Treatment of periods where exactly one series breaches
    pub ambiguous_policy: AmbiguousPolicy,
    /// Parallel execution
    pub parallel: ParallelConfig,
    /// Logging
    pub logging: LogConfig,
}

impl Default for GerberConfig {
    fn default() -> Self {
        Self::development()
    }
}

impl GerberConfig {
    /// Development configuration - verbose logging
    pub fn development() -> Self {
        Self {
            threshold_value: DEFAULT_THRESHOLD_VALUE,
            strict: false,
            ambiguous_policy: AmbiguousPolicy::Exclude,
            parallel: ParallelConfig::default(),
            logging: LogConfig::development(),
        }
    }

    /// Production configuration - structured logging, large parallel batches
    pub fn production() -> Self {
        Self {
            parallel: ParallelConfig {
                enabled: true,
                min_pairs: 256,
                worker_threads: 0,
            },
            logging: LogConfig::production(),
            ..Self::development()
        }
    }

    /// Testing configuration - deterministic sequential execution
    pub fn testing() -> Self {
        Self {
            parallel: ParallelConfig::sequential(),
            logging: LogConfig::testing(),
            ..Self::development()
        }
    }

    /// Load configuration from environment variables
    ///
    /// `GERBER_ENV` picks the preset; `GERBER_THRESHOLD`, `GERBER_STRICT`,
    /// `GERBER_AMBIGUOUS_POLICY` and `GERBER_WORKER_THREADS` override it.
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var("GERBER_ENV")
            .as_deref()
            .unwrap_or("development")
        {
            "production" | "prod" => Self::production(),
            "testing" | "test" => Self::testing(),
            _ => Self::development(),
        };

        if let Ok(val) = std::env::var("GERBER_THRESHOLD") {
            config.threshold_value = val
                .parse()
                .map_err(|_| KernelError::config(format!("Invalid GERBER_THRESHOLD: {}", val)))?;
        }

        if let Ok(val) = std::env::var("GERBER_STRICT") {
            config.strict = val
                .parse()
                .map_err(|_| KernelError::config(format!("Invalid GERBER_STRICT: {}", val)))?;
        }

        if let Ok(val) = std::env::var("GERBER_AMBIGUOUS_POLICY") {
            config.ambiguous_policy = val.parse().map_err(KernelError::config)?;
        }

        if let Ok(val) = std::env::var("GERBER_WORKER_THREADS") {
            config.parallel.worker_threads = val.parse().map_err(|_| {
                KernelError::config(format!("Invalid GERBER_WORKER_THREADS: {}", val))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| KernelError::config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Serialize configuration to a TOML string
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| KernelError::config(format!("Failed to serialize config: {}", e)))
    }

    /// Save configuration to a TOML file
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = self.to_toml_string()?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !self.threshold_value.is_finite() || self.threshold_value <= 0.0 {
            return Err(KernelError::config(format!(
                "threshold_value must be a positive finite number, got {}",
                self.threshold_value
            )));
        }

        if self.parallel.enabled && self.parallel.min_pairs == 0 {
            tracing::warn!("parallel.min_pairs is 0; every computation will use the thread pool");
        }

        Ok(())
    }

    /// Set threshold value
    pub fn with_threshold_value(mut self, threshold_value: f64) -> Self {
        self.threshold_value = threshold_value;
        self
    }

    /// Set strict mode
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set ambiguous policy
    pub fn with_ambiguous_policy(mut self, policy: AmbiguousPolicy) -> Self {
        self.ambiguous_policy = policy;
        self
    }

    /// Set parallel configuration
    pub fn with_parallel(mut self, parallel: ParallelConfig) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set logging configuration
    pub fn with_logging(mut self, logging: LogConfig) -> Self {
        self.logging = logging;
        self
    }
}

/// Configuration builder
#[derive(Default)]
pub struct GerberConfigBuilder {
    config: GerberConfig,
}

impl GerberConfigBuilder {
    /// Create new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from production preset
    pub fn production() -> Self {
        Self {
            config: GerberConfig::production(),
        }
    }

    /// Start from testing preset
    pub fn testing() -> Self {
        Self {
            config: GerberConfig::testing(),
        }
    }

    /// Set threshold value
    pub fn threshold_value(mut self, threshold_value: f64) -> Self {
        self.config.threshold_value = threshold_value;
        self
    }

    /// Set strict mode
    pub fn strict(mut self, strict: bool) -> Self {
        self.config.strict = strict;
        self
    }

    /// Set ambiguous policy
    pub fn ambiguous_policy(mut self, policy: AmbiguousPolicy) -> Self {
        self.config.ambiguous_policy = policy;
        self
    }

    /// Configure parallel execution
    pub fn parallel(mut self, f: impl FnOnce(ParallelConfig) -> ParallelConfig) -> Self {
        self.config.parallel = f(self.config.parallel);
        self
    }

    /// Configure logging
    pub fn logging(mut self, f: impl FnOnce(LogConfig) -> LogConfig) -> Self {
        self.config.logging = f(self.config.logging);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<GerberConfig> {
        self.config.validate()?;
        Ok(self.config)
    }

    /// Build without validation
    pub fn build_unchecked(self) -> GerberConfig {
        self.config
    }
}
