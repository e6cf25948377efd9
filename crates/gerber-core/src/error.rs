//! Error types for the Gerber kernels.

use thiserror::Error;

/// Result type alias using `KernelError`.
pub type Result<T> = std::result::Result<T, KernelError>;

/// Errors that can occur during kernel operations.
#[derive(Debug, Error)]
pub enum KernelError {
    /// A precondition on the kernel input was violated.
    ///
    /// Raised before any reduction starts; no partial work is performed.
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InputError),

    /// The denominator of a pair reduction vanished (`T + N == 0`).
    ///
    /// Only surfaced as an error in strict mode. Otherwise the cell is
    /// marked undefined and the computation continues.
    #[error("Numeric degenerate cell ({row}, {col}): denominator T + N is zero")]
    NumericDegenerate {
        /// Row index of the offending cell.
        row: usize,
        /// Column index of the offending cell.
        col: usize,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl KernelError {
    /// Create a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        KernelError::ConfigError(msg.into())
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        KernelError::InternalError(msg.into())
    }

    /// Create a numeric degenerate error for the given cell.
    #[must_use]
    pub fn degenerate(row: usize, col: usize) -> Self {
        KernelError::NumericDegenerate { row, col }
    }

    /// Returns true if this is an input validation error.
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, KernelError::InvalidInput(_))
    }

    /// Returns true if this is a numeric degenerate error.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        matches!(self, KernelError::NumericDegenerate { .. })
    }

    /// Returns the violated input precondition, if any.
    #[must_use]
    pub fn input_error(&self) -> Option<&InputError> {
        match self {
            KernelError::InvalidInput(e) => Some(e),
            _ => None,
        }
    }
}

/// Input preconditions that a returns matrix or threshold can violate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    /// Fewer than two periods; the sample standard deviation is undefined.
    #[error("at least 2 periods are required, got {periods}")]
    InsufficientPeriods {
        /// Number of periods supplied.
        periods: usize,
    },

    /// No assets were supplied.
    #[error("at least 1 asset is required")]
    NoAssets,

    /// Threshold multiplier is zero, negative or not finite.
    #[error("threshold value must be a positive finite number, got {value}")]
    NonPositiveThreshold {
        /// The rejected threshold value.
        value: f64,
    },

    /// A return is missing (NaN) or not finite.
    #[error("return for asset '{asset}' at period {period} is missing or not finite")]
    MissingValue {
        /// Label of the asset column.
        asset: String,
        /// Period (row) index.
        period: usize,
    },

    /// An asset's returns are too large for its deviation, threshold or
    /// covariance to be represented.
    #[error("return scale of asset '{asset}' overflows: std {std_dev}")]
    ScaleOverflow {
        /// Label of the asset column.
        asset: String,
        /// Sample standard deviation as computed.
        std_dev: f64,
    },

    /// Columns do not share the same number of periods.
    #[error("asset '{asset}' has {actual} periods, expected {expected}")]
    RaggedColumn {
        /// Label of the offending asset column.
        asset: String,
        /// Period count of the first column.
        expected: usize,
        /// Period count of the offending column.
        actual: usize,
    },

    /// Row does not carry one return per asset.
    #[error("period {period} has {actual} returns, expected {expected}")]
    RaggedRow {
        /// Period (row) index.
        period: usize,
        /// Number of assets.
        expected: usize,
        /// Number of returns in the row.
        actual: usize,
    },

    /// Label count differs from the column count.
    #[error("{labels} labels supplied for {columns} columns")]
    LabelMismatch {
        /// Number of labels.
        labels: usize,
        /// Number of columns.
        columns: usize,
    },

    /// The same label appears twice.
    #[error("duplicate asset label '{0}'")]
    DuplicateLabel(String),

    /// An asset index does not address a column.
    #[error("asset index {index} out of range for {assets} assets")]
    AssetIndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of assets.
        assets: usize,
    },
}
