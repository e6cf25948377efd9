//! Gerber statistic types and data structures.

use gerber_core::error::{InputError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ============================================================================
// Returns
// ============================================================================

/// Periodic returns of K assets over T periods.
///
/// Stored column-major so that each asset's series is contiguous. Construction
/// validates the kernel preconditions, so every `ReturnsMatrix` has at least two
/// periods, at least one asset, unique labels and only finite entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ReturnsColumns", into = "ReturnsColumns")]
pub struct ReturnsMatrix {
    labels: Vec<String>,
    n_periods: usize,
    data: Vec<f64>,
}

/// Wire form of a returns matrix: one label and one series per asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnsColumns {
    /// Asset labels in column order.
    pub labels: Vec<String>,
    /// One return series per asset, aligned by period index.
    pub columns: Vec<Vec<f64>>,
}

impl ReturnsMatrix {
    /// Build from one return series per asset.
    pub fn from_columns<L, S>(labels: L, columns: Vec<Vec<f64>>) -> Result<Self>
    where
        L: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        Self::build(labels, columns).map_err(Into::into)
    }

    fn build(
        labels: Vec<String>,
        columns: Vec<Vec<f64>>,
    ) -> std::result::Result<Self, InputError> {
        Self::validate_labels(&labels, columns.len())?;

        let n_periods = columns[0].len();
        for (label, column) in labels.iter().zip(columns.iter()) {
            if column.len() != n_periods {
                return Err(InputError::RaggedColumn {
                    asset: label.clone(),
                    expected: n_periods,
                    actual: column.len(),
                });
            }
        }
        if n_periods < 2 {
            return Err(InputError::InsufficientPeriods { periods: n_periods });
        }

        let mut data = Vec::with_capacity(n_periods * columns.len());
        for (label, column) in labels.iter().zip(columns) {
            if let Some(period) = column.iter().position(|r| !r.is_finite()) {
                return Err(InputError::MissingValue {
                    asset: label.clone(),
                    period,
                });
            }
            data.extend(column);
        }

        Ok(Self {
            labels,
            n_periods,
            data,
        })
    }

    /// Build from one row of returns per period (one entry per asset).
    pub fn from_rows<L, S>(labels: L, rows: &[Vec<f64>]) -> Result<Self>
    where
        L: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        let n_assets = labels.len();

        for (period, row) in rows.iter().enumerate() {
            if row.len() != n_assets {
                return Err(InputError::RaggedRow {
                    period,
                    expected: n_assets,
                    actual: row.len(),
                }
                .into());
            }
        }

        let columns = (0..n_assets)
            .map(|k| rows.iter().map(|row| row[k]).collect())
            .collect();
        Self::from_columns(labels, columns)
    }

    /// Build from unlabelled columns; assets are labelled `asset_0`, `asset_1`, ...
    pub fn from_unlabeled_columns(columns: Vec<Vec<f64>>) -> Result<Self> {
        let labels: Vec<String> = (0..columns.len()).map(|k| format!("asset_{}", k)).collect();
        Self::from_columns(labels, columns)
    }

    fn validate_labels(
        labels: &[String],
        n_columns: usize,
    ) -> std::result::Result<(), InputError> {
        if n_columns == 0 {
            return Err(InputError::NoAssets);
        }
        if labels.len() != n_columns {
            return Err(InputError::LabelMismatch {
                labels: labels.len(),
                columns: n_columns,
            });
        }
        let mut seen = HashSet::with_capacity(labels.len());
        for label in labels {
            if !seen.insert(label.as_str()) {
                return Err(InputError::DuplicateLabel(label.clone()));
            }
        }
        Ok(())
    }

    /// Number of periods (T).
    pub fn n_periods(&self) -> usize {
        self.n_periods
    }

    /// Number of assets (K).
    pub fn n_assets(&self) -> usize {
        self.labels.len()
    }

    /// Asset labels in column order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Return series of asset `k`.
    ///
    /// # Panics
    ///
    /// Panics if `k >= n_assets()`.
    pub fn column(&self, k: usize) -> &[f64] {
        &self.data[k * self.n_periods..(k + 1) * self.n_periods]
    }

    /// Iterate over the asset columns in order.
    pub fn columns(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.n_periods)
    }

    /// Return of asset `k` at period `t`.
    pub fn get(&self, t: usize, k: usize) -> Option<f64> {
        if t >= self.n_periods || k >= self.n_assets() {
            return None;
        }
        Some(self.data[k * self.n_periods + t])
    }

    /// Column index of a label.
    pub fn position(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }
}

impl TryFrom<ReturnsColumns> for ReturnsMatrix {
    type Error = InputError;

    fn try_from(value: ReturnsColumns) -> std::result::Result<Self, Self::Error> {
        Self::build(value.labels, value.columns)
    }
}

impl From<ReturnsMatrix> for ReturnsColumns {
    fn from(value: ReturnsMatrix) -> Self {
        let columns = value.columns().map(<[f64]>::to_vec).collect();
        Self {
            labels: value.labels,
            columns,
        }
    }
}

// ============================================================================
// Thresholds
// ============================================================================

/// Per-asset breach thresholds `H[k] = c * std[k]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdVector {
    /// Threshold multiplier `c`.
    pub threshold_value: f64,
    /// Sample standard deviation of each asset.
    pub std_devs: Vec<f64>,
    /// Breach threshold of each asset.
    pub thresholds: Vec<f64>,
}

impl ThresholdVector {
    /// Number of assets.
    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    /// Whether the vector is empty.
    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }
}

// ============================================================================
// Pair Counters
// ============================================================================

/// Joint-observation counters for one asset pair.
///
/// Discordant and neutral counts are kept as negative magnitudes so the
/// statistic reads `(P + M) / (T + N)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairCounts {
    /// Concordant periods (`P >= 0`).
    pub concordant: i64,
    /// Negated discordant periods (`M <= 0`).
    pub discordant: i64,
    /// Negated neutral periods (`N <= 0`).
    pub neutral: i64,
}

impl PairCounts {
    /// Denominator `T + N` for a sample of `periods` periods.
    pub fn denominator(&self, periods: usize) -> i64 {
        periods as i64 + self.neutral
    }

    /// Gerber statistic `(P + M) / (T + N)`, or `None` when the denominator vanishes.
    pub fn statistic(&self, periods: usize) -> Option<f64> {
        let denominator = self.denominator(periods);
        if denominator == 0 {
            return None;
        }
        Some((self.concordant + self.discordant) as f64 / denominator as f64)
    }

    /// Number of neutral periods as a non-negative count.
    pub fn neutral_periods(&self) -> usize {
        self.neutral.unsigned_abs() as usize
    }

    /// Number of discordant periods as a non-negative count.
    pub fn discordant_periods(&self) -> usize {
        self.discordant.unsigned_abs() as usize
    }
}

// ============================================================================
// Matrices
// ============================================================================

/// Dense K x K matrix, row-major, with undefined cells.
///
/// A `None` cell marks a numeric degenerate entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GerberMatrix {
    n: usize,
    cells: Vec<Option<f64>>,
}

impl GerberMatrix {
    /// Create an `n` x `n` matrix with every cell undefined.
    pub fn undefined(n: usize) -> Self {
        Self {
            n,
            cells: vec![None; n * n],
        }
    }

    /// Dimension of the matrix.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Cell `(i, j)`; `None` if out of range or degenerate.
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i >= self.n || j >= self.n {
            return None;
        }
        self.cells[i * self.n + j]
    }

    /// Set cell `(i, j)` and its mirror `(j, i)`.
    pub(crate) fn set_symmetric(&mut self, i: usize, j: usize, value: Option<f64>) {
        self.cells[i * self.n + j] = value;
        self.cells[j * self.n + i] = value;
    }

    /// Row `i` of the matrix.
    pub fn row(&self, i: usize) -> &[Option<f64>] {
        &self.cells[i * self.n..(i + 1) * self.n]
    }

    /// All cells, row-major.
    pub fn cells(&self) -> &[Option<f64>] {
        &self.cells
    }

    /// Dense row-major export with `fill` substituted for degenerate cells.
    pub fn to_dense(&self, fill: f64) -> Vec<f64> {
        self.cells.iter().map(|c| c.unwrap_or(fill)).collect()
    }

    /// Whether every cell equals its mirror.
    pub fn is_symmetric(&self) -> bool {
        (0..self.n).all(|i| (0..i).all(|j| self.get(i, j) == self.get(j, i)))
    }

    /// Whether every cell is defined.
    pub fn is_complete(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }
}

/// A cell whose pair reduction had a vanishing denominator.
///
/// Recorded once per unordered pair with `row >= col`; the mirror cell is
/// undefined as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DegenerateCell {
    /// Row index (the larger of the pair).
    pub row: usize,
    /// Column index (the smaller of the pair).
    pub col: usize,
}

/// Gerber correlation and covariance for a returns sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GerberResult {
    /// Asset labels, indexing both matrices.
    pub labels: Vec<String>,
    /// Gerber correlation matrix.
    pub correlation: GerberMatrix,
    /// Gerber covariance matrix.
    pub covariance: GerberMatrix,
    /// Sample standard deviation of each asset.
    pub std_devs: Vec<f64>,
    /// Cells with a vanishing denominator.
    pub degenerate: Vec<DegenerateCell>,
    /// Number of periods in the sample.
    pub periods: usize,
    /// Threshold multiplier used.
    pub threshold_value: f64,
}

impl GerberResult {
    /// Number of assets.
    pub fn n_assets(&self) -> usize {
        self.labels.len()
    }

    /// Matrix index of a label.
    pub fn position(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// Correlation between two labelled assets.
    ///
    /// `None` if either label is unknown or the cell is degenerate.
    pub fn correlation_between(&self, a: &str, b: &str) -> Option<f64> {
        self.correlation.get(self.position(a)?, self.position(b)?)
    }

    /// Covariance between two labelled assets.
    ///
    /// `None` if either label is unknown or the cell is degenerate.
    pub fn covariance_between(&self, a: &str, b: &str) -> Option<f64> {
        self.covariance.get(self.position(a)?, self.position(b)?)
    }

    /// Whether cell `(i, j)` is degenerate.
    pub fn is_degenerate(&self, i: usize, j: usize) -> bool {
        let (row, col) = if i >= j { (i, j) } else { (j, i) };
        self.degenerate
            .iter()
            .any(|c| c.row == row && c.col == col)
    }

    /// Whether any cell is degenerate.
    pub fn has_degenerate(&self) -> bool {
        !self.degenerate.is_empty()
    }
}
