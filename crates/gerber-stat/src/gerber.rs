//! Gerber statistic kernel.
//!
//! Computes the Gerber correlation and covariance matrices of a returns
//! sample:
//! - Per-asset thresholds `H[k] = c * std[k]`
//! - Per-pair concordant/discordant/neutral counters
//! - `cor[i][j] = (P + M) / (T + N)`, `cov[i][j] = cor[i][j] * std[i] * std[j]`
//!
//! Pairs are independent, so the scan is split across a rayon pool once the
//! pair count justifies it.

use crate::assemble::{assemble, lower_triangle_pairs, PairTally};
use crate::classify::{count_pair, AmbiguousPolicy, PairRule};
use crate::config::{GerberConfig, ParallelConfig};
use crate::messages::{GerberInput, GerberOutput};
use crate::threshold::{derive_thresholds, sample_std, validate_threshold_value};
use crate::types::{GerberResult, PairCounts, ReturnsMatrix, ThresholdVector};
use async_trait::async_trait;
use gerber_core::error::{InputError, KernelError, Result};
use gerber_core::kernel::KernelMetadata;
use gerber_core::traits::{BatchKernel, Kernel};
use rayon::prelude::*;
use std::time::Instant;

// ============================================================================
// Gerber Statistic Kernel
// ============================================================================

/// Gerber statistic kernel.
///
/// Produces a robust co-movement matrix that ignores small, noisy moves and
/// counts joint breaches of per-asset thresholds instead. Subtracting the
/// neutral periods from the denominator keeps the matrix positive
/// semi-definite.
#[derive(Debug, Clone)]
pub struct GerberStatistic {
    metadata: KernelMetadata,
    config: GerberConfig,
}

impl Default for GerberStatistic {
    fn default() -> Self {
        Self::new()
    }
}

impl GerberStatistic {
    /// Create a new Gerber statistic kernel.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(GerberConfig::default())
    }

    /// Create with custom configuration.
    #[must_use]
    pub fn with_config(config: GerberConfig) -> Self {
        Self {
            metadata: KernelMetadata::batch("risk/gerber-statistic")
                .with_description("Gerber correlation and covariance matrices")
                .with_throughput(1_000)
                .with_latency_us(500.0),
            config,
        }
    }

    /// Kernel configuration.
    pub fn config(&self) -> &GerberConfig {
        &self.config
    }

    /// Compute the Gerber matrices with the reference rules.
    ///
    /// Ambiguous periods are excluded, degenerate cells are recorded rather
    /// than fatal, and pairs are scanned sequentially.
    pub fn compute(returns: &ReturnsMatrix, threshold_value: f64) -> Result<GerberResult> {
        run(
            returns,
            threshold_value,
            &AmbiguousPolicy::Exclude,
            false,
            &ParallelConfig::sequential(),
        )
    }

    /// Compute with this kernel's configuration.
    pub fn compute_with(&self, returns: &ReturnsMatrix) -> Result<GerberResult> {
        self.compute_with_threshold(returns, self.config.threshold_value)
    }

    /// Compute with this kernel's configuration and another threshold multiplier.
    pub fn compute_with_threshold(
        &self,
        returns: &ReturnsMatrix,
        threshold_value: f64,
    ) -> Result<GerberResult> {
        self.compute_with_rule(returns, threshold_value, &self.config.ambiguous_policy)
    }

    /// Compute with a caller-supplied classification rule.
    ///
    /// Strict mode and parallelism still follow the kernel configuration.
    pub fn compute_with_rule<R>(
        &self,
        returns: &ReturnsMatrix,
        threshold_value: f64,
        rule: &R,
    ) -> Result<GerberResult>
    where
        R: PairRule + Sync + ?Sized,
    {
        run(
            returns,
            threshold_value,
            rule,
            self.config.strict,
            &self.config.parallel,
        )
    }

    /// Raw counters for the pair of assets `(i, j)`.
    pub fn pair_counts<R>(
        returns: &ReturnsMatrix,
        i: usize,
        j: usize,
        threshold_value: f64,
        rule: &R,
    ) -> Result<PairCounts>
    where
        R: PairRule + ?Sized,
    {
        validate_threshold_value(threshold_value)?;
        let assets = returns.n_assets();
        for index in [i, j] {
            if index >= assets {
                return Err(InputError::AssetIndexOutOfRange { index, assets }.into());
            }
        }

        let (x, y) = (returns.column(i), returns.column(j));
        let insufficient = || InputError::InsufficientPeriods {
            periods: returns.n_periods(),
        };
        let h_x = threshold_value * sample_std(x).ok_or_else(insufficient)?;
        let h_y = threshold_value * sample_std(y).ok_or_else(insufficient)?;

        Ok(count_pair(x, y, h_x, h_y, rule))
    }
}

fn run<R>(
    returns: &ReturnsMatrix,
    threshold_value: f64,
    rule: &R,
    strict: bool,
    parallel: &ParallelConfig,
) -> Result<GerberResult>
where
    R: PairRule + Sync + ?Sized,
{
    let start = Instant::now();
    let span = tracing::debug_span!(
        "gerber",
        assets = returns.n_assets(),
        periods = returns.n_periods(),
        threshold_value
    );
    let _enter = span.enter();

    let thresholds = derive_thresholds(returns, threshold_value)?;
    let pairs = lower_triangle_pairs(returns.n_assets());
    let tallies = tally_pairs(returns, &thresholds, rule, &pairs, parallel)?;
    let assembled = assemble(&tallies, &thresholds, returns.n_periods(), strict)?;

    tracing::debug!(
        pairs = pairs.len(),
        degenerate = assembled.degenerate.len(),
        elapsed_us = start.elapsed().as_micros() as u64,
        "Gerber matrices assembled"
    );

    Ok(GerberResult {
        labels: returns.labels().to_vec(),
        correlation: assembled.correlation,
        covariance: assembled.covariance,
        std_devs: thresholds.std_devs,
        degenerate: assembled.degenerate,
        periods: returns.n_periods(),
        threshold_value,
    })
}

fn tally_pairs<R>(
    returns: &ReturnsMatrix,
    thresholds: &ThresholdVector,
    rule: &R,
    pairs: &[(usize, usize)],
    parallel: &ParallelConfig,
) -> Result<Vec<PairTally>>
where
    R: PairRule + Sync + ?Sized,
{
    let h = &thresholds.thresholds;
    let scan = |&(i, j): &(usize, usize)| PairTally {
        row: i,
        col: j,
        counts: count_pair(returns.column(i), returns.column(j), h[i], h[j], rule),
    };

    if !parallel.use_parallel(pairs.len()) {
        tracing::debug!(pairs = pairs.len(), "scanning pairs sequentially");
        return Ok(pairs.iter().map(scan).collect());
    }

    if parallel.worker_threads == 0 {
        tracing::debug!(pairs = pairs.len(), "scanning pairs on the global pool");
        return Ok(pairs.par_iter().map(scan).collect());
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(parallel.worker_threads)
        .build()
        .map_err(|e| KernelError::internal(format!("Failed to build thread pool: {}", e)))?;
    tracing::debug!(
        pairs = pairs.len(),
        worker_threads = parallel.worker_threads,
        "scanning pairs on a dedicated pool"
    );
    Ok(pool.install(|| pairs.par_iter().map(scan).collect()))
}

impl Kernel for GerberStatistic {
    fn metadata(&self) -> &KernelMetadata {
        &self.metadata
    }

    fn validate(&self) -> Result<()> {
        self.config.validate()
    }
}

#[async_trait]
impl BatchKernel<GerberInput, GerberOutput> for GerberStatistic {
    async fn execute(&self, input: GerberInput) -> Result<GerberOutput> {
        self.validate_input(&input)?;
        let start = Instant::now();
        let threshold_value = input
            .threshold_value
            .unwrap_or(self.config.threshold_value);
        let result = self.compute_with_threshold(&input.returns, threshold_value)?;
        Ok(GerberOutput {
            result,
            compute_time_us: start.elapsed().as_micros() as u64,
        })
    }

    fn validate_input(&self, input: &GerberInput) -> Result<()> {
        validate_threshold_value(
            input
                .threshold_value
                .unwrap_or(self.config.threshold_value),
        )
    }
}
