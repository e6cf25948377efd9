//! Matrix assembly.
//!
//! Turns per-pair counters into the symmetric correlation and covariance
//! matrices. Each unordered pair writes its cell and the mirror exactly once.

use crate::types::{DegenerateCell, GerberMatrix, PairCounts, ThresholdVector};
use gerber_core::error::{KernelError, Result};

/// Counters for the pair `(row, col)` with `row >= col`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairTally {
    /// Row index.
    pub row: usize,
    /// Column index.
    pub col: usize,
    /// Joint-observation counters.
    pub counts: PairCounts,
}

/// Assembled correlation and covariance matrices.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledMatrices {
    /// Gerber correlation.
    pub correlation: GerberMatrix,
    /// Gerber covariance.
    pub covariance: GerberMatrix,
    /// Cells with a vanishing denominator, in pair order.
    pub degenerate: Vec<DegenerateCell>,
}

/// Lower-triangle pairs `(i, j)` with `j <= i`, diagonal included, in row order.
pub fn lower_triangle_pairs(n_assets: usize) -> Vec<(usize, usize)> {
    let mut pairs = Vec::with_capacity(n_assets * (n_assets + 1) / 2);
    for i in 0..n_assets {
        for j in 0..=i {
            pairs.push((i, j));
        }
    }
    pairs
}

/// Reduce pair counters into correlation and covariance matrices.
///
/// Covariance is `cor * (std_i * std_j)`; the product of the two deviations
/// is commutative, so both triangles hold the exact same value.
///
/// A pair whose denominator `T + N` is zero leaves both cells undefined. In
/// strict mode the first such pair aborts the assembly with
/// `KernelError::NumericDegenerate`.
pub fn assemble(
    tallies: &[PairTally],
    thresholds: &ThresholdVector,
    periods: usize,
    strict: bool,
) -> Result<AssembledMatrices> {
    let n = thresholds.len();
    let std = &thresholds.std_devs;
    let mut correlation = GerberMatrix::undefined(n);
    let mut covariance = GerberMatrix::undefined(n);
    let mut degenerate = Vec::new();

    for tally in tallies {
        let (i, j) = (tally.row, tally.col);
        if i >= n || j >= n {
            return Err(KernelError::internal(format!(
                "pair ({}, {}) out of range for {} assets",
                i, j, n
            )));
        }

        match tally.counts.statistic(periods) {
            Some(cor) => {
                correlation.set_symmetric(i, j, Some(cor));
                covariance.set_symmetric(i, j, Some(cor * (std[i] * std[j])));
            }
            None if strict => {
                tracing::info!(row = i, col = j, "strict mode: aborting on degenerate pair");
                return Err(KernelError::degenerate(i, j));
            }
            None => {
                tracing::warn!(
                    row = i,
                    col = j,
                    periods,
                    neutral = tally.counts.neutral_periods(),
                    "degenerate Gerber cell: denominator T + N is zero"
                );
                degenerate.push(DegenerateCell { row: i, col: j });
            }
        }
    }

    Ok(AssembledMatrices {
        correlation,
        covariance,
        degenerate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds(std_devs: Vec<f64>) -> ThresholdVector {
        let thresholds = std_devs.iter().map(|s| 0.5 * s).collect();
        ThresholdVector {
            threshold_value: 0.5,
            std_devs,
            thresholds,
        }
    }

    fn tally(row: usize, col: usize, p: i64, m: i64, n: i64) -> PairTally {
        PairTally {
            row,
            col,
            counts: PairCounts {
                concordant: p,
                discordant: m,
                neutral: n,
            },
        }
    }

    #[test]
    fn test_lower_triangle_pairs() {
        assert_eq!(
            lower_triangle_pairs(3),
            vec![(0, 0), (1, 0), (1, 1), (2, 0), (2, 1), (2, 2)]
        );
        assert!(lower_triangle_pairs(0).is_empty());
    }

    #[test]
    fn test_assemble_mirrors_and_scales() {
        let h = thresholds(vec![0.02, 0.04]);
        let tallies = [
            tally(0, 0, 3, 0, -1),
            tally(1, 0, 2, -1, -1),
            tally(1, 1, 4, 0, 0),
        ];

        let out = assemble(&tallies, &h, 4, false).unwrap();

        assert_eq!(out.correlation.get(0, 0), Some(1.0));
        assert_eq!(out.correlation.get(1, 1), Some(1.0));
        let cor = (2.0 - 1.0) / 3.0;
        assert_eq!(out.correlation.get(1, 0), Some(cor));
        assert_eq!(out.correlation.get(0, 1), Some(cor));
        assert_eq!(out.covariance.get(0, 1), Some(cor * (0.02 * 0.04)));
        assert!(out.covariance.is_symmetric());
        assert!(out.degenerate.is_empty());
    }

    #[test]
    fn test_covariance_exact_in_both_triangles() {
        let std_devs = vec![0.0173, 0.0291, 0.00457, 0.112];
        let h = thresholds(std_devs.clone());
        let tallies: Vec<PairTally> = lower_triangle_pairs(4)
            .into_iter()
            .map(|(i, j)| {
                if i == j {
                    tally(i, j, 7, 0, -3)
                } else {
                    tally(i, j, 2 + i as i64, -(1 + j as i64), -1)
                }
            })
            .collect();

        let out = assemble(&tallies, &h, 10, false).unwrap();

        for i in 0..4 {
            for j in 0..4 {
                let cor = out.correlation.get(i, j).unwrap();
                let cov = out.covariance.get(i, j).unwrap();
                assert_eq!(
                    cov.to_bits(),
                    (cor * (std_devs[i] * std_devs[j])).to_bits(),
                    "cov[{}][{}]",
                    i,
                    j
                );
                assert_eq!(cov.to_bits(), out.covariance.get(j, i).unwrap().to_bits());
            }
        }
    }

    #[test]
    fn test_degenerate_cell_marked() {
        let h = thresholds(vec![0.0, 0.04]);
        let tallies = [
            tally(0, 0, 0, 0, -4),
            tally(1, 0, 0, 0, -4),
            tally(1, 1, 4, 0, 0),
        ];

        let out = assemble(&tallies, &h, 4, false).unwrap();

        assert_eq!(
            out.degenerate,
            vec![DegenerateCell { row: 0, col: 0 }, DegenerateCell { row: 1, col: 0 }]
        );
        assert_eq!(out.correlation.get(1, 0), None);
        assert_eq!(out.correlation.get(0, 1), None);
        assert_eq!(out.covariance.get(0, 1), None);
        assert_eq!(out.correlation.get(1, 1), Some(1.0));
    }

    #[test]
    fn test_strict_mode_aborts() {
        let h = thresholds(vec![0.0, 0.04]);
        let tallies = [tally(0, 0, 0, 0, -4), tally(1, 0, 0, 0, -4)];

        let err = assemble(&tallies, &h, 4, true).unwrap_err();
        assert!(matches!(
            err,
            KernelError::NumericDegenerate { row: 0, col: 0 }
        ));
    }

    #[test]
    fn test_out_of_range_pair() {
        let h = thresholds(vec![0.02]);
        let err = assemble(&[tally(1, 0, 1, 0, 0)], &h, 2, false).unwrap_err();
        assert!(matches!(err, KernelError::InternalError(_)));
    }
}
