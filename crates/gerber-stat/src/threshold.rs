//! Breach thresholds.
//!
//! Each asset's threshold is a multiple of its sample standard deviation:
//! `H[k] = c * std[k]`.

use crate::types::{ReturnsMatrix, ThresholdVector};
use gerber_core::error::{InputError, Result};

/// Default threshold multiplier.
pub const DEFAULT_THRESHOLD_VALUE: f64 = 0.5;

/// Check that a threshold multiplier is positive and finite.
pub fn validate_threshold_value(threshold_value: f64) -> Result<()> {
    if !threshold_value.is_finite() || threshold_value <= 0.0 {
        return Err(InputError::NonPositiveThreshold {
            value: threshold_value,
        }
        .into());
    }
    Ok(())
}

/// Sample standard deviation (n - 1 denominator).
///
/// Returns `None` for fewer than two observations.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let ss = values.iter().map(|&x| (x - mean).powi(2)).sum::<f64>();
    Some((ss / (n - 1) as f64).sqrt())
}

/// Derive per-asset thresholds for a returns sample.
///
/// Every standard deviation, threshold and squared deviation must be finite;
/// an asset whose scale overflows is rejected before any pair is reduced.
pub fn derive_thresholds(returns: &ReturnsMatrix, threshold_value: f64) -> Result<ThresholdVector> {
    validate_threshold_value(threshold_value)?;

    let mut std_devs = Vec::with_capacity(returns.n_assets());
    for (label, column) in returns.labels().iter().zip(returns.columns()) {
        let std_dev = sample_std(column).ok_or(InputError::InsufficientPeriods {
            periods: column.len(),
        })?;
        // std^2 bounds every std_i * std_j product used for covariance.
        if !(std_dev * std_dev).is_finite() || !(threshold_value * std_dev).is_finite() {
            return Err(InputError::ScaleOverflow {
                asset: label.clone(),
                std_dev,
            }
            .into());
        }
        std_devs.push(std_dev);
    }

    let thresholds = std_devs.iter().map(|s| threshold_value * s).collect();

    Ok(ThresholdVector {
        threshold_value,
        std_devs,
        thresholds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_std() {
        // Mean 6, sample variance 10
        let s = sample_std(&[2.0, 4.0, 6.0, 8.0, 10.0]).unwrap();
        assert!((s - 10.0_f64.sqrt()).abs() < 1e-12);

        assert_eq!(sample_std(&[1.0]), None);
        assert_eq!(sample_std(&[0.0, 0.0, 0.0]), Some(0.0));
    }

    #[test]
    fn test_derive_thresholds() {
        let returns = ReturnsMatrix::from_columns(
            ["A", "B"],
            vec![vec![2.0, 4.0, 6.0, 8.0, 10.0], vec![0.0; 5]],
        )
        .unwrap();

        let h = derive_thresholds(&returns, 0.5).unwrap();
        assert_eq!(h.len(), 2);
        assert_eq!(h.threshold_value, 0.5);
        assert_eq!(h.thresholds[0], 0.5 * h.std_devs[0]);
        assert_eq!(h.thresholds[1], 0.0);
    }

    #[test]
    fn test_threshold_value_rejected() {
        let returns = ReturnsMatrix::from_columns(["A"], vec![vec![0.01, -0.01]]).unwrap();

        for bad in [0.0, -0.5, f64::NAN, f64::INFINITY] {
            let err = derive_thresholds(&returns, bad).unwrap_err();
            assert!(
                matches!(
                    err.input_error(),
                    Some(InputError::NonPositiveThreshold { .. })
                ),
                "threshold {} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_overflowing_scale_rejected() {
        let returns = ReturnsMatrix::from_columns(
            ["BIG", "A"],
            vec![
                vec![1e308, -1e308, 1e308, -1e308],
                vec![0.02, -0.02, 0.01, -0.001],
            ],
        )
        .unwrap();

        let err = derive_thresholds(&returns, 0.5).unwrap_err();
        assert!(matches!(
            err.input_error(),
            Some(InputError::ScaleOverflow { asset, .. }) if asset == "BIG"
        ));

        // Finite deviation, but the threshold itself overflows.
        let returns =
            ReturnsMatrix::from_columns(["WIDE"], vec![vec![1e10, -1e10, 1e10]]).unwrap();
        let err = derive_thresholds(&returns, 1e300).unwrap_err();
        assert!(matches!(
            err.input_error(),
            Some(InputError::ScaleOverflow { std_dev, .. }) if std_dev.is_finite()
        ));
    }

    #[test]
    fn test_thresholds_scale_with_value() {
        let returns =
            ReturnsMatrix::from_columns(["A"], vec![vec![0.03, -0.01, 0.02, -0.04]]).unwrap();
        let low = derive_thresholds(&returns, 0.25).unwrap();
        let high = derive_thresholds(&returns, 1.0).unwrap();
        assert_eq!(low.std_devs, high.std_devs);
        assert!(high.thresholds[0] > low.thresholds[0]);
    }
}
