//! Integration tests for the Gerber crates
//!
//! These tests drive the statistic end to end through the facade.

use gerber::core::error::{InputError, KernelError};
use gerber::core::traits::{BatchKernel, Kernel};
use gerber::stat::{
    AmbiguousPolicy, GerberConfig, GerberInput, GerberResult, GerberStatistic, ParallelConfig,
    ReturnsMatrix,
};

fn market_returns(n_assets: usize, n_periods: usize, seed: u64) -> ReturnsMatrix {
    let mut state = seed;
    let mut next = || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        (state as f64 / u64::MAX as f64) - 0.5
    };

    let mut market = Vec::with_capacity(n_periods);
    for _ in 0..n_periods {
        market.push(next() * 0.03);
    }

    let mut columns = Vec::with_capacity(n_assets);
    for k in 0..n_assets {
        let beta = 1.0 - 0.25 * k as f64;
        let mut column = Vec::with_capacity(n_periods);
        for m in &market {
            column.push(beta * m + next() * 0.015);
        }
        columns.push(column);
    }

    let labels: Vec<String> = (0..n_assets).map(|k| format!("ASSET{}", k)).collect();
    ReturnsMatrix::from_columns(labels, columns).unwrap()
}

// ============================================================================
// Reference Scenarios
// ============================================================================

#[test]
fn test_identical_series() {
    let a = vec![0.02, -0.02, 0.01, -0.01];
    let returns = ReturnsMatrix::from_columns(["A", "B"], vec![a.clone(), a]).unwrap();

    let result = GerberStatistic::compute(&returns, 0.5).unwrap();

    for i in 0..2 {
        for j in 0..2 {
            assert_eq!(result.correlation.get(i, j), Some(1.0));
        }
    }
}

#[test]
fn test_mirrored_series() {
    let a = vec![0.02, -0.02, 0.01, -0.01];
    let b = a.iter().map(|r| -r).collect();
    let returns = ReturnsMatrix::from_columns(["A", "B"], vec![a, b]).unwrap();

    let result = GerberStatistic::compute(&returns, 0.5).unwrap();

    assert_eq!(result.correlation.get(0, 1), Some(-1.0));
    assert_eq!(result.correlation.get(1, 0), Some(-1.0));
}

#[test]
fn test_flat_asset_is_reported_not_nan() {
    let returns = ReturnsMatrix::from_columns(
        ["A", "FLAT"],
        vec![vec![0.02, -0.02, 0.01, -0.01], vec![0.0; 4]],
    )
    .unwrap();

    let result = GerberStatistic::compute(&returns, 0.5).unwrap();

    assert!(result.is_degenerate(1, 1));
    assert!(result
        .correlation
        .cells()
        .iter()
        .flatten()
        .all(|c| c.is_finite()));
    assert!(result.correlation.to_dense(f64::NAN)[3].is_nan());
}

#[test]
fn test_single_period_rejected() {
    let err = ReturnsMatrix::from_columns(["A", "B"], vec![vec![0.01], vec![0.02]]).unwrap_err();
    assert!(matches!(
        err,
        KernelError::InvalidInput(InputError::InsufficientPeriods { periods: 1 })
    ));
}

// ============================================================================
// Input Layouts
// ============================================================================

#[test]
fn test_rows_and_columns_agree() {
    let rows = vec![
        vec![0.010, -0.020, 0.004],
        vec![-0.015, 0.011, 0.002],
        vec![0.030, -0.025, -0.010],
        vec![-0.002, 0.001, 0.012],
        vec![0.018, -0.017, 0.000],
    ];
    let by_rows = ReturnsMatrix::from_rows(["X", "Y", "Z"], &rows).unwrap();

    let columns = (0..3).map(|k| rows.iter().map(|r| r[k]).collect()).collect();
    let by_columns = ReturnsMatrix::from_columns(["X", "Y", "Z"], columns).unwrap();

    assert_eq!(by_rows, by_columns);
    assert_eq!(
        GerberStatistic::compute(&by_rows, 0.5).unwrap(),
        GerberStatistic::compute(&by_columns, 0.5).unwrap()
    );
}

#[test]
fn test_input_json_validated() {
    let json = r#"{
        "returns": {
            "labels": ["A", "B"],
            "columns": [[0.01, -0.02, 0.03], [0.02, -0.01, 0.01]]
        },
        "threshold_value": 0.75
    }"#;
    let input: GerberInput = serde_json::from_str(json).unwrap();
    assert_eq!(input.returns.n_assets(), 2);
    assert_eq!(input.threshold_value, Some(0.75));

    let ragged = r#"{
        "returns": {
            "labels": ["A", "B"],
            "columns": [[0.01, -0.02, 0.03], [0.02, -0.01]]
        }
    }"#;
    assert!(serde_json::from_str::<GerberInput>(ragged).is_err());
}

#[test]
fn test_result_json_round_trip() {
    let returns = market_returns(4, 60, 17);
    let result = GerberStatistic::compute(&returns, 0.5).unwrap();

    let json = serde_json::to_string(&result).unwrap();
    let back: GerberResult = serde_json::from_str(&json).unwrap();

    assert_eq!(back.labels, result.labels);
    assert_eq!(back.degenerate, result.degenerate);
    assert_eq!(back.periods, result.periods);
    let pairs = back
        .correlation
        .cells()
        .iter()
        .zip(result.correlation.cells())
        .chain(back.covariance.cells().iter().zip(result.covariance.cells()));
    for (a, b) in pairs {
        let (a, b) = (a.unwrap(), b.unwrap());
        assert!((a - b).abs() <= 1e-15 * b.abs().max(1.0), "{} vs {}", a, b);
    }
}

// ============================================================================
// Configured Kernel
// ============================================================================

#[test]
fn test_configured_kernel_matches_reference() {
    let returns = market_returns(16, 90, 0xDEAD_BEEF);
    let reference = GerberStatistic::compute(&returns, 0.5).unwrap();

    let config = GerberConfig::production().with_parallel(ParallelConfig {
        enabled: true,
        min_pairs: 8,
        worker_threads: 3,
    });
    let kernel = GerberStatistic::with_config(config);
    assert!(kernel.validate().is_ok());

    assert_eq!(kernel.compute_with(&returns).unwrap(), reference);
}

#[test]
fn test_config_from_toml_drives_kernel() {
    let config = GerberConfig::from_toml_str(
        r#"
        threshold_value = 0.5
        strict = true
        ambiguous_policy = "as_neutral"

        [parallel]
        enabled = false
        "#,
    )
    .unwrap();
    let kernel = GerberStatistic::with_config(config);

    let returns = ReturnsMatrix::from_columns(
        ["A", "FLAT"],
        vec![vec![0.02, -0.02, 0.01, -0.01], vec![0.0; 4]],
    )
    .unwrap();

    // (FLAT, A) is the first degenerate pair once ambiguous periods are neutral.
    let err = kernel.compute_with(&returns).unwrap_err();
    assert!(matches!(err, KernelError::NumericDegenerate { row: 1, col: 0 }));
    assert!(err.is_degenerate());
}

#[test]
fn test_policy_changes_only_ambiguous_pairs() {
    let returns = market_returns(5, 120, 23);
    let excluded = GerberStatistic::with_config(GerberConfig::testing())
        .compute_with(&returns)
        .unwrap();
    let folded = GerberStatistic::with_config(
        GerberConfig::testing().with_ambiguous_policy(AmbiguousPolicy::AsNeutral),
    )
    .compute_with(&returns)
    .unwrap();

    // Diagonal pairs never have ambiguous periods.
    for i in 0..5 {
        assert_eq!(
            excluded.correlation.get(i, i),
            folded.correlation.get(i, i)
        );
    }
    assert_eq!(excluded.std_devs, folded.std_devs);
}

// ============================================================================
// Batch Execution
// ============================================================================

#[tokio::test]
async fn test_batch_kernel_execute() {
    let kernel = GerberStatistic::with_config(GerberConfig::testing());
    let returns = market_returns(3, 40, 5);

    let output = kernel
        .execute(GerberInput::new(returns.clone()).with_threshold_value(0.25))
        .await
        .unwrap();

    assert_eq!(
        output.result,
        GerberStatistic::compute(&returns, 0.25).unwrap()
    );
    assert_eq!(kernel.id(), "risk/gerber-statistic");
}

#[tokio::test]
async fn test_batch_kernel_rejects_threshold() {
    let kernel = GerberStatistic::new();
    let returns = market_returns(2, 10, 9);

    let err = kernel
        .execute(GerberInput::new(returns).with_threshold_value(f64::INFINITY))
        .await
        .unwrap_err();

    assert!(matches!(
        err.input_error(),
        Some(InputError::NonPositiveThreshold { .. })
    ));
}
