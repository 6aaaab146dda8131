/// Validation and compilation of Lag-and-K configuration.
///
/// Real routing inputs are hand-edited hydrologic tables, frequently
/// under-specified at the boundaries (no zero-flow point, no large-flow
/// point) or minimally specified (one K, one lag). `build` makes every
/// downstream interpolation total — pad, never extrapolate — while
/// rejecting the structurally invalid cases outright.
use smallvec::{smallvec, SmallVec};

use crate::error::{ConfigError, StabilityCorrection};
use crate::lagk::constants::{CARRYOVER_PAD, FINE_DIVISOR, OUTFLOW_TOLERANCE, UNBOUNDED_FLOW};
use crate::lagk::curve;
use crate::lagk::params::{KSpec, LagKParams};
use crate::lagk::state::RoutingState;
use crate::table::LookupTable;

/// A built routing state plus any start-up carryover repairs applied
/// while constructing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Build {
    pub state: RoutingState,
    pub corrections: Vec<StabilityCorrection>,
}

pub(crate) struct PreparedLag {
    pub table: LookupTable,
    pub lag_max: f64,
    pub lag_min: f64,
    pub constant_lag: Option<f64>,
    pub user_rows: usize,
}

#[derive(Debug)]
pub(crate) struct PreparedK {
    pub table: LookupTable,
    pub constant_k: Option<f64>,
}

/// Defensively expand a single-row non-positive-lag table: duplicate the
/// row and append a sentinel at the maximum representable key so later
/// lookups never fall outside the table domain.
pub(crate) fn expand_lag_rows(mut rows: Vec<(f64, f64)>) -> Vec<(f64, f64)> {
    if rows.len() == 1 && rows[0].1 <= 0.0 {
        let lag = rows[0].1;
        rows.push((f64::MAX, lag));
    }
    rows
}

/// Pad a sorted K table with a zero-outflow row and an unbounded-outflow
/// sentinel row, re-using the boundary K values. Idempotent.
pub(crate) fn pad_k_rows(mut rows: Vec<(f64, f64)>) -> Vec<(f64, f64)> {
    if let Some(&(first_o, first_k)) = rows.first() {
        if first_o > 0.0 {
            rows.insert(0, (0.0, first_k));
        }
    }
    if let Some(&(last_o, last_k)) = rows.last() {
        if last_o < UNBOUNDED_FLOW {
            rows.push((UNBOUNDED_FLOW, last_k));
        }
    }
    rows
}

pub(crate) fn prepare_lag_table(rows: &[(f64, f64)], dt: f64) -> Result<PreparedLag, ConfigError> {
    if rows.is_empty() {
        return Err(ConfigError::EmptyTable { table: "lag" });
    }
    for (row, &(target, lag)) in rows.iter().enumerate() {
        if !target.is_finite() || !lag.is_finite() {
            return Err(ConfigError::NonFiniteValue { table: "lag", row });
        }
    }

    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

    // All lags <= 0 or all >= 0; mixing anticipation with delay in one
    // table has no physical reading.
    let mut sign = 0i32;
    for (row, &(_, lag)) in sorted.iter().enumerate() {
        let s = if lag > 0.0 {
            1
        } else if lag < 0.0 {
            -1
        } else {
            0
        };
        if s != 0 {
            if sign != 0 && s != sign {
                return Err(ConfigError::MixedSignLag { row, value: lag });
            }
            sign = s;
        }
    }

    let user_rows = sorted.len();
    let expanded = expand_lag_rows(sorted);

    let lag_max = expanded
        .iter()
        .fold(0.0f64, |acc, &(_, lag)| acc.max(lag))
        .round();
    let most_negative = expanded.iter().fold(0.0f64, |acc, &(_, lag)| acc.min(lag));
    let lag_min = if most_negative < 0.0 {
        ((-most_negative) / dt).ceil() * dt
    } else {
        0.0
    };
    let constant_lag = if expanded.iter().all(|&(_, lag)| lag == expanded[0].1) {
        Some(expanded[0].1)
    } else {
        None
    };

    Ok(PreparedLag {
        table: LookupTable::from_pairs(&expanded),
        lag_max,
        lag_min,
        constant_lag,
        user_rows,
    })
}

pub(crate) fn prepare_k_table(rows: &[(f64, f64)]) -> Result<PreparedK, ConfigError> {
    if rows.is_empty() {
        return Err(ConfigError::EmptyTable { table: "K" });
    }
    for (row, &(outflow, k)) in rows.iter().enumerate() {
        if !outflow.is_finite() || !k.is_finite() {
            return Err(ConfigError::NonFiniteValue { table: "K", row });
        }
        if k < 0.0 {
            return Err(ConfigError::NegativeK { row, value: k });
        }
    }

    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));
    for row in 1..sorted.len() {
        if sorted[row].0 <= sorted[row - 1].0 {
            return Err(ConfigError::NonMonotonicKey {
                table: "K",
                row,
                value: sorted[row].0,
            });
        }
    }

    let padded = pad_k_rows(sorted);
    let constant_k = if padded.iter().all(|&(_, k)| k == padded[0].1) {
        Some(padded[0].1)
    } else {
        None
    };

    Ok(PreparedK {
        table: LookupTable::from_pairs(&padded),
        constant_k,
    })
}

/// Compile a configuration into a ready-to-step `RoutingState`.
///
/// Validation is exhaustive here: a returned state is fully initialized
/// and every runtime lookup it can make stays inside its tables. Start-up
/// carryover repairs are returned as `corrections`, never raised as
/// errors.
pub fn build(params: &LagKParams) -> Result<Build, ConfigError> {
    let dt = f64::from(params.interval.multiplier);

    let lag = prepare_lag_table(&params.lag, dt)?;
    let k = match &params.k {
        KSpec::Constant(value) => {
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteValue { table: "K", row: 0 });
            }
            if *value < 0.0 {
                return Err(ConfigError::NegativeK {
                    row: 0,
                    value: *value,
                });
            }
            PreparedK {
                table: LookupTable::from_pairs(&[(0.0, *value), (UNBOUNDED_FLOW, *value)]),
                constant_k: Some(*value),
            }
        }
        KSpec::Table(rows) => prepare_k_table(rows)?,
    };

    // Negative lag interpolates inside the lag table at run time, so a
    // defensively-expanded single row is not enough once K also varies.
    if lag.lag_min > 0.0 && k.constant_k.is_none() && lag.user_rows < 2 {
        return Err(ConfigError::NegativeLagBreakpoints);
    }

    let (storage_outflow, storage_outflow_fine) = match k.constant_k {
        Some(_) => (None, None),
        None => (
            Some(curve::derive_storage_outflow(&k.table, dt, 1.0)),
            Some(curve::derive_storage_outflow(&k.table, dt, FINE_DIVISOR)),
        ),
    };

    let ring_len = (((lag.lag_max + lag.lag_min) / dt).ceil() as usize + CARRYOVER_PAD)
        .max(lag.table.rows());
    let mut ring: SmallVec<[f64; 16]> = smallvec![0.0; ring_len];
    if let Some(history) = &params.initial.inflow_history {
        if history.len() > ring_len {
            return Err(ConfigError::CarryoverSizeMismatch {
                expected: ring_len,
                got: history.len(),
            });
        }
        // Right-align: the supplied values are the most recent
        // observations, older unknown values stay zero.
        ring[ring_len - history.len()..].copy_from_slice(history);
    }

    let lagged_inflow = params.initial.lagged_inflow.unwrap_or(0.0);
    let mut outflow = params.initial.outflow.unwrap_or(0.0);
    let storage = params.initial.storage.unwrap_or(0.0);

    // Pure-lag start-up check: with K = 0 the first routed values come
    // straight from the inflow history, and an outflow carryover that
    // disagrees with it makes the first steps oscillate. Repair rather
    // than abort; the source tables are only approximately
    // self-consistent.
    let mut corrections = Vec::new();
    if k.constant_k == Some(0.0) {
        if let Some(l) = lag.constant_lag {
            if l >= 0.0 {
                let steps = (l / dt).ceil();
                let fraction = (dt * steps - l) / dt;
                let expected = ring[0] + (ring[1] - ring[0]) * fraction;
                if (expected - outflow).abs() > OUTFLOW_TOLERANCE * outflow.abs() {
                    let correction = StabilityCorrection {
                        field: "outflow",
                        original: outflow,
                        corrected: expected,
                        reason: "initial outflow disagrees with lagged inflow carryover",
                    };
                    tracing::warn!("stability correction: {}", correction);
                    outflow = expected;
                    corrections.push(correction);
                }
            }
        }
    }

    let state = RoutingState {
        interval: params.interval,
        loss_coefficient: params.transit_loss.coefficient,
        loss_threshold: params.transit_loss.threshold,
        lagged_inflow,
        outflow,
        storage,
        lag_max: lag.lag_max,
        lag_min: lag.lag_min,
        carryover_inflow: ring,
        lag_table: lag.table,
        k_table: k.table,
        constant_k: k.constant_k,
        constant_lag: lag.constant_lag,
        storage_outflow,
        storage_outflow_fine,
    };

    Ok(Build { state, corrections })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forcing::{IntervalBase, TimeInterval};
    use crate::lagk::params::InitialConditions;

    fn hourly(mult: u32) -> TimeInterval {
        TimeInterval::new(IntervalBase::Hour, mult)
    }

    fn daily() -> TimeInterval {
        TimeInterval::new(IntervalBase::Day, 1)
    }

    // -- Lag table validation --

    #[test]
    fn mixed_sign_lag_is_error() {
        let params = LagKParams::new(
            hourly(6),
            vec![(0.0, 6.0), (500.0, -6.0)],
            KSpec::Constant(0.0),
        );
        let err = build(&params).unwrap_err();
        assert!(matches!(err, ConfigError::MixedSignLag { .. }));
    }

    #[test]
    fn empty_lag_table_is_error() {
        let params = LagKParams::new(hourly(6), vec![], KSpec::Constant(0.0));
        assert_eq!(
            build(&params).unwrap_err(),
            ConfigError::EmptyTable { table: "lag" }
        );
    }

    #[test]
    fn single_row_negative_lag_is_expanded() {
        let lag = prepare_lag_table(&[(100.0, -3.0)], 6.0).unwrap();
        assert_eq!(lag.table.rows(), 2);
        assert_eq!(lag.table.get(0, 1), -3.0);
        assert_eq!(lag.table.get(1, 1), -3.0);
        assert_eq!(lag.table.get(1, 0), f64::MAX);
    }

    #[test]
    fn single_row_positive_lag_is_not_expanded() {
        let lag = prepare_lag_table(&[(100.0, 3.0)], 6.0).unwrap();
        assert_eq!(lag.table.rows(), 1);
    }

    #[test]
    fn lag_rows_are_sorted_by_target() {
        let lag = prepare_lag_table(&[(500.0, 12.0), (0.0, 6.0)], 6.0).unwrap();
        assert_eq!(lag.table.get(0, 0), 0.0);
        assert_eq!(lag.table.get(1, 0), 500.0);
    }

    #[test]
    fn lag_scalars() {
        // lag_max rounds to nearest integer; lag_min rounds the deepest
        // anticipation up to the next multiple of the interval.
        let lag = prepare_lag_table(&[(0.0, 11.4), (500.0, 2.0)], 6.0).unwrap();
        assert_eq!(lag.lag_max, 11.0);
        assert_eq!(lag.lag_min, 0.0);

        let neg = prepare_lag_table(&[(0.0, -7.0), (500.0, -2.0)], 6.0).unwrap();
        assert_eq!(neg.lag_max, 0.0);
        assert_eq!(neg.lag_min, 12.0);
    }

    #[test]
    fn constant_lag_detected_through_expansion() {
        let lag = prepare_lag_table(&[(100.0, -3.0)], 6.0).unwrap();
        assert_eq!(lag.constant_lag, Some(-3.0));
        let varied = prepare_lag_table(&[(0.0, 3.0), (500.0, 6.0)], 6.0).unwrap();
        assert_eq!(varied.constant_lag, None);
    }

    #[test]
    fn negative_lag_with_variable_k_needs_breakpoints() {
        let params = LagKParams::new(
            hourly(6),
            vec![(100.0, -3.0)],
            KSpec::Table(vec![(0.0, 2.0), (500.0, 9.0)]),
        );
        assert_eq!(
            build(&params).unwrap_err(),
            ConfigError::NegativeLagBreakpoints
        );

        // same lag table is fine once K is fixed
        let fixed = LagKParams::new(hourly(6), vec![(100.0, -3.0)], KSpec::Constant(2.0));
        assert!(build(&fixed).is_ok());
    }

    // -- K table validation --

    #[test]
    fn k_table_is_padded_at_both_ends() {
        let k = prepare_k_table(&[(50.0, 10.0), (100.0, 20.0)]).unwrap();
        assert_eq!(
            k.table.to_pairs(),
            vec![
                (0.0, 10.0),
                (50.0, 10.0),
                (100.0, 20.0),
                (UNBOUNDED_FLOW, 20.0)
            ]
        );
    }

    #[test]
    fn k_padding_is_idempotent() {
        let once = pad_k_rows(vec![(50.0, 10.0), (100.0, 20.0)]);
        let twice = pad_k_rows(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn duplicate_k_outflows_are_rejected() {
        let err = prepare_k_table(&[(50.0, 10.0), (50.0, 20.0)]).unwrap_err();
        assert!(matches!(err, ConfigError::NonMonotonicKey { table: "K", .. }));
    }

    #[test]
    fn negative_k_is_rejected() {
        let err = prepare_k_table(&[(50.0, -1.0)]).unwrap_err();
        assert!(matches!(err, ConfigError::NegativeK { .. }));
    }

    #[test]
    fn single_effective_k_value_is_constant() {
        let k = prepare_k_table(&[(0.0, 5.0), (200.0, 5.0)]).unwrap();
        assert_eq!(k.constant_k, Some(5.0));
        let varied = prepare_k_table(&[(0.0, 5.0), (200.0, 9.0)]).unwrap();
        assert_eq!(varied.constant_k, None);
    }

    #[test]
    fn constant_k_spec_synthesizes_bounded_table() {
        let params = LagKParams::new(hourly(6), vec![(0.0, 6.0)], KSpec::Constant(4.0));
        let built = build(&params).unwrap();
        assert_eq!(
            built.state.k_table.to_pairs(),
            vec![(0.0, 4.0), (UNBOUNDED_FLOW, 4.0)]
        );
        assert_eq!(built.state.constant_k, Some(4.0));
        assert!(built.state.storage_outflow.is_none());
        assert!(built.state.storage_outflow_fine.is_none());
    }

    #[test]
    fn variable_k_derives_both_curves() {
        let params = LagKParams::new(
            hourly(6),
            vec![(0.0, 6.0)],
            KSpec::Table(vec![(0.0, 2.0), (500.0, 9.0)]),
        );
        let built = build(&params).unwrap();
        assert!(built.state.storage_outflow.is_some());
        assert!(built.state.storage_outflow_fine.is_some());
    }

    // -- Carryover --

    #[test]
    fn ring_is_sized_to_the_lag_window() {
        let params = LagKParams::new(hourly(6), vec![(0.0, 12.0)], KSpec::Constant(0.0));
        let built = build(&params).unwrap();
        // ceil(12/6) + 3
        assert_eq!(built.state.carryover_inflow.len(), 5);
    }

    #[test]
    fn ring_size_covers_lag_table_rows() {
        let lag: Vec<(f64, f64)> = (0..8).map(|i| (f64::from(i) * 100.0, 6.0)).collect();
        let params = LagKParams::new(hourly(6), lag, KSpec::Constant(0.0));
        let built = build(&params).unwrap();
        assert_eq!(built.state.carryover_inflow.len(), 8);
    }

    #[test]
    fn supplied_history_is_right_aligned() {
        let mut params = LagKParams::new(hourly(6), vec![(0.0, 12.0)], KSpec::Constant(3.0));
        params.initial = InitialConditions {
            inflow_history: Some(vec![100.0, 140.0]),
            ..InitialConditions::default()
        };
        let built = build(&params).unwrap();
        assert_eq!(
            built.state.carryover_inflow.as_slice(),
            [0.0, 0.0, 0.0, 100.0, 140.0]
        );
    }

    #[test]
    fn oversized_history_is_error() {
        let mut params = LagKParams::new(hourly(6), vec![(0.0, 12.0)], KSpec::Constant(3.0));
        params.initial.inflow_history = Some(vec![1.0; 9]);
        assert_eq!(
            build(&params).unwrap_err(),
            ConfigError::CarryoverSizeMismatch {
                expected: 5,
                got: 9
            }
        );
    }

    // -- Start-up stabilization --

    #[test]
    fn fractional_lag_outflow_is_corrected() {
        let mut params = LagKParams::new(daily(), vec![(0.0, 1.5)], KSpec::Constant(0.0));
        params.initial = InitialConditions {
            outflow: Some(105.0),
            inflow_history: Some(vec![100.0, 140.0, 150.0, 160.0, 170.0]),
            ..InitialConditions::default()
        };
        let built = build(&params).unwrap();
        // fraction = 1*ceil(1.5) - 1.5 = 0.5 -> 100 + (140-100)*0.5
        assert_eq!(built.state.outflow, 120.0);
        assert_eq!(built.corrections.len(), 1);
        assert_eq!(built.corrections[0].field, "outflow");
        assert_eq!(built.corrections[0].original, 105.0);
        assert_eq!(built.corrections[0].corrected, 120.0);
    }

    #[test]
    fn whole_interval_lag_checks_first_slot() {
        let mut params = LagKParams::new(daily(), vec![(0.0, 2.0)], KSpec::Constant(0.0));
        params.initial = InitialConditions {
            outflow: Some(50.0),
            inflow_history: Some(vec![100.0, 140.0, 150.0, 160.0, 170.0]),
            ..InitialConditions::default()
        };
        let built = build(&params).unwrap();
        assert_eq!(built.state.outflow, 100.0);
        assert_eq!(built.corrections.len(), 1);
    }

    #[test]
    fn consistent_outflow_is_left_alone() {
        let mut params = LagKParams::new(daily(), vec![(0.0, 2.0)], KSpec::Constant(0.0));
        params.initial = InitialConditions {
            outflow: Some(100.000001),
            inflow_history: Some(vec![100.0, 140.0, 150.0, 160.0, 170.0]),
            ..InitialConditions::default()
        };
        let built = build(&params).unwrap();
        assert_eq!(built.state.outflow, 100.000001);
        assert!(built.corrections.is_empty());
    }

    #[test]
    fn check_skipped_for_variable_lag() {
        let mut params = LagKParams::new(
            daily(),
            vec![(0.0, 1.5), (500.0, 3.0)],
            KSpec::Constant(0.0),
        );
        params.initial = InitialConditions {
            outflow: Some(105.0),
            inflow_history: Some(vec![100.0, 140.0, 150.0, 160.0, 170.0, 0.0]),
            ..InitialConditions::default()
        };
        let built = build(&params).unwrap();
        assert_eq!(built.state.outflow, 105.0);
        assert!(built.corrections.is_empty());
    }

    #[test]
    fn check_skipped_for_nonzero_k() {
        let mut params = LagKParams::new(daily(), vec![(0.0, 1.5)], KSpec::Constant(2.0));
        params.initial = InitialConditions {
            outflow: Some(105.0),
            inflow_history: Some(vec![100.0, 140.0, 150.0, 160.0, 170.0]),
            ..InitialConditions::default()
        };
        let built = build(&params).unwrap();
        assert_eq!(built.state.outflow, 105.0);
        assert!(built.corrections.is_empty());
    }
}
