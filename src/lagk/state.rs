/// Routing state produced by the builder and consumed by the stepping
/// loop.
///
/// Tables are read-only after `build` returns; the carryover ring and
/// scalar carryover are mutated in place as the run advances. One
/// `RoutingState` belongs to one simulation run — concurrent reaches each
/// own their own instance.
use smallvec::SmallVec;

use crate::error::ConfigError;
use crate::forcing::TimeInterval;
use crate::table::LookupTable;

#[derive(Debug, Clone, PartialEq)]
pub struct RoutingState {
    pub interval: TimeInterval,

    // -- Transit loss --
    pub loss_coefficient: f64,
    pub loss_threshold: f64,

    // -- Scalar carryover --
    /// Lagged inflow at the end of the previous interval.
    pub lagged_inflow: f64,
    /// Outflow at the end of the previous interval.
    pub outflow: f64,
    /// Reach storage at the end of the previous interval.
    pub storage: f64,

    // -- Lag window --
    /// Largest non-negative lag, rounded to the nearest integer.
    pub lag_max: f64,
    /// Magnitude of the most negative lag, rounded up to the next
    /// multiple of the interval multiplier.
    pub lag_min: f64,

    /// Recent inflow ordinates, one per interval, most recent last. Sized
    /// to cover the full lag window so lagged values can always be
    /// interpolated from history.
    pub carryover_inflow: SmallVec<[f64; 16]>,

    // -- Curves --
    pub lag_table: LookupTable,
    pub k_table: LookupTable,
    /// Set when the routing is fixed-K (single effective K value).
    pub constant_k: Option<f64>,
    /// Set when every lag breakpoint carries the same lag amount.
    pub constant_lag: Option<f64>,
    /// `(outflow, 2S/Δt + O)` at the nominal interval. Absent in fixed-K
    /// mode, which uses the linear-reservoir closed form instead.
    pub storage_outflow: Option<LookupTable>,
    /// Same curve at quarter-interval resolution for sub-step refinement.
    pub storage_outflow_fine: Option<LookupTable>,
}

impl RoutingState {
    /// Flatten the carryover for persistence across run segments.
    ///
    /// Layout: `[lagged_inflow, outflow, storage, ring...]`.
    pub fn carryover_to_array(&self) -> Vec<f64> {
        let mut arr = Vec::with_capacity(3 + self.carryover_inflow.len());
        arr.push(self.lagged_inflow);
        arr.push(self.outflow);
        arr.push(self.storage);
        arr.extend_from_slice(&self.carryover_inflow);
        arr
    }

    /// Restore carryover saved by `carryover_to_array`. The array length
    /// must match this state's layout exactly.
    pub fn restore_carryover(&mut self, arr: &[f64]) -> Result<(), ConfigError> {
        let expected = 3 + self.carryover_inflow.len();
        if arr.len() != expected {
            return Err(ConfigError::CarryoverSizeMismatch {
                expected,
                got: arr.len(),
            });
        }
        self.lagged_inflow = arr[0];
        self.outflow = arr[1];
        self.storage = arr[2];
        self.carryover_inflow.copy_from_slice(&arr[3..]);
        Ok(())
    }
}
