/// Lag-and-K routing configuration.
///
/// Collected as one immutable value and handed to `builder::build`, which
/// validates everything at a single call site. Lag amounts and K values
/// are expressed in units of the interval base (e.g. hours for an hourly
/// base); the interval multiplier is the routing step in those units.
use crate::forcing::TimeInterval;

/// Storage coefficient specification.
#[derive(Debug, Clone, PartialEq)]
pub enum KSpec {
    /// Single K across all flows. Routing runs fixed-K: no
    /// storage-outflow derivation, linear-reservoir closed form.
    Constant(f64),
    /// `(outflow, k)` breakpoints, interpolated between rows.
    Table(Vec<(f64, f64)>),
}

/// Transit loss applied to routed outflow above a threshold level.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TransitLoss {
    pub coefficient: f64,
    pub threshold: f64,
}

/// Optional carryover seeding a run from a previous segment.
///
/// `inflow_history` lists recent inflow ordinates oldest first; shorter
/// histories than the allocated ring are right-aligned (most recent value
/// in the last slot, older unknown values default to zero).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InitialConditions {
    pub lagged_inflow: Option<f64>,
    pub outflow: Option<f64>,
    pub storage: Option<f64>,
    pub inflow_history: Option<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LagKParams {
    pub interval: TimeInterval,
    /// `(inflow, lag)` breakpoints. A single row means constant lag.
    pub lag: Vec<(f64, f64)>,
    pub k: KSpec,
    pub transit_loss: TransitLoss,
    pub initial: InitialConditions,
}

impl LagKParams {
    /// Configuration with no transit loss and zero initial carryover.
    pub fn new(interval: TimeInterval, lag: Vec<(f64, f64)>, k: KSpec) -> Self {
        Self {
            interval,
            lag,
            k,
            transit_loss: TransitLoss::default(),
            initial: InitialConditions::default(),
        }
    }
}
