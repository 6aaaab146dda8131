/// Numerical constants for the Lag-and-K operation.
///
/// Centralises the fixed values used by table padding, curve derivation,
/// carryover sizing, and the start-up consistency check.

// -- Table padding --

/// Effectively-unbounded flow used as the top sentinel of K and
/// storage-outflow tables. Finite so the storage integration over the
/// final breakpoint pair stays finite.
pub const UNBOUNDED_FLOW: f64 = 1.0e9;

/// First-column value below which a derived curve row counts as the
/// origin row.
pub const ZERO_FLOW_EPS: f64 = 1.0e-9;

// -- Storage-outflow integration --

/// Flow-difference scale in the segment-count heuristic.
pub const SEGMENT_FLOW_DIVISOR: f64 = 100.0;

/// Weight of the K difference relative to the flow difference in the
/// segment-count heuristic.
pub const SEGMENT_K_WEIGHT: f64 = 12.0;

/// Bounds on interpolation segments per breakpoint pair.
pub const MIN_SEGMENTS: usize = 1;
pub const MAX_SEGMENTS: usize = 20;

/// Divisor for the fine-resolution storage-outflow curve.
pub const FINE_DIVISOR: f64 = 4.0;

/// Sub-steps taken per interval when routing against the fine curve.
pub const FINE_SUBSTEPS: usize = 4;

// -- Carryover --

/// Extra slots beyond the lag window in the carryover-inflow ring.
pub const CARRYOVER_PAD: usize = 3;

/// Relative tolerance of the start-up outflow consistency check.
pub const OUTFLOW_TOLERANCE: f64 = 1.0e-4;
