/// hydroroute — hydrologic flow routing operations in Rust.
///
/// Implements the Lag-and-K routing operation: an inflow hydrograph is
/// delayed by a constant or flow-dependent lag, then attenuated through a
/// storage reservoir whose coefficient K may vary with outflow. Routing
/// carryover (recent inflow history plus scalar state) survives across
/// run segments so a simulation can be resumed seamlessly.
pub mod error;
pub mod forcing;
pub mod lagk;
pub mod table;
