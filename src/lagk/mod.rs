/// Lag-and-K flow routing operation.
///
/// Routes an inflow hydrograph through a transport delay ("lag", constant
/// or a function of inflow) followed by a storage reservoir ("K", constant
/// or a function of outflow). Configuration is collected in `params`,
/// validated and compiled into a ready-to-step `RoutingState` by `builder`
/// (deriving the storage-indication curves in `curve`), and advanced over
/// an inflow series by `run`.
pub mod builder;
pub mod constants;
pub mod curve;
pub mod fluxes;
pub mod params;
pub mod processes;
pub mod run;
pub mod state;
