/// Lag-and-K flux outputs.
///
/// Two levels: `Fluxes` holds a single timestep, `FluxesTimeseries` holds
/// the full run (Vec of each field).
///
/// Single-timestep fluxes — produced once per routed interval.
#[derive(Debug, Clone, Copy)]
pub struct Fluxes {
    /// Raw inflow ordinate for the interval.
    pub inflow: f64,
    /// Inflow after the lag has been applied.
    pub lagged_inflow: f64,
    /// Routed outflow at the end of the interval, after transit loss.
    pub outflow: f64,
    /// Reach storage at the end of the interval.
    pub storage: f64,
}

/// Full timeseries of fluxes — returned by `run()`.
#[derive(Debug)]
pub struct FluxesTimeseries {
    pub inflow: Vec<f64>,
    pub lagged_inflow: Vec<f64>,
    pub outflow: Vec<f64>,
    pub storage: Vec<f64>,
}

impl FluxesTimeseries {
    /// Pre-allocate all vectors for `n` timesteps.
    pub fn with_capacity(n: usize) -> Self {
        Self {
            inflow: Vec::with_capacity(n),
            lagged_inflow: Vec::with_capacity(n),
            outflow: Vec::with_capacity(n),
            storage: Vec::with_capacity(n),
        }
    }

    /// Push a single timestep's fluxes into the timeseries.
    pub fn push(&mut self, f: &Fluxes) {
        self.inflow.push(f.inflow);
        self.lagged_inflow.push(f.lagged_inflow);
        self.outflow.push(f.outflow);
        self.storage.push(f.storage);
    }

    /// Number of timesteps.
    pub fn len(&self) -> usize {
        self.outflow.len()
    }

    /// Returns `true` if there are no timesteps.
    pub fn is_empty(&self) -> bool {
        self.outflow.is_empty()
    }
}
