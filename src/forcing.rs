/// Inflow series metadata and unit/interval normalization.
///
/// The routing engine works on one fixed time step and one flow unit at a
/// time; tables and series arriving in other compatible units are rescaled
/// here before use. Incompatible dimensions (flow against stage) have no
/// conversion factor and are a configuration error.
use std::fmt;

use crate::error::ConfigError;
use crate::table::LookupTable;

/// Base time step of a series. Ordered from finest to coarsest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IntervalBase {
    Minute,
    Hour,
    Day,
}

impl IntervalBase {
    pub fn minutes(self) -> u32 {
        match self {
            IntervalBase::Minute => 1,
            IntervalBase::Hour => 60,
            IntervalBase::Day => 1440,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            IntervalBase::Minute => "minute",
            IntervalBase::Hour => "hour",
            IntervalBase::Day => "day",
        }
    }
}

/// A fixed time step: `multiplier` units of `base` (e.g. 6 hour).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeInterval {
    pub base: IntervalBase,
    pub multiplier: u32,
}

impl TimeInterval {
    pub fn new(base: IntervalBase, multiplier: u32) -> Self {
        Self { base, multiplier }
    }

    pub fn total_minutes(&self) -> u32 {
        self.base.minutes() * self.multiplier
    }

    /// Length ratio of this interval to `target` (always defined: all
    /// bases scale linearly through minutes).
    pub fn factor_to(&self, target: TimeInterval) -> f64 {
        f64::from(self.total_minutes()) / f64::from(target.total_minutes())
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.multiplier, self.base.label())
    }
}

/// Measurement unit of a series or table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    CubicMetersPerSecond,
    CubicFeetPerSecond,
    Meters,
    Feet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dimension {
    Flow,
    Length,
}

impl Unit {
    pub fn label(self) -> &'static str {
        match self {
            Unit::CubicMetersPerSecond => "m3/s",
            Unit::CubicFeetPerSecond => "ft3/s",
            Unit::Meters => "m",
            Unit::Feet => "ft",
        }
    }

    fn dimension(self) -> Dimension {
        match self {
            Unit::CubicMetersPerSecond | Unit::CubicFeetPerSecond => Dimension::Flow,
            Unit::Meters | Unit::Feet => Dimension::Length,
        }
    }

    /// Value in SI base units of one unit of `self`.
    fn si_scale(self) -> f64 {
        match self {
            Unit::CubicMetersPerSecond => 1.0,
            Unit::CubicFeetPerSecond => 0.028_316_846_592,
            Unit::Meters => 1.0,
            Unit::Feet => 0.3048,
        }
    }

    /// Linear factor converting values in `self` to values in `target`,
    /// or an error when the dimensions differ.
    pub fn factor_to(self, target: Unit) -> Result<f64, ConfigError> {
        if self.dimension() != target.dimension() {
            return Err(ConfigError::IncompatibleUnits {
                from: self.label(),
                to: target.label(),
            });
        }
        Ok(self.si_scale() / target.si_scale())
    }
}

/// Rescale one column of a table between compatible units.
pub fn convert_table_column(
    table: &LookupTable,
    column: usize,
    from: Unit,
    to: Unit,
) -> Result<LookupTable, ConfigError> {
    let factor = from.factor_to(to)?;
    let mut out = LookupTable::with_rows(table.rows(), table.columns());
    for row in 0..table.rows() {
        for col in 0..table.columns() {
            let v = table.get(row, col);
            out.populate(row, col, if col == column { v * factor } else { v });
        }
    }
    Ok(out)
}

/// Rescale a table column holding time amounts (e.g. lag values) from one
/// interval base to another.
pub fn rescale_time_column(table: &LookupTable, column: usize, from: IntervalBase, to: IntervalBase) -> LookupTable {
    let factor = f64::from(from.minutes()) / f64::from(to.minutes());
    let mut out = LookupTable::with_rows(table.rows(), table.columns());
    for row in 0..table.rows() {
        for col in 0..table.columns() {
            let v = table.get(row, col);
            out.populate(row, col, if col == column { v * factor } else { v });
        }
    }
    out
}

/// Validated fixed-interval inflow series.
///
/// Values are ordered oldest to newest, one per interval. NaN and
/// infinite values are rejected, as is an empty series.
#[derive(Debug, Clone, PartialEq)]
pub struct InflowSeries {
    pub values: Vec<f64>,
    pub interval: TimeInterval,
    pub unit: Unit,
}

impl InflowSeries {
    pub fn new(values: Vec<f64>, interval: TimeInterval, unit: Unit) -> Result<Self, ConfigError> {
        if values.is_empty() {
            return Err(ConfigError::EmptySeries);
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(ConfigError::NonFiniteInflow { index });
        }
        Ok(Self {
            values,
            interval,
            unit,
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The same series expressed in `unit`.
    pub fn converted_to(&self, unit: Unit) -> Result<InflowSeries, ConfigError> {
        let factor = self.unit.factor_to(unit)?;
        Ok(InflowSeries {
            values: self.values.iter().map(|v| v * factor).collect(),
            interval: self.interval,
            unit,
        })
    }
}
