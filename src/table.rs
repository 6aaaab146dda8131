/// Ordered numeric lookup tables.
///
/// A `LookupTable` stores rows in a single flat buffer, ordered by the
/// key column, and is read-only once construction completes. Lookups
/// clamp to the boundary rows rather than extrapolate, which is why the
/// routing builder pads its tables with zero and sentinel rows.
use crate::error::KeyNotFound;

#[derive(Debug, Clone, PartialEq)]
pub struct LookupTable {
    columns: usize,
    data: Vec<f64>,
}

impl LookupTable {
    /// Pre-allocate a zero-filled table; the caller fills every cell
    /// with `populate`.
    pub fn with_rows(rows: usize, columns: usize) -> Self {
        assert!(columns > 0, "table needs at least one column");
        Self {
            columns,
            data: vec![0.0; rows * columns],
        }
    }

    /// Build a two-column table from `(key, value)` pairs.
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Self {
        let mut table = Self::with_rows(pairs.len(), 2);
        for (row, &(x, y)) in pairs.iter().enumerate() {
            table.populate(row, 0, x);
            table.populate(row, 1, y);
        }
        table
    }

    pub fn rows(&self) -> usize {
        self.data.len() / self.columns
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, row: usize, column: usize) -> f64 {
        assert!(column < self.columns, "column {column} out of range");
        self.data[row * self.columns + column]
    }

    /// Set a single cell. No implicit resize: `row` must be within the
    /// allocation made by `with_rows`.
    pub fn populate(&mut self, row: usize, column: usize, value: f64) {
        assert!(column < self.columns, "column {column} out of range");
        self.data[row * self.columns + column] = value;
    }

    /// Two-column view of the table as `(key, value)` pairs.
    pub fn to_pairs(&self) -> Vec<(f64, f64)> {
        assert_eq!(self.columns, 2, "to_pairs requires a two-column table");
        (0..self.rows())
            .map(|r| (self.get(r, 0), self.get(r, 1)))
            .collect()
    }

    /// Look up `key` in the primary key column (column 0) and return the
    /// value in `column`. With `interpolate`, keys strictly between two
    /// rows are linearly interpolated and keys outside the table domain
    /// clamp to the nearest boundary row; without it, only an exact row
    /// match succeeds.
    pub fn lookup(&self, key: f64, column: usize, interpolate: bool) -> Result<f64, KeyNotFound> {
        if interpolate {
            Ok(self.interpolate(key, column))
        } else {
            self.exact(key, column)
        }
    }

    /// Interpolated lookup keyed on column 0. Total for non-empty tables.
    pub fn interpolate(&self, key: f64, column: usize) -> f64 {
        self.interpolate_by(0, key, column)
    }

    /// Interpolated lookup keyed on an arbitrary column, ascending in that
    /// column. Used in reverse (key column 1 → value column 0) by the
    /// storage-indication solver.
    pub fn interpolate_by(&self, key_column: usize, key: f64, value_column: usize) -> f64 {
        let n = self.rows();
        assert!(n > 0, "interpolating an empty table");

        if key <= self.get(0, key_column) {
            return self.get(0, value_column);
        }
        if key >= self.get(n - 1, key_column) {
            return self.get(n - 1, value_column);
        }

        let mut upper = 1;
        while self.get(upper, key_column) < key {
            upper += 1;
        }
        let x0 = self.get(upper - 1, key_column);
        let x1 = self.get(upper, key_column);
        let y0 = self.get(upper - 1, value_column);
        let y1 = self.get(upper, value_column);
        if x1 == x0 {
            return y1;
        }
        y0 + (y1 - y0) * (key - x0) / (x1 - x0)
    }

    /// Exact lookup keyed on column 0.
    pub fn exact(&self, key: f64, column: usize) -> Result<f64, KeyNotFound> {
        for row in 0..self.rows() {
            if self.get(row, 0) == key {
                return Ok(self.get(row, column));
            }
        }
        Err(KeyNotFound { key, column })
    }
}
