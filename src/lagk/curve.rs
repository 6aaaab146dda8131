/// Storage-outflow curve derivation.
///
/// Integrates the K-vs-outflow relationship into the storage-indication
/// form `(O, 2S/Δt + O)` consumed by the routing solver: a step forms
/// `2S1/Δt − O1 + (I1 + I2)` and reads the new outflow straight off this
/// curve, avoiding a nonlinear solve each interval.
use crate::lagk::constants::{
    MAX_SEGMENTS, MIN_SEGMENTS, SEGMENT_FLOW_DIVISOR, SEGMENT_K_WEIGHT, ZERO_FLOW_EPS,
};
use crate::table::LookupTable;

/// Derive the storage-indication curve from a padded K table.
///
/// `interval_len` is the routing step in interval-base units; `divisor`
/// selects the working resolution (1 = nominal step, 4 = quarter step).
/// Each breakpoint pair is subdivided so that neither the flow nor the K
/// difference between segment endpoints grows large, and storage is
/// accumulated trapezoidally: `S += K(Q̄)·ΔO` at the segment-mean flow.
pub fn derive_storage_outflow(k_table: &LookupTable, interval_len: f64, divisor: f64) -> LookupTable {
    let dt = interval_len / divisor;
    let rows = k_table.rows();

    let mut out: Vec<(f64, f64)> = Vec::new();
    let mut storage = 0.0;
    let mut o1 = k_table.get(0, 0);
    out.push((o1, 2.0 * storage / dt + o1));

    for i in 0..rows.saturating_sub(1) {
        let oa = k_table.get(i, 0);
        let ka = k_table.get(i, 1);
        let ob = k_table.get(i + 1, 0);
        let kb = k_table.get(i + 1, 1);

        let dflow = (oa - ob).abs();
        let dk = (ka - kb).abs();
        let segs = (((dflow + SEGMENT_K_WEIGHT * dk) / SEGMENT_FLOW_DIVISOR).round() as usize)
            .clamp(MIN_SEGMENTS, MAX_SEGMENTS);
        let step = (ob - oa) / segs as f64;

        for s in 1..=segs {
            let o2 = oa + step * s as f64;
            let mean_flow = 0.5 * (o1 + o2);
            let k = k_table.interpolate(mean_flow, 1);
            storage += k * (o2 - o1);
            out.push((o2, 2.0 * storage / dt + o2));
            o1 = o2;
        }
    }

    // The solver clamps at the bottom row; that row must be the origin.
    if out[0].0 > ZERO_FLOW_EPS {
        out.insert(0, (0.0, 0.0));
    }

    LookupTable::from_pairs(&out)
}
