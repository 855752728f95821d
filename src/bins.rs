//! Log-space bin geometry shared by the m/z and mass bin axes.
//!
//! Both axes are regular grids in log-space with a per-MS-level bin width derived from the ppm
//! tolerance at that level: `bin_width[level] = 0.5 / tol[level]` (a tolerance of `tol` ppm gives
//! two bins per tolerance window). A value's bin index is the nearest integer number of bin
//! widths above the axis minimum; the reverse mapping recovers the log-space value at the centre
//! of a bin.

use crate::params::Parameters;
use crate::tolerance::Tolerance;

/// Per-MS-level bin width, `0.5 / tol_ppm * 1e6` (the ppm fraction already divides by 1e6, so
/// this is `0.5e6 / tol_ppm`).
pub fn bin_width(tol: &Tolerance<crate::system::MassOverCharge>) -> f64 {
    let ppm = tol.as_ppm().expect("validated Parameters carry only ppm tolerances");
    0.5e6 / ppm
}

/// All per-level bin widths for a parameter set, in MS-level order (index 0 = MS1).
pub fn bin_widths(params: &Parameters) -> Vec<f64> {
    params.tol.iter().map(bin_width).collect()
}

/// The bin index nearest to `value` on an axis with the given minimum and bin width.
///
/// Values below `min_value` map to bin 0, matching the source convention of clamping rather than
/// producing a negative index.
pub fn bin_index(value: f64, min_value: f64, width: f64) -> usize {
    if value < min_value {
        0
    } else {
        ((value - min_value) * width + 0.5) as usize
    }
}

/// The log-space value at the centre of `bin`.
pub fn bin_value(bin: usize, min_value: f64, width: f64) -> f64 {
    min_value + bin as f64 / width
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn bin_width_is_half_over_ppm_fraction() {
        let tol = Tolerance::new_ppm(5.0);
        let w = bin_width(&tol);
        assert!((w - 100_000.0).abs() < 1e-6);
    }

    #[test]
    fn index_and_value_round_trip_near_bin_centres() {
        let width = bin_width(&Tolerance::new_ppm(5.0));
        let min_value = 0.0;
        let value = 3.0 / width;
        let idx = bin_index(value, min_value, width);
        assert_eq!(idx, 3);
        let back = bin_value(idx, min_value, width);
        assert!((back - value).abs() < 1e-9);
    }

    #[test]
    fn values_below_minimum_clamp_to_bin_zero() {
        let idx = bin_index(-5.0, 0.0, 100_000.0);
        assert_eq!(idx, 0);
    }
}
